// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{ffi::OsString, path::Path};

use async_trait::async_trait;
use secrecy::{ExposeSecret as _, SecretString};
use tokio::task;

use crate::{
    error::{Error, Result},
    metadata,
};

const MISMATCH: &str = "Passwords do not match";

/// What to ask the user for.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    label: String,
    description: Option<String>,
    confirm: bool,
}

pub(crate) struct RequestBuilder {
    label: String,
    description: Option<String>,
    confirm: bool,
}

impl RequestBuilder {
    pub(crate) fn new<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            description: None,
            confirm: false,
        }
    }

    pub(crate) fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Asks a second time and refuses mismatching answers.
    pub(crate) const fn confirmed(mut self) -> Self {
        self.confirm = true;
        self
    }

    pub(crate) fn into_request(self) -> Request {
        Request {
            label: self.label,
            description: self.description,
            confirm: self.confirm,
        }
    }
}

#[async_trait]
pub(crate) trait Prompt: Send + Sync {
    /// Returns `None` if this prompt is not available here.
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>>;
}

#[async_trait]
impl<T: Prompt + ?Sized> Prompt for Box<T> {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        (**self).prompt(req).await
    }
}

#[async_trait]
impl<T: Prompt> Prompt for Vec<T> {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        for candidate in self {
            if let r @ (Ok(Some(_)) | Err(_)) = candidate.prompt(req.clone()).await {
                return r;
            }
        }

        Ok(None)
    }
}

/// Asks through `prompt`, treating an unavailable prompt as an error.
pub(crate) async fn require(prompt: &dyn Prompt, req: Request) -> Result<SecretString> {
    prompt
        .prompt(req)
        .await?
        .ok_or(Error::Password(crate::error::Password::NoPrompt))
}

pub(crate) struct PinentryPrompt {
    executable: Option<OsString>,
}

impl PinentryPrompt {
    pub(crate) const fn new() -> Self {
        Self { executable: None }
    }

    pub(crate) fn new_with_executable<P: AsRef<Path>>(executable: P) -> Self {
        Self {
            executable: Some(executable.as_ref().as_os_str().into()),
        }
    }
}

#[async_trait]
impl Prompt for PinentryPrompt {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        fn interact<'input>(
            mut input: pinentry::PassphraseInput<'input>,
            title: &'input str,
            req: &'input Request,
        ) -> Result<SecretString> {
            _ = input.required("A value is required to continue.");
            _ = input.with_title(title);
            _ = input.with_prompt(&req.label);
            if let Some(description) = &req.description {
                _ = input.with_description(description);
            }
            if req.confirm {
                _ = input.with_confirmation("Repeat", MISMATCH);
            }

            Ok(input.interact()?)
        }

        let title = format!("{} - {}", req.label, *metadata::CLIENT_DISPLAY_NAME);

        let input = self
            .executable
            .as_ref()
            .and_then(pinentry::PassphraseInput::with_binary)
            .or_else(pinentry::PassphraseInput::with_default_binary)
            .map(|input| task::spawn_blocking(move || interact(input, &title, &req)));

        Ok(match input {
            Some(fut) => Some(fut.await??),
            None => None,
        })
    }
}

pub(crate) struct RpasswordPrompt;

#[async_trait]
impl Prompt for RpasswordPrompt {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        if let Some(description) = &req.description {
            eprintln!("{description}");
        }

        let label = format!("{}: ", req.label);
        let first = task::spawn_blocking(move || {
            rpassword::prompt_password(label).map(SecretString::new)
        })
        .await??;

        if req.confirm {
            let label = format!("Repeat {}: ", req.label.to_lowercase());
            let second = task::spawn_blocking(move || rpassword::prompt_password(label)).await??;
            if second != *first.expose_secret() {
                return Err(Error::Validation(MISMATCH.to_owned()));
            }
        }

        Ok(Some(first))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Unavailable(AtomicUsize);

    #[async_trait]
    impl Prompt for Unavailable {
        async fn prompt(&self, _: Request) -> Result<Option<SecretString>> {
            let _ = self.0.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    struct Fixed(&'static str);

    #[async_trait]
    impl Prompt for Fixed {
        async fn prompt(&self, _: Request) -> Result<Option<SecretString>> {
            Ok(Some(SecretString::new(self.0.to_owned())))
        }
    }

    #[tokio::test]
    async fn chain_falls_through_unavailable_prompts() -> Result<()> {
        let chain: Vec<Box<dyn Prompt>> = vec![
            Box::new(Unavailable(AtomicUsize::new(0))),
            Box::new(Fixed("hunter2")),
        ];

        let secret = require(&chain, RequestBuilder::new("Password").into_request()).await?;

        assert_eq!(secret.expose_secret(), "hunter2");
        Ok(())
    }

    #[tokio::test]
    async fn empty_chain_is_an_error() {
        let chain: Vec<Box<dyn Prompt>> = Vec::new();

        let result = require(&chain, RequestBuilder::new("Password").into_request()).await;

        assert!(matches!(
            result,
            Err(Error::Password(crate::error::Password::NoPrompt))
        ));
    }
}
