// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use log::{error, warn};
use url::Url;

use crate::{
    error::{Error, Result},
    gateway::{Envelope, Gateway},
    model::User,
    password::{self, Prompt},
    session::{Manager, Outcome},
};

pub(crate) mod account;
pub(crate) mod blog;
pub(crate) mod comment;
pub(crate) mod social;

/// Whether a command may run without a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Access {
    Public,
    Protected,
}

/// Everything a command gets to work with.
pub(crate) struct Context {
    pub(crate) session: Manager,
    pub(crate) prompt: Box<dyn Prompt>,
    /// Root of the public web site, for links.
    pub(crate) site: Url,
}

impl Context {
    pub(crate) fn gateway(&self) -> &Gateway {
        self.session.gateway()
    }

    pub(crate) async fn password(&self, req: password::Request) -> Result<secrecy::SecretString> {
        password::require(self.prompt.as_ref(), req).await
    }

    /// The user of the current session.
    pub(crate) fn user(&self) -> Result<User> {
        self.session.current().user().cloned().ok_or(Error::AuthRequired)
    }

    /// Unwraps the envelope of a gateway call. A refused token also ends
    /// the local session.
    pub(crate) async fn checked<T: Send>(&self, result: Result<Envelope<T>>) -> Result<Envelope<T>> {
        match result {
            Ok(envelope) if envelope.success => Ok(envelope),
            Ok(envelope) => {
                error!(
                    "{}",
                    envelope
                        .message
                        .as_deref()
                        .unwrap_or("The service refused the request")
                );
                Err(Error::Command)
            }
            Err(err) => {
                if self.session.observe(&err).await {
                    warn!("Your session is no longer valid; please log in again");
                }
                Err(err)
            }
        }
    }
}

/// Prints what a session operation reported and converts failures into an
/// error for the exit status.
pub(crate) fn report<T>(outcome: Outcome<T>) -> Result<T> {
    if outcome.is_success() {
        if let Some(message) = outcome.message() {
            println!("{message}");
        }
    }

    match outcome.into_result() {
        Ok((value, _)) => Ok(value),
        Err(failure) => {
            error!("{}", failure);
            if failure.requires_verification {
                warn!("Check your inbox for the verification email, or run `account resend-verification`");
            }
            Err(Error::Command)
        }
    }
}

#[async_trait]
pub(crate) trait Command {
    fn access(&self) -> Access {
        Access::Public
    }

    async fn execute(self, cx: &Context) -> Result<()>;
}
