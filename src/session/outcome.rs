// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FailureKind {
    /// The request never got a response.
    Network,
    /// The service answered with a failing status or `success: false`.
    Rejected,
    AuthRequired,
    Validation,
    /// Anything local: storage, encoding, prompts.
    Local,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Failure {
    pub(crate) kind: FailureKind,
    pub(crate) message: String,
    pub(crate) requires_verification: bool,
}

impl Failure {
    pub(crate) fn new<S: Into<String>>(kind: FailureKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
            requires_verification: false,
        }
    }

    /// Converts `err` into something to show the user. Server and validation
    /// messages are kept verbatim; everything else becomes `fallback`.
    pub(crate) fn from_error(err: Error, fallback: &str) -> Self {
        match err {
            Error::Server {
                message,
                requires_verification,
                ..
            } => Self {
                kind: FailureKind::Rejected,
                message,
                requires_verification,
            },
            Error::Validation(message) => Self::new(FailureKind::Validation, message),
            Error::AuthRequired => Self::new(FailureKind::AuthRequired, "Please log in to continue."),
            Error::Network(_) => Self::new(FailureKind::Network, fallback),
            Error::Io(_)
            | Error::Json(_)
            | Error::Url(_)
            | Error::Storage(_)
            | Error::Password(_)
            | Error::Command
            | Error::Cancelled => Self::new(FailureKind::Local, fallback),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What every session operation hands back to its caller.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Outcome<T> {
    Success { value: T, message: Option<String> },
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub(crate) const fn success(value: T, message: Option<String>) -> Self {
        Self::Success { value, message }
    }

    pub(crate) const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub(crate) fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message, .. } => message.as_deref(),
            Self::Failure(failure) => Some(&failure.message),
        }
    }

    pub(crate) fn into_result(self) -> Result<(T, Option<String>), Failure> {
        match self {
            Self::Success { value, message } => Ok((value, message)),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl<T> From<Failure> for Outcome<T> {
    fn from(value: Failure) -> Self {
        Self::Failure(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_messages_are_shown_verbatim() {
        let failure = Failure::from_error(
            Error::Server {
                status: 401,
                message: "Invalid email or password".to_owned(),
                requires_verification: false,
            },
            "Login failed. Please try again.",
        );
        assert_eq!(failure.kind, FailureKind::Rejected);
        assert_eq!(failure.message, "Invalid email or password");
    }

    #[test]
    fn network_failures_use_the_fallback() {
        let failure = Failure::from_error(
            Error::Network("connection refused".to_owned()),
            "Login failed. Please try again.",
        );
        assert_eq!(failure.kind, FailureKind::Network);
        assert_eq!(failure.message, "Login failed. Please try again.");
    }

    #[test]
    fn outcome_exposes_failure_message() {
        let outcome: Outcome<()> = Failure::new(FailureKind::Validation, "Email is required").into();
        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), Some("Email is required"));
    }
}
