// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

use crate::model::{Blog, Comment, Pagination, Reply, Token, User};

const fn default_success() -> bool {
    true
}

/// Normalized response body of every blog service endpoint.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Envelope<T> {
    /// Bodies that omit the flag come from 2xx responses and count as success.
    #[serde(default = "default_success")]
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    requires_verification: bool,
    #[serde(default)]
    verification_required: bool,
    #[serde(flatten)]
    pub(crate) payload: T,
}

impl<T> Envelope<T> {
    /// The service spells this flag two ways depending on the endpoint.
    pub(crate) const fn needs_verification(&self) -> bool {
        self.requires_verification || self.verification_required
    }
}

/// Error bodies only need the human-readable parts.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Failure {
    #[serde(default)]
    pub(super) message: Option<String>,
    #[serde(default)]
    requires_verification: bool,
    #[serde(default)]
    verification_required: bool,
}

impl Failure {
    pub(super) const fn needs_verification(&self) -> bool {
        self.requires_verification || self.verification_required
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct Empty {}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct AuthPayload {
    #[serde(default)]
    pub(crate) token: Option<Token>,
    #[serde(default)]
    pub(crate) user: Option<User>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct BlogPayload {
    #[serde(default)]
    pub(crate) blog: Option<Blog>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct BlogListPayload {
    #[serde(default)]
    pub(crate) blogs: Vec<Blog>,
    #[serde(default)]
    pub(crate) pagination: Option<Pagination>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct CommentListPayload {
    #[serde(default)]
    pub(crate) comments: Vec<Comment>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct CommentPayload {
    #[serde(default)]
    pub(crate) comment: Option<Comment>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct ReplyPayload {
    #[serde(default)]
    pub(crate) reply: Option<Reply>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LikePayload {
    #[serde(default)]
    pub(crate) liked: bool,
    #[serde(default)]
    pub(crate) likes_count: u64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SharePayload {
    #[serde(default)]
    pub(crate) shares_count: u64,
}

#[cfg(test)]
mod tests {
    use crate::error::Result;

    use super::*;

    #[test]
    fn login_envelope_carries_token_and_user() -> Result<()> {
        let envelope: Envelope<AuthPayload> = serde_json::from_str(
            r#"{"success":true,"token":"T1","user":{"id":"u1","name":"A"}}"#,
        )?;

        assert!(envelope.success);
        assert_eq!(envelope.payload.token, Some(Token::new("T1")));
        assert_eq!(
            envelope.payload.user.map(|user| user.id),
            Some("u1".to_owned())
        );
        Ok(())
    }

    #[test]
    fn both_verification_spellings_are_recognised() -> Result<()> {
        let login: Envelope<Empty> =
            serde_json::from_str(r#"{"success":false,"requiresVerification":true}"#)?;
        let signup: Envelope<Empty> =
            serde_json::from_str(r#"{"success":true,"verificationRequired":true}"#)?;
        let neither: Envelope<Empty> = serde_json::from_str(r#"{"success":true}"#)?;

        assert!(login.needs_verification());
        assert!(signup.needs_verification());
        assert!(!neither.needs_verification());
        Ok(())
    }

    #[test]
    fn missing_success_flag_means_success() -> Result<()> {
        let envelope: Envelope<BlogListPayload> =
            serde_json::from_str(r#"{"blogs":[],"pagination":{"currentPage":1,"totalPages":3}}"#)?;

        assert!(envelope.success);
        assert_eq!(
            envelope.payload.pagination.map(|p| p.total_pages),
            Some(3)
        );
        Ok(())
    }
}
