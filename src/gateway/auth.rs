// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use secrecy::{ExposeSecret as _, SecretString};
use serde_json::json;

use crate::{
    error::Result,
    model::{ProfileUpdate, Token},
};

use super::{AuthPayload, Empty, Envelope, Gateway, Options};

const USERS: &str = "users";

impl Gateway {
    pub(crate) async fn login(
        &self,
        email: &str,
        password: &SecretString,
        remember_me: bool,
    ) -> Result<Envelope<AuthPayload>> {
        self.send(
            &[USERS, "login"],
            Options::post().json(json!({
                "email": email,
                "password": password.expose_secret(),
                "rememberMe": remember_me,
            })),
        )
        .await
    }

    pub(crate) async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Envelope<AuthPayload>> {
        self.send(
            &[USERS, "signup"],
            Options::post().json(json!({
                "name": name,
                "email": email,
                "password": password.expose_secret(),
            })),
        )
        .await
    }

    pub(crate) async fn verify_email(&self, verification_token: &str) -> Result<Envelope<AuthPayload>> {
        self.send(&[USERS, "verify-email", verification_token], Options::get())
            .await
    }

    /// Tells the service `token` is no longer in use.
    pub(crate) async fn logout(
        &self,
        token: Token,
        user_id: Option<&str>,
    ) -> Result<Envelope<Empty>> {
        self.send(
            &[USERS, "logout"],
            Options::post()
                .bearer(token)
                .json(json!({ "userId": user_id })),
        )
        .await
    }

    pub(crate) async fn forgot_password(&self, email: &str) -> Result<Envelope<Empty>> {
        self.send(
            &[USERS, "forgot-password"],
            Options::post().json(json!({ "email": email })),
        )
        .await
    }

    pub(crate) async fn reset_password(
        &self,
        reset_token: &str,
        password: &SecretString,
    ) -> Result<Envelope<Empty>> {
        self.send(
            &[USERS, "reset-password", reset_token],
            Options::post().json(json!({ "password": password.expose_secret() })),
        )
        .await
    }

    pub(crate) async fn resend_verification(&self, email: &str) -> Result<Envelope<Empty>> {
        self.send(
            &[USERS, "resend-verification"],
            Options::post().json(json!({ "email": email })),
        )
        .await
    }

    /// Asks the service whether `token` still identifies a user.
    pub(crate) async fn verify_token(&self, token: Token) -> Result<Envelope<AuthPayload>> {
        self.send(&[USERS, "verify-token"], Options::get().bearer(token))
            .await
    }

    pub(crate) async fn update_user(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Envelope<AuthPayload>> {
        let token = self.require_token()?;
        self.send(
            &[USERS, user_id],
            Options::put()
                .bearer(token)
                .json(serde_json::to_value(update)?),
        )
        .await
    }

    pub(crate) async fn change_password(
        &self,
        user_id: &str,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<Envelope<AuthPayload>> {
        let token = self.require_token()?;
        self.send(
            &[USERS, user_id, "change-password"],
            Options::put().bearer(token).json(json!({
                "currentPassword": current_password.expose_secret(),
                "newPassword": new_password.expose_secret(),
            })),
        )
        .await
    }
}
