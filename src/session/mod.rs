// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The authentication state of this client and every operation that changes
//! it.
//!
//! The [`Manager`] is the only writer of both the in-memory [`Session`] and the
//! persisted [`Credentials`]. It changes the two inside one locked section so
//! they never disagree, and it converts every error into an [`Outcome`] at the
//! operation boundary.

mod outcome;

use std::sync::Arc;

use futures_util::lock::Mutex;
use log::{debug, info, warn};
use secrecy::{ExposeSecret as _, SecretString};
use tokio::sync::watch;
use url::Url;

use crate::{
    credentials::Credentials,
    error::{Error, Result},
    gateway::{AuthPayload, Empty, Envelope, Gateway, TokenSource, Transport},
    model::{ProfileUpdate, Token, User},
    storage::IsPersistent as _,
};

pub(crate) use outcome::{Failure, FailureKind, Outcome};

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const SIGNUP_FAILED: &str = "Registration failed. Please try again.";
const VERIFY_FAILED: &str = "Email verification failed.";
const FORGOT_FAILED: &str = "Failed to send reset email";
const RESET_FAILED: &str = "Failed to reset password";
const RESEND_FAILED: &str = "Failed to resend verification email";
const UPDATE_FAILED: &str = "Failed to update profile";
const CHANGE_FAILED: &str = "Failed to change password";

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Session {
    /// The stored token, if any, has not been checked yet.
    Bootstrapping,
    Anonymous,
    Authenticated { token: Token, user: User },
}

impl Session {
    pub(crate) const fn is_loading(&self) -> bool {
        matches!(self, Self::Bootstrapping)
    }

    pub(crate) const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub(crate) const fn token(&self) -> Option<&Token> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            Self::Bootstrapping | Self::Anonymous => None,
        }
    }

    pub(crate) const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            Self::Bootstrapping | Self::Anonymous => None,
        }
    }
}

impl TokenSource for watch::Receiver<Session> {
    fn token(&self) -> Option<Token> {
        self.borrow().token().cloned()
    }
}

/// A freshly registered account that still has to confirm its email address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Registration {
    pub(crate) email: String,
    pub(crate) verification_required: bool,
}

fn first_missing(
    fields: &[(&str, &str)],
    is_missing: impl Fn(&str) -> bool,
) -> Result<(), Failure> {
    match fields.iter().find(|(_, value)| is_missing(*value)) {
        Some((name, _)) => Err(Failure::new(
            FailureKind::Validation,
            format!("{name} is required"),
        )),
        None => Ok(()),
    }
}

/// Emails, names and tokens must have more than whitespace.
fn require_present(fields: &[(&str, &str)]) -> Result<(), Failure> {
    first_missing(fields, |value| value.trim().is_empty())
}

/// Passwords are sent as typed, so only an empty one is missing.
fn require_password(fields: &[(&str, &SecretString)]) -> Result<(), Failure> {
    let exposed: Vec<(&str, &str)> = fields
        .iter()
        .map(|(name, value)| (*name, value.expose_secret().as_str()))
        .collect();
    first_missing(&exposed, str::is_empty)
}

fn rejected<T>(envelope: &Envelope<T>, fallback: &str) -> Failure {
    Failure {
        kind: FailureKind::Rejected,
        message: envelope
            .message
            .clone()
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| fallback.to_owned()),
        requires_verification: envelope.needs_verification(),
    }
}

pub(crate) struct Manager {
    gateway: Gateway,
    credentials: Arc<Mutex<Credentials>>,
    session: watch::Sender<Session>,
}

impl Manager {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        base: Url,
        credentials: Credentials,
    ) -> Result<Self> {
        let (session, rx) = watch::channel(Session::Bootstrapping);
        Ok(Self {
            gateway: Gateway::new(transport, base, Arc::new(rx))?,
            credentials: Arc::new(Mutex::new(credentials)),
            session,
        })
    }

    /// The gateway wired to this session's token.
    pub(crate) const fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub(crate) fn current(&self) -> Session {
        self.session.borrow().clone()
    }

    // LINT: The command line reads snapshots; long-lived front ends watch for
    // changes instead.
    #[allow(dead_code)]
    pub(crate) fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    /// Whether the session outlives this process.
    pub(crate) async fn is_persistent(&self) -> bool {
        self.credentials.lock().await.is_persistent()
    }

    /// Persists `token` and `user` and publishes the authenticated session.
    async fn commit(&self, token: Token, user: User) -> Result<()> {
        let mut credentials = self.credentials.lock().await;
        if let Err(err) = credentials.store(&token, &user).await {
            self.reconcile(&mut credentials).await;
            return Err(err);
        }
        debug!("Session now belongs to {}", user.display_name());
        let _ = self.session.send_replace(Session::Authenticated { token, user });
        Ok(())
    }

    /// Called with the record locked after a failed write. If the record no
    /// longer holds what the session does, both are dropped.
    async fn reconcile(&self, credentials: &mut Credentials) {
        let session = self.current();
        if credentials.holds(session.token(), session.user()).await {
            return;
        }
        warn!("Stored credentials no longer match the session; logging out");
        if let Err(err) = credentials.clear().await {
            warn!("Could not remove stored credentials: {}", err);
        }
        let _ = self.session.send_replace(Session::Anonymous);
    }

    /// Forgets the session both in memory and in storage. Storage failures
    /// are logged; the in-memory session is cleared regardless.
    async fn invalidate(&self) {
        let mut credentials = self.credentials.lock().await;
        if let Err(err) = credentials.clear().await {
            warn!("Could not remove stored credentials: {}", err);
        }
        let _ = self.session.send_replace(Session::Anonymous);
    }

    async fn stored(&self) -> Result<Option<(Token, Option<User>)>> {
        let mut credentials = self.credentials.lock().await;
        match credentials.token().await? {
            Some(token) => Ok(Some((token, credentials.user().await?))),
            None => Ok(None),
        }
    }

    /// Restores the session from stored credentials. Never fails: anything
    /// that prevents validating the stored token leaves the session
    /// anonymous and the record empty.
    pub(crate) async fn bootstrap(&self) -> Session {
        let stored = match self.stored().await {
            Ok(stored) => stored,
            Err(err) => {
                warn!("Stored credentials are unreadable; discarding them: {}", err);
                self.invalidate().await;
                return self.current();
            }
        };

        let Some((token, stored_user)) = stored else {
            debug!("No stored token; starting anonymously");
            let _ = self.session.send_replace(Session::Anonymous);
            return self.current();
        };

        match self.gateway.verify_token(token.clone()).await {
            Ok(envelope) if envelope.success => {
                match envelope.payload.user.or(stored_user) {
                    Some(user) => {
                        if let Err(err) = self.commit(token, user).await {
                            warn!("Could not refresh stored credentials: {}", err);
                            self.invalidate().await;
                        }
                    }
                    None => {
                        warn!("Token check succeeded without a user; discarding credentials");
                        self.invalidate().await;
                    }
                }
            }
            Ok(envelope) => {
                info!(
                    "Stored token was rejected: {}",
                    envelope.message.as_deref().unwrap_or("no reason given")
                );
                self.invalidate().await;
            }
            Err(err) => {
                info!("Could not validate stored token: {}", err);
                self.invalidate().await;
            }
        }

        self.current()
    }

    /// Drops the session if `err` says the server no longer accepts our
    /// token. Returns whether it did.
    pub(crate) async fn observe(&self, err: &Error) -> bool {
        if err.is_token_rejection() && self.is_authenticated() {
            warn!("The server rejected our token; logging out locally");
            self.invalidate().await;
            true
        } else {
            false
        }
    }

    /// Adopts the token and user of a successful login or verification.
    async fn adopt(&self, envelope: Envelope<AuthPayload>, fallback: &str) -> Outcome<User> {
        if !envelope.success {
            return rejected(&envelope, fallback).into();
        }
        let message = envelope.message;
        let (Some(token), Some(user)) = (envelope.payload.token, envelope.payload.user) else {
            warn!("Successful response did not include both a token and a user");
            return Failure::new(FailureKind::Rejected, fallback).into();
        };

        match self.commit(token, user.clone()).await {
            Ok(()) => Outcome::success(user, message),
            Err(err) => {
                warn!("Could not store credentials: {}", err);
                Failure::from_error(err, fallback).into()
            }
        }
    }

    pub(crate) async fn login(
        &self,
        email: &str,
        password: &SecretString,
        remember_me: bool,
    ) -> Outcome<User> {
        if let Err(failure) = require_present(&[("Email", email)])
            .and_then(|()| require_password(&[("Password", password)]))
        {
            return failure.into();
        }

        match self.gateway.login(email.trim(), password, remember_me).await {
            Ok(envelope) => {
                let outcome = self.adopt(envelope, LOGIN_FAILED).await;
                if let Outcome::Success { value, .. } = &outcome {
                    info!("Logged in as {}", value.display_name());
                }
                outcome
            }
            Err(err) => {
                warn!("Login failed: {}", err);
                Failure::from_error(err, LOGIN_FAILED).into()
            }
        }
    }

    /// Registers an account. Never logs in, even when the service already
    /// hands out a token: activation waits for [`Manager::verify_email`].
    pub(crate) async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Outcome<Registration> {
        if let Err(failure) = require_present(&[("Name", name), ("Email", email)])
            .and_then(|()| require_password(&[("Password", password)]))
        {
            return failure.into();
        }

        match self.gateway.signup(name.trim(), email.trim(), password).await {
            Ok(envelope) if envelope.success => {
                if envelope.payload.token.is_some() {
                    debug!("Ignoring token issued before email verification");
                }
                Outcome::success(
                    Registration {
                        email: email.trim().to_owned(),
                        verification_required: envelope.needs_verification(),
                    },
                    envelope.message,
                )
            }
            Ok(envelope) => rejected(&envelope, SIGNUP_FAILED).into(),
            Err(err) => {
                warn!("Signup failed: {}", err);
                Failure::from_error(err, SIGNUP_FAILED).into()
            }
        }
    }

    pub(crate) async fn verify_email(&self, verification_token: &str) -> Outcome<User> {
        if let Err(failure) = require_present(&[("Verification token", verification_token)]) {
            return failure.into();
        }

        match self.gateway.verify_email(verification_token.trim()).await {
            Ok(envelope) => self.adopt(envelope, VERIFY_FAILED).await,
            Err(err) => {
                warn!("Email verification failed: {}", err);
                Failure::from_error(err, VERIFY_FAILED).into()
            }
        }
    }

    /// Ends the session. The server is told on a best-effort basis; local
    /// state is cleared whatever happens on the network.
    pub(crate) async fn logout(&self) {
        let session = self.current();
        let token = match session.token() {
            Some(token) => Some(token.clone()),
            None => self.stored().await.ok().flatten().map(|(token, _)| token),
        };

        if let Some(token) = token {
            let user_id = session.user().map(|user| user.id.as_str());
            match self.gateway.logout(token, user_id).await {
                Ok(envelope) if envelope.success => debug!("Server acknowledged logout"),
                Ok(envelope) => warn!(
                    "Server refused logout: {}",
                    envelope.message.as_deref().unwrap_or("no reason given")
                ),
                Err(err) => warn!("Could not notify server of logout: {}", err),
            }
        }

        self.invalidate().await;
        info!("Logged out");
    }

    async fn pass_through(
        &self,
        result: Result<Envelope<Empty>>,
        fallback: &str,
    ) -> Outcome<()> {
        match result {
            Ok(envelope) if envelope.success => Outcome::success((), envelope.message),
            Ok(envelope) => rejected(&envelope, fallback).into(),
            Err(err) => {
                warn!("{}: {}", fallback, err);
                Failure::from_error(err, fallback).into()
            }
        }
    }

    pub(crate) async fn forgot_password(&self, email: &str) -> Outcome<()> {
        if let Err(failure) = require_present(&[("Email", email)]) {
            return failure.into();
        }
        self.pass_through(self.gateway.forgot_password(email.trim()).await, FORGOT_FAILED)
            .await
    }

    pub(crate) async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &SecretString,
    ) -> Outcome<()> {
        if let Err(failure) = require_present(&[("Reset token", reset_token)])
            .and_then(|()| require_password(&[("Password", new_password)]))
        {
            return failure.into();
        }
        self.pass_through(
            self.gateway
                .reset_password(reset_token.trim(), new_password)
                .await,
            RESET_FAILED,
        )
        .await
    }

    pub(crate) async fn resend_verification(&self, email: &str) -> Outcome<()> {
        if let Err(failure) = require_present(&[("Email", email)]) {
            return failure.into();
        }
        self.pass_through(
            self.gateway.resend_verification(email.trim()).await,
            RESEND_FAILED,
        )
        .await
    }

    fn authenticated(&self) -> Result<(Token, User), Failure> {
        match &*self.session.borrow() {
            Session::Authenticated { token, user } => Ok((token.clone(), user.clone())),
            Session::Bootstrapping | Session::Anonymous => {
                Err(Failure::from_error(Error::AuthRequired, ""))
            }
        }
    }

    pub(crate) async fn update_profile(&self, update: &ProfileUpdate) -> Outcome<User> {
        let (_, current) = match self.authenticated() {
            Ok(session) => session,
            Err(failure) => return failure.into(),
        };
        if update.is_empty() {
            return Failure::new(FailureKind::Validation, "Nothing to update").into();
        }

        let envelope = match self.gateway.update_user(&current.id, update).await {
            Ok(envelope) if envelope.success => envelope,
            Ok(envelope) => return rejected(&envelope, UPDATE_FAILED).into(),
            Err(err) => {
                warn!("Profile update failed: {}", err);
                let _ = self.observe(&err).await;
                return Failure::from_error(err, UPDATE_FAILED).into();
            }
        };

        let Some(returned) = envelope.payload.user else {
            return Outcome::success(current, envelope.message);
        };

        let mut credentials = self.credentials.lock().await;
        // The session may have ended while the request was in flight.
        let token = match self.session.borrow().token() {
            Some(token) => token.clone(),
            None => return Failure::from_error(Error::AuthRequired, "").into(),
        };
        let user = current.merge(returned);
        if let Err(err) = credentials.store_user(&user).await {
            warn!("Could not store updated profile: {}", err);
            self.reconcile(&mut credentials).await;
            return Failure::from_error(err, UPDATE_FAILED).into();
        }
        let _ = self.session.send_replace(Session::Authenticated {
            token,
            user: user.clone(),
        });
        Outcome::success(user, envelope.message)
    }

    pub(crate) async fn change_password(
        &self,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> Outcome<()> {
        let (_, user) = match self.authenticated() {
            Ok(session) => session,
            Err(failure) => return failure.into(),
        };
        if let Err(failure) = require_password(&[
            ("Current password", current_password),
            ("New password", new_password),
        ]) {
            return failure.into();
        }

        let envelope = match self
            .gateway
            .change_password(&user.id, current_password, new_password)
            .await
        {
            Ok(envelope) if envelope.success => envelope,
            Ok(envelope) => return rejected(&envelope, CHANGE_FAILED).into(),
            Err(err) => {
                warn!("Password change failed: {}", err);
                let _ = self.observe(&err).await;
                return Failure::from_error(err, CHANGE_FAILED).into();
            }
        };

        // Some deployments rotate the token when the password changes.
        if let Some(token) = envelope.payload.token {
            let user = envelope
                .payload
                .user
                .map_or_else(|| user.clone(), |returned| user.clone().merge(returned));
            if let Err(err) = self.commit(token, user).await {
                warn!("Could not store rotated token: {}", err);
                return Failure::from_error(err, CHANGE_FAILED).into();
            }
        }
        Outcome::success((), envelope.message)
    }
}
