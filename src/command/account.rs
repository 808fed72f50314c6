// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Args, Subcommand};
use log::info;

use crate::{
    error::Result,
    model::{ProfileUpdate, User},
    password::RequestBuilder,
    session::Session,
};

use super::{report, Access, Context};

/// Sign in, sign up, and manage the account.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Log in with an email address and password.
    Login(Login),
    /// Register a new account. The account stays inactive until the email
    /// address is verified.
    Signup(Signup),
    /// Activate an account with the token from the verification email.
    Verify(Verify),
    /// End the current session.
    Logout,
    /// Show who is logged in.
    Status,
    /// Request a password reset email.
    ForgotPassword(Email),
    /// Choose a new password using the token from the reset email.
    ResetPassword(ResetPassword),
    /// Send the verification email again.
    ResendVerification(Email),
    /// Change profile details of the logged-in user.
    UpdateProfile(UpdateProfile),
    /// Change the password of the logged-in user.
    ChangePassword,
}

#[derive(Debug, Args)]
pub(crate) struct Login {
    #[arg(long, short)]
    email: String,

    /// Ask the service for a longer-lived session.
    #[arg(long)]
    remember_me: bool,
}

#[derive(Debug, Args)]
pub(crate) struct Signup {
    #[arg(long, short)]
    name: String,

    #[arg(long, short)]
    email: String,
}

#[derive(Debug, Args)]
pub(crate) struct Verify {
    token: String,
}

#[derive(Debug, Args)]
pub(crate) struct Email {
    email: String,
}

#[derive(Debug, Args)]
pub(crate) struct ResetPassword {
    token: String,
}

#[derive(Debug, Args)]
pub(crate) struct UpdateProfile {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    bio: Option<String>,

    /// URL of a profile picture.
    #[arg(long)]
    avatar: Option<String>,
}

fn print_user(user: &User) {
    println!("Logged in as {}", user.display_name());
    if let Some(email) = &user.email {
        println!("Email: {email}");
    }
    if let Some(bio) = &user.bio {
        println!("Bio: {bio}");
    }
    if user.is_verified == Some(false) {
        println!("Email address not verified");
    }
}

fn print_status(session: &Session, persistent: bool) {
    match session {
        Session::Authenticated { user, .. } => {
            print_user(user);
            if !persistent {
                println!("The session ends when this program exits");
            }
        }
        Session::Anonymous | Session::Bootstrapping => println!("Not logged in"),
    }
}

#[async_trait]
impl super::Command for Command {
    fn access(&self) -> Access {
        match self {
            Self::UpdateProfile(_) | Self::ChangePassword => Access::Protected,
            Self::Login(_)
            | Self::Signup(_)
            | Self::Verify(_)
            | Self::Logout
            | Self::Status
            | Self::ForgotPassword(_)
            | Self::ResetPassword(_)
            | Self::ResendVerification(_) => Access::Public,
        }
    }

    async fn execute(self, cx: &Context) -> Result<()> {
        match self {
            Self::Login(args) => {
                let password = cx
                    .password(RequestBuilder::new("Password").into_request())
                    .await?;
                let user = report(
                    cx.session
                        .login(&args.email, &password, args.remember_me)
                        .await,
                )?;
                println!("Logged in as {}", user.display_name());
                Ok(())
            }
            Self::Signup(args) => {
                let password = cx
                    .password(
                        RequestBuilder::new("Password")
                            .with_description(format!("Choose a password for {}", args.email))
                            .confirmed()
                            .into_request(),
                    )
                    .await?;
                let registration =
                    report(cx.session.signup(&args.name, &args.email, &password).await)?;
                if registration.verification_required {
                    println!(
                        "We sent a verification link to {}. Run `account verify <token>` once you have it.",
                        registration.email
                    );
                }
                Ok(())
            }
            Self::Verify(args) => {
                let user = report(cx.session.verify_email(&args.token).await)?;
                println!("Email verified. Logged in as {}", user.display_name());
                Ok(())
            }
            Self::Logout => {
                cx.session.logout().await;
                println!("Logged out");
                Ok(())
            }
            Self::Status => {
                let persistent = cx.session.is_persistent().await;
                print_status(&cx.session.current(), persistent);
                Ok(())
            }
            Self::ForgotPassword(args) => report(cx.session.forgot_password(&args.email).await),
            Self::ResetPassword(args) => {
                let password = cx
                    .password(
                        RequestBuilder::new("New password")
                            .confirmed()
                            .into_request(),
                    )
                    .await?;
                report(cx.session.reset_password(&args.token, &password).await)?;
                info!("Password reset; log in with the new password");
                Ok(())
            }
            Self::ResendVerification(args) => {
                report(cx.session.resend_verification(&args.email).await)
            }
            Self::UpdateProfile(args) => {
                let user = report(
                    cx.session
                        .update_profile(&ProfileUpdate {
                            name: args.name,
                            email: args.email,
                            bio: args.bio,
                            avatar: args.avatar,
                        })
                        .await,
                )?;
                print_user(&user);
                Ok(())
            }
            Self::ChangePassword => {
                let current = cx
                    .password(RequestBuilder::new("Current password").into_request())
                    .await?;
                let new = cx
                    .password(
                        RequestBuilder::new("New password")
                            .confirmed()
                            .into_request(),
                    )
                    .await?;
                report(cx.session.change_password(&current, &new).await)
            }
        }
    }
}
