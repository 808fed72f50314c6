// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    missing_doc_code_examples,
    private_doc_tests,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod command;
mod config;
mod credentials;
mod error;
mod gateway;
mod metadata;
mod model;
mod password;
mod session;
mod share;
mod storage;

use std::{path::PathBuf, process, sync::Arc};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use command::{Access, Command as _, Context};
use credentials::Credentials;
use error::Result;
use log::{error, info, warn};
use serde::{de::DeserializeOwned, Serialize};
use session::Manager;
use storage::Slot;
use url::Url;

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Account(command::account::Command),
    #[command(subcommand)]
    Blog(command::blog::Command),
    #[command(subcommand)]
    Comment(command::comment::Command),
    Like(command::social::Like),
    Share(command::social::Share),
}

#[async_trait]
impl command::Command for Command {
    fn access(&self) -> Access {
        match self {
            Self::Account(cmd) => cmd.access(),
            Self::Blog(cmd) => cmd.access(),
            Self::Comment(cmd) => cmd.access(),
            Self::Like(cmd) => cmd.access(),
            Self::Share(cmd) => cmd.access(),
        }
    }

    async fn execute(self, cx: &Context) -> Result<()> {
        match self {
            Self::Account(cmd) => cmd.execute(cx).await,
            Self::Blog(cmd) => cmd.execute(cx).await,
            Self::Comment(cmd) => cmd.execute(cx).await,
            Self::Like(cmd) => cmd.execute(cx).await,
            Self::Share(cmd) => cmd.execute(cx).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The deployment of the blog service to use.
    #[arg(long, env = "QUIRE_ENV", value_enum, default_value_t)]
    environment: config::Environment,

    /// The base URL of the blog API. Overrides the one implied by
    /// `--environment`.
    #[arg(long, env = "QUIRE_API_URL", value_parser = Url::parse)]
    api_url: Option<Url>,

    /// The public address of the blog web site, used when printing links.
    #[arg(long, env = "QUIRE_SITE_URL", default_value = "http://localhost:3000", value_parser = Url::parse)]
    site_url: Url,

    /// Keep the session in memory only. It ends when this program exits.
    #[arg(long)]
    no_persist_session: bool,

    /// The path to the Pinentry program to use when asking for passwords.
    #[arg(long, value_hint = clap::ValueHint::ExecutablePath)]
    pinentry_program: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

async fn get_credential_storage<
    T: Send + Serialize + Sync + DeserializeOwned + Clone + 'static,
>(
    args: &Args,
    slot: &Slot,
) -> Box<dyn storage::Storage<T>> {
    if !args.no_persist_session {
        #[cfg(feature = "secret-service")]
        match storage::SecretService::new(slot).await {
            Ok(secret_service_storage) => return Box::new(secret_service_storage),
            Err(e) => {
                warn!("We need to fall back to unencrypted file storage because we can't connect to the secret service: {}", e);
            }
        }

        #[cfg(feature = "keychain")]
        match storage::Keychain::new(slot) {
            Ok(keychain_storage) => return Box::new(keychain_storage),
            Err(e) => {
                warn!("We need to fall back to unencrypted file storage because we can't connect to Keychain: {}", e);
            }
        }

        match storage::File::new(slot) {
            Ok(file_storage) => return Box::new(file_storage),
            Err(e) => {
                warn!("The session will not be kept after this program exits: {}", e);
            }
        }
    }

    Box::new(storage::Memory::<T>::new())
}

async fn run(args: Args) -> Result<()> {
    let prompt: Vec<Box<dyn password::Prompt>> = vec![
        Box::new(args.pinentry_program.clone().map_or_else(
            password::PinentryPrompt::new,
            password::PinentryPrompt::new_with_executable,
        )),
        Box::new(password::RpasswordPrompt),
    ];

    let api_url = config::api_url(args.environment, args.api_url.as_ref())?;
    info!("Using blog API at {}", api_url);

    let credentials = Credentials::new(
        get_credential_storage(&args, &Slot::new(&api_url, Slot::TOKEN)).await,
        get_credential_storage(&args, &Slot::new(&api_url, Slot::USER)).await,
    );
    let session = Manager::new(Arc::new(gateway::Http::new()?), api_url, credentials)?;

    let restored = session.bootstrap().await;
    debug_assert!(!restored.is_loading());
    if let Some(user) = restored.user() {
        info!("Restored session for {}", user.display_name());
    }

    if args.command.access() == Access::Protected && !restored.is_authenticated() {
        error!("You need to log in first: run `account login --email <EMAIL>`");
        return Err(error::Error::AuthRequired);
    }

    let cx = Context {
        session,
        prompt: Box::new(prompt),
        site: args.site_url,
    };
    command::Command::execute(args.command, &cx).await
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("QUIRE_LOG", "warn")
        .write_style("QUIRE_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}
