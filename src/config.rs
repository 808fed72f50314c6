// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use clap::ValueEnum;
use url::Url;

use crate::error::Result;

const DEVELOPMENT_API: &str = "http://localhost:4000/api";
const PRODUCTION_API: &str = "https://blog-app-7u5b.onrender.com/api";

/// Which deployment of the blog service to talk to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub(crate) fn api_url(self) -> Result<Url> {
        Ok(Url::parse(match self {
            Self::Development => DEVELOPMENT_API,
            Self::Production => PRODUCTION_API,
        })?)
    }
}

/// The base URL of the API: an explicit override wins over the environment.
pub(crate) fn api_url(environment: Environment, explicit: Option<&Url>) -> Result<Url> {
    match explicit {
        Some(url) => Ok(url.clone()),
        None => environment.api_url(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_selects_the_deployment() -> Result<()> {
        assert_eq!(
            api_url(Environment::Development, None)?.as_str(),
            "http://localhost:4000/api"
        );
        assert_eq!(
            api_url(Environment::Production, None)?.as_str(),
            "https://blog-app-7u5b.onrender.com/api"
        );
        Ok(())
    }

    #[test]
    fn explicit_url_wins() -> Result<()> {
        let explicit = Url::parse("https://staging.example/api")?;
        assert_eq!(
            api_url(Environment::Production, Some(&explicit))?,
            explicit
        );
        Ok(())
    }
}
