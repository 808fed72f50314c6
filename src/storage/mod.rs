// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Client-local slots backing the persisted credential record.
//!
//! Every backend keys its entries by a [`Slot`]: the name of one half of the
//! record plus the API endpoint it belongs to, so sessions against different
//! deployments never see each other's credentials.

mod file;
#[cfg(feature = "keychain")]
mod keychain;
mod memory;
#[cfg(feature = "secret-service")]
mod secret_service;

use async_trait::async_trait;
use secrecy::SecretVec;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::error::Result;

pub(crate) use file::File;
#[cfg(feature = "keychain")]
pub(crate) use keychain::Keychain;
pub(crate) use memory::Memory;
#[cfg(feature = "secret-service")]
pub(crate) use secret_service::SecretService;

/// Identifies one half of the credential record for one API endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Slot {
    name: &'static str,
    endpoint: Url,
}

impl Slot {
    pub(crate) const TOKEN: &'static str = "token";
    pub(crate) const USER: &'static str = "user";

    pub(crate) fn new(endpoint: &Url, name: &'static str) -> Self {
        Self {
            name,
            endpoint: endpoint.clone(),
        }
    }

    pub(crate) const fn name(&self) -> &'static str {
        self.name
    }

    #[cfg_attr(
        not(any(feature = "keychain", feature = "secret-service")),
        allow(dead_code)
    )]
    pub(crate) const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Host and port of the endpoint, usable as a single path component.
    pub(crate) fn host_key(&self) -> String {
        let host = match (self.endpoint.host_str(), self.endpoint.port()) {
            (Some(host), Some(port)) => format!("{host}_{port}"),
            (Some(host), None) => host.to_owned(),
            (None, _) => "local".to_owned(),
        };
        host.replace(
            |c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'),
            "_",
        )
    }
}

/// Serialized form of a slot value. Keyring backends hand the bytes over
/// without copying them into non-secret buffers.
pub(crate) fn encode<T: Serialize + ?Sized>(data: &T) -> Result<SecretVec<u8>> {
    Ok(SecretVec::new(serde_json::to_vec(data)?))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

pub(crate) trait IsPersistent {
    fn is_persistent(&self) -> bool;
}

impl<T: IsPersistent + ?Sized> IsPersistent for Box<T> {
    fn is_persistent(&self) -> bool {
        (**self).is_persistent()
    }
}

/// A single named slot of client-local storage.
#[async_trait]
pub(crate) trait Storage<T>: Send + Sync + IsPersistent {
    async fn get(&mut self) -> Result<Option<T>>;
    async fn update(&mut self, data: &T) -> Result<()>;
    /// Removes the slot. Every backend treats a missing entry as already
    /// cleared.
    async fn clear(&mut self) -> Result<()>;
}

#[async_trait]
impl<Tn: Sync, T: Storage<Tn> + ?Sized> Storage<Tn> for Box<T> {
    async fn get(&mut self) -> Result<Option<Tn>> {
        (**self).get().await
    }

    async fn update(&mut self, data: &Tn) -> Result<()> {
        (**self).update(data).await
    }

    async fn clear(&mut self) -> Result<()> {
        (**self).clear().await
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::Result, model::User};

    use super::*;

    #[test]
    fn host_key_keeps_ports_apart() -> Result<()> {
        let local = Url::parse("http://localhost:4000/api")?;
        let hosted = Url::parse("https://blog-app-7u5b.onrender.com/api")?;

        assert_eq!(Slot::new(&local, Slot::TOKEN).host_key(), "localhost_4000");
        assert_eq!(
            Slot::new(&hosted, Slot::USER).host_key(),
            "blog-app-7u5b.onrender.com"
        );
        Ok(())
    }

    #[test]
    fn host_key_has_no_separators() -> Result<()> {
        let v6 = Url::parse("http://[::1]:4000/api")?;

        let key = Slot::new(&v6, Slot::TOKEN).host_key();

        assert!(!key.contains(['/', ':', '[', ']']), "{key}");
        Ok(())
    }

    #[test]
    fn undecodable_bytes_are_a_format_error() {
        assert!(matches!(
            decode::<User>(b"{\"id\":"),
            Err(crate::error::Error::Json(_))
        ));
    }
}
