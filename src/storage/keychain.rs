// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use secrecy::ExposeSecret as _;
use security_framework::{
    base,
    os::macos::{
        keychain::{SecKeychain, SecPreferencesDomain},
        keychain_item::SecKeychainItem,
        passwords::SecKeychainItemPassword,
    },
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::{self, Result},
    metadata,
};

use super::{IsPersistent, Slot, Storage};

const ERR_SEC_ITEM_NOT_FOUND: i32 = -25300_i32;

/// Generic password item in the login keychain. The service names the
/// client and the API endpoint; the account names the slot, so Keychain
/// Access lists one "quire" entry per deployment with a `token` and a
/// `user` item.
pub(crate) struct Keychain {
    delegate: SecKeychain,
    service: String,
    account: &'static str,
}

fn service(slot: &Slot) -> String {
    format!("{} ({})", *metadata::CLIENT_NAME, slot.endpoint())
}

impl Keychain {
    pub(crate) fn new(slot: &Slot) -> Result<Self> {
        Ok(Self {
            delegate: SecKeychain::default_for_domain(SecPreferencesDomain::User)
                .map_err(error::Storage::from)?,
            service: service(slot),
            account: slot.name(),
        })
    }

    /// The stored item, if there is one.
    fn find(&self) -> Result<Option<(SecKeychainItemPassword, SecKeychainItem)>> {
        match self
            .delegate
            .find_generic_password(&self.service, self.account)
        {
            Ok(found) => Ok(Some(found)),
            Err(err) if is_missing(&err) => Ok(None),
            Err(err) => Err(error::Storage::from(err).into()),
        }
    }
}

fn is_missing(err: &base::Error) -> bool {
    err.code() == ERR_SEC_ITEM_NOT_FOUND
}

impl IsPersistent for Keychain {
    fn is_persistent(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + Serialize + Sync> Storage<T> for Keychain {
    async fn get(&mut self) -> Result<Option<T>> {
        self.find()?
            .map(|(password, _)| super::decode(&password))
            .transpose()
    }

    async fn update(&mut self, data: &T) -> Result<()> {
        let bytes = super::encode(data)?;
        self.delegate
            .set_generic_password(&self.service, self.account, bytes.expose_secret())
            .map_err(error::Storage::from)?;
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        if let Some((_, item)) = self.find()? {
            item.delete();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::error::Result;

    use super::*;

    #[test]
    fn service_names_the_endpoint() -> Result<()> {
        let api = Url::parse("http://localhost:4000/api")?;

        assert_eq!(
            service(&Slot::new(&api, Slot::TOKEN)),
            "quire (http://localhost:4000/api)"
        );
        Ok(())
    }

    #[test]
    fn only_item_not_found_counts_as_missing() {
        assert!(is_missing(&base::Error::from_code(ERR_SEC_ITEM_NOT_FOUND)));
        assert!(!is_missing(&base::Error::from_code(-25293)));
    }
}
