// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::ExposeSecret as _;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::{self, Result},
    metadata,
};

use super::{IsPersistent, Slot, Storage};

const APPLICATION: &str = "application";
const SLOT: &str = "slot";
const ENDPOINT: &str = "endpoint";

/// Item in the default Secret Service collection. Items are found by their
/// attributes; the label is only what keyring managers show.
pub(crate) struct SecretService {
    keyring: oo7::Keyring,
    label: String,
    attributes: Vec<(&'static str, String)>,
}

/// Shown in keyring managers, e.g. "Quire token for localhost_4000".
fn label(slot: &Slot) -> String {
    format!(
        "{} {} for {}",
        *metadata::CLIENT_DISPLAY_NAME,
        slot.name(),
        slot.host_key()
    )
}

fn attributes(slot: &Slot) -> Vec<(&'static str, String)> {
    vec![
        (APPLICATION, metadata::CLIENT_NAME.clone()),
        (SLOT, slot.name().to_owned()),
        (ENDPOINT, slot.endpoint().to_string()),
    ]
}

impl SecretService {
    pub(crate) async fn new(slot: &Slot) -> Result<Self> {
        Ok(Self {
            keyring: oo7::Keyring::new().await.map_err(error::Storage::from)?,
            label: label(slot),
            attributes: attributes(slot),
        })
    }

    fn query(&self) -> HashMap<&str, &str> {
        self.attributes
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
            .collect()
    }

    /// Every item for this slot. There is normally at most one, but other
    /// clients writing the same attributes can leave duplicates.
    async fn items(&self) -> Result<Vec<oo7::Item>> {
        Ok(self
            .keyring
            .search_items(self.query())
            .await
            .map_err(error::Storage::from)?)
    }
}

impl IsPersistent for SecretService {
    fn is_persistent(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + Serialize + Sync> Storage<T> for SecretService {
    async fn get(&mut self) -> Result<Option<T>> {
        match self.items().await?.into_iter().next() {
            Some(item) => {
                let secret = item.secret().await.map_err(error::Storage::from)?;
                super::decode(&secret).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn update(&mut self, data: &T) -> Result<()> {
        let bytes = super::encode(data)?;
        self.keyring
            .create_item(&self.label, self.query(), bytes.expose_secret(), true)
            .await
            .map_err(error::Storage::from)?;
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        for item in self.items().await? {
            item.delete().await.map_err(error::Storage::from)?;
        }
        Ok(())
    }
}
