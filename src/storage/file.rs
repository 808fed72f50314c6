// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use secrecy::ExposeSecret as _;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::{self, Result},
    metadata,
};

use super::{IsPersistent, Slot, Storage};

/// Unencrypted JSON file per slot, under
/// `<data dir>/sessions/<host>/<slot>.json`.
pub(crate) struct File {
    path: PathBuf,
}

impl File {
    pub(crate) fn new(slot: &Slot) -> Result<Self> {
        metadata::PROJECT_DIRS
            .as_ref()
            .map(|dirs| Self::under(dirs.data_dir(), slot))
            .ok_or_else(|| error::Storage::NoProjectDirs.into())
    }

    pub(crate) fn under<P: AsRef<Path>>(root: P, slot: &Slot) -> Self {
        Self::at(
            root.as_ref()
                .join("sessions")
                .join(slot.host_key())
                .join(format!("{}.json", slot.name())),
        )
    }

    pub(crate) fn at<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }
}

impl IsPersistent for File {
    fn is_persistent(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: Send + Serialize + Sync + DeserializeOwned> Storage<T> for File {
    async fn get(&mut self) -> Result<Option<T>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(super::decode(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&mut self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = super::encode(data)?;
        fs::write(&self.path, bytes.expose_secret())?;
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            result => Ok(result?),
        }
    }
}
