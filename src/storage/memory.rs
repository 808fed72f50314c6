// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;

use super::{IsPersistent, Storage};

/// Process-local slot, used with `--no-persist-session` or when no data
/// directory is available. Clones share one value, so a caller can keep a
/// handle and watch what the credential record writes.
#[derive(Clone)]
pub(crate) struct Memory<T> {
    value: Arc<RwLock<Option<T>>>,
}

impl<T> Memory<T> {
    pub(crate) fn new() -> Self {
        Self::holding(None)
    }

    /// A slot that starts out holding `value`.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn with(value: T) -> Self {
        Self::holding(Some(value))
    }

    fn holding(value: Option<T>) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
        }
    }
}

impl<T> IsPersistent for Memory<T> {
    fn is_persistent(&self) -> bool {
        false
    }
}

#[async_trait]
impl<T: Send + Sync + Clone> Storage<T> for Memory<T> {
    async fn get(&mut self) -> Result<Option<T>> {
        Ok(self.value.read().await.clone())
    }

    async fn update(&mut self, data: &T) -> Result<()> {
        *self.value.write().await = Some(data.clone());
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        let _ = self.value.write().await.take();
        Ok(())
    }
}
