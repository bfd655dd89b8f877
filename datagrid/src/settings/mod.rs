//! Storage for persisted grid configuration.
//!
//! A [`SettingsBackend`] keeps JSON text by key; [`SettingsProvider`] is the
//! typed front the grid talks to. JSON keeps the stored values readable and
//! identical across backends.

mod backend;
mod memory;
mod sqlite;

pub use backend::SettingsBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings database: {0}")]
    Database(#[from] async_sqlite::Error),
    #[error("cannot encode {key}: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
    #[error("stored {key} is not valid: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
}

/// Typed access to a shared [`SettingsBackend`].
#[derive(Clone)]
pub struct SettingsProvider {
    backend: Arc<dyn SettingsBackend>,
}

impl SettingsProvider {
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    /// Use a backend that is also held elsewhere, e.g. by a test.
    pub fn from_shared(backend: Arc<dyn SettingsBackend>) -> Self {
        Self { backend }
    }

    /// Read and decode `key`. A missing key is `Ok(None)`.
    pub async fn get<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>, SettingsError> {
        let Some(json) = self.backend.get_item(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| SettingsError::Decode {
                key: key.to_string(),
                source,
            })
    }

    pub async fn set<V: Serialize + Sync>(&self, key: &str, value: &V) -> Result<(), SettingsError> {
        let json = serde_json::to_string(value).map_err(|source| SettingsError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.set_item(key, json).await
    }

    pub async fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.backend.remove_item(key).await
    }
}
