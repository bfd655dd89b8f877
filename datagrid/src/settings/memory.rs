use async_trait::async_trait;
use dashmap::DashMap;

use super::{SettingsBackend, SettingsError};

/// Grid configuration that lives only as long as the process.
///
/// ```
/// use datagrid::settings::{MemoryBackend, SettingsProvider};
///
/// let settings = SettingsProvider::new(MemoryBackend::new());
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: DashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl SettingsBackend for MemoryBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.items.get(key).map(|json| json.value().clone()))
    }

    async fn set_item(&self, key: &str, json: String) -> Result<(), SettingsError> {
        self.items.insert(key.to_string(), json);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), SettingsError> {
        self.items.remove(key);
        Ok(())
    }
}
