use async_trait::async_trait;

use super::SettingsError;

/// Key/value store holding grid configuration as JSON text.
///
/// Mirrors a browser-style storage API: items are addressed by string key
/// and a missing key is not an error.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Insert or overwrite `key`.
    async fn set_item(&self, key: &str, json: String) -> Result<(), SettingsError>;

    /// Removing a missing key succeeds.
    async fn remove_item(&self, key: &str) -> Result<(), SettingsError>;
}
