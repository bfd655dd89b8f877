//! Console error type.

use datagrid::GridError;
use datagrid::keybinds::KeybindError;
use datagrid::settings::SettingsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("{0}")]
    Usage(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid row data: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("invalid key: {0}")]
    Keybind(#[from] KeybindError),
}

impl ConsoleError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}
