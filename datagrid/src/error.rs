//! Grid error type.

use thiserror::Error;

use crate::keybinds::KeybindError;
use crate::settings::SettingsError;

/// Errors surfaced by grid operations that write to collaborators.
///
/// Reading stored configuration never fails; only writes to the settings
/// store and keyboard (un)registration report errors.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("keyboard: {0}")]
    Keybind(#[from] KeybindError),
}
