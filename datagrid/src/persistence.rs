//! Per-grid persisted configuration.
//!
//! Four values are stored per grid: the selected column ids, the column
//! widths, the column order and the sort state. Keys are namespaced by row
//! type and table id (`Torrent.ColumnWidths.main`) so several grids over the
//! same row type keep separate configuration.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::settings::{SettingsError, SettingsProvider};
use crate::sort::SortState;

/// Column id → width. `None` means auto width.
pub type ColumnWidths = HashMap<String, Option<u32>>;

/// Column id → display rank.
pub type ColumnOrder = HashMap<String, i32>;

const SELECTION: &str = "ColumnSelection";
const SORT: &str = "ColumnSort";
const WIDTHS: &str = "ColumnWidths";
const ORDER: &str = "ColumnOrder";

/// Everything stored for one grid. Missing or unreadable entries are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridConfig {
    pub selected_columns: Option<HashSet<String>>,
    pub widths: Option<ColumnWidths>,
    pub order: Option<ColumnOrder>,
    pub sort: Option<SortState>,
}

/// Reads and writes one grid's configuration through a [`SettingsProvider`].
///
/// Loads never fail: a missing key, a backend error or a payload that no
/// longer matches the expected shape all read as "no stored preference".
/// Saves compare against the caller's current value first and skip the
/// write when nothing changed.
#[derive(Clone)]
pub struct GridPersistence {
    settings: SettingsProvider,
    type_name: String,
    table_id: String,
}

impl GridPersistence {
    pub fn new(
        settings: SettingsProvider,
        type_name: impl Into<String>,
        table_id: impl Into<String>,
    ) -> Self {
        Self {
            settings,
            type_name: type_name.into(),
            table_id: table_id.into(),
        }
    }

    /// `{Type}.{tableId}`, identifying this grid.
    pub fn scope(&self) -> String {
        format!("{}.{}", self.type_name, self.table_id)
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    fn key(&self, kind: &str) -> String {
        format!("{}.{}.{}", self.type_name, kind, self.table_id)
    }

    pub fn selection_key(&self) -> String {
        self.key(SELECTION)
    }

    pub fn sort_key(&self) -> String {
        self.key(SORT)
    }

    pub fn widths_key(&self) -> String {
        self.key(WIDTHS)
    }

    pub fn order_key(&self) -> String {
        self.key(ORDER)
    }

    async fn load_value<V: DeserializeOwned>(&self, key: String) -> Option<V> {
        match self.settings.get::<V>(&key).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("[grid] ignoring stored {}: {}", key, e);
                None
            }
        }
    }

    async fn save_value<V: Serialize + PartialEq + Sync>(
        &self,
        key: String,
        current: Option<&V>,
        next: &V,
    ) -> Result<bool, SettingsError> {
        if current == Some(next) {
            return Ok(false);
        }
        self.settings.set(&key, next).await.inspect_err(|e| {
            log::error!("[grid] failed to store {}: {}", key, e);
        })?;
        log::debug!("[grid] stored {}", key);
        Ok(true)
    }

    pub async fn load_selected_columns(&self) -> Option<HashSet<String>> {
        self.load_value(self.selection_key()).await
    }

    pub async fn load_widths(&self) -> Option<ColumnWidths> {
        self.load_value(self.widths_key()).await
    }

    pub async fn load_order(&self) -> Option<ColumnOrder> {
        self.load_value(self.order_key()).await
    }

    pub async fn load_sort(&self) -> Option<SortState> {
        self.load_value(self.sort_key()).await
    }

    /// Load all four values.
    pub async fn load(&self) -> GridConfig {
        GridConfig {
            selected_columns: self.load_selected_columns().await,
            widths: self.load_widths().await,
            order: self.load_order().await,
            sort: self.load_sort().await,
        }
    }

    /// Store the selected columns unless they equal `current`.
    pub async fn save_selected_columns(
        &self,
        current: Option<&HashSet<String>>,
        next: &HashSet<String>,
    ) -> Result<bool, SettingsError> {
        self.save_value(self.selection_key(), current, next).await
    }

    /// Store the column widths unless they equal `current`.
    pub async fn save_widths(
        &self,
        current: Option<&ColumnWidths>,
        next: &ColumnWidths,
    ) -> Result<bool, SettingsError> {
        self.save_value(self.widths_key(), current, next).await
    }

    /// Store the column order unless it equals `current`.
    pub async fn save_order(
        &self,
        current: Option<&ColumnOrder>,
        next: &ColumnOrder,
    ) -> Result<bool, SettingsError> {
        self.save_value(self.order_key(), current, next).await
    }

    /// Store the sort state unless it equals `current`.
    pub async fn save_sort(
        &self,
        current: Option<&SortState>,
        next: &SortState,
    ) -> Result<bool, SettingsError> {
        self.save_value(self.sort_key(), current, next).await
    }

    pub async fn remove_sort(&self) -> Result<(), SettingsError> {
        self.settings.remove(&self.sort_key()).await
    }

    /// Remove every stored value for this grid.
    pub async fn reset(&self) -> Result<(), SettingsError> {
        for key in [
            self.selection_key(),
            self.widths_key(),
            self.order_key(),
            self.sort_key(),
        ] {
            self.settings.remove(&key).await?;
        }
        log::info!("[grid] reset configuration for {}", self.scope());
        Ok(())
    }
}
