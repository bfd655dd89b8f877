//! Column options dialog contract.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::column::ColumnDefinition;
use crate::persistence::{ColumnOrder, ColumnWidths};
use crate::row::GridRow;

/// Column configuration edited by the options dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnOptions {
    pub selected_columns: HashSet<String>,
    pub widths: ColumnWidths,
    pub order: ColumnOrder,
}

/// Dialog that lets the user pick, size and order columns.
///
/// Returns `None` when the user cancels.
#[async_trait]
pub trait ColumnOptionsDialog<T: GridRow>: Send + Sync {
    async fn show(
        &self,
        columns: &[ColumnDefinition<T>],
        current: &ColumnOptions,
    ) -> Option<ColumnOptions>;
}
