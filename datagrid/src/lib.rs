//! Interactive data-grid controller
//!
//! Column visibility, ordering and widths, single- and multi-row selection,
//! keyboard navigation and sorting for tabular views over any row type,
//! with per-table configuration persisted through a settings backend.

pub mod column;
pub mod dialog;
pub mod error;
pub mod events;
pub mod grid;
pub mod keybinds;
pub mod persistence;
pub mod resolver;
pub mod row;
pub mod selection;
pub mod settings;
pub mod sort;
pub mod value;

pub use column::{Alignment, ColumnDefinition};
pub use error::GridError;
pub use grid::{DataGrid, GridParams};
pub use row::GridRow;
pub use sort::{SortDirection, SortState};
pub use value::CellValue;

pub mod prelude {
    pub use crate::column::{Alignment, ColumnDefinition, column_id};
    pub use crate::dialog::{ColumnOptions, ColumnOptionsDialog};
    pub use crate::error::GridError;
    pub use crate::events::{EventResult, GridEvent, Modifiers, RowClick};
    pub use crate::grid::{DataGrid, GridParams};
    pub use crate::keybinds::{Key, KeyCombo, KeyboardRegistry, KeyboardService};
    pub use crate::persistence::{ColumnOrder, ColumnWidths, GridPersistence};
    pub use crate::row::GridRow;
    pub use crate::selection::SelectionMode;
    pub use crate::settings::{MemoryBackend, SettingsProvider, SqliteBackend};
    pub use crate::sort::{SortDirection, SortState};
    pub use crate::value::CellValue;
}
