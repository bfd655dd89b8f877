//! Input events consumed by the grid and notifications it emits.

use std::collections::HashSet;
use std::time::Instant;

use crate::sort::SortDirection;

/// Modifier keys held during a click or key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Default::default()
        }
    }

    pub fn ctrl_shift() -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Default::default()
        }
    }
}

/// A click on a data row.
#[derive(Debug, Clone)]
pub struct RowClick<T> {
    /// The clicked row.
    pub row: T,
    /// Modifiers held during the click.
    pub modifiers: Modifiers,
    /// When the click happened.
    pub at: Instant,
}

impl<T> RowClick<T> {
    /// A click happening now.
    pub fn new(row: T, modifiers: Modifiers) -> Self {
        Self {
            row,
            modifiers,
            at: Instant::now(),
        }
    }

    /// A click at a specific instant.
    pub fn at(row: T, modifiers: Modifiers, at: Instant) -> Self {
        Self { row, modifiers, at }
    }
}

/// Result of handling an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Not handled; the host may pass it on.
    Ignored,
    Consumed,
}

/// Notification for the embedding application.
///
/// The grid queues these while handling input; the host drains them with
/// [`DataGrid::take_events`](crate::DataGrid::take_events).
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent<T> {
    /// A row was clicked (forwarded even when selection did not change).
    RowClick { row: T, modifiers: Modifiers },
    /// The single selected item changed (single-selection mode only).
    SelectedItemChanged(Option<T>),
    /// The selected set changed. Items are in displayed order.
    SelectedItemsChanged(Vec<T>),
    /// The sort column changed.
    SortColumnChanged(Option<String>),
    /// The sort direction changed.
    SortDirectionChanged(SortDirection),
    /// The user changed which columns are shown.
    SelectedColumnsChanged(HashSet<String>),
    /// Context menu requested on a cell.
    CellContextMenu { row: T, column_id: String },
    /// Long press on a cell.
    CellLongPress { row: T, column_id: String },
    /// Enter pressed with exactly one row selected.
    ItemActivated(T),
}
