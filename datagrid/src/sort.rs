//! Sort state and row ordering.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::column::ColumnDefinition;

/// Direction of the active sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
    /// Keep the input order.
    #[default]
    None,
}

impl SortDirection {
    /// Map `None` to `Ascending`, keeping the other directions.
    pub fn or_ascending(self) -> Self {
        match self {
            SortDirection::None => SortDirection::Ascending,
            other => other,
        }
    }

    /// The opposite direction. `None` flips to `Ascending`.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending | SortDirection::None => SortDirection::Ascending,
        }
    }
}

/// The active sort column and direction.
///
/// This is also the value persisted under the `ColumnSort` key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// No sort column, no direction.
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Sort by a column in a direction.
    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: Some(column.into()),
            direction,
        }
    }

    /// Returns `true` when there is no sort column.
    pub fn is_unsorted(&self) -> bool {
        self.column.is_none()
    }
}

/// A transition between two distinct sort states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortChange {
    pub previous: SortState,
    pub current: SortState,
}

/// Owns the sort state and its transitions.
///
/// Every method that can move the state returns the [`SortChange`] it made,
/// or `None` when the observable `(column, direction)` pair is unchanged.
#[derive(Debug, Clone, Default)]
pub struct SortController {
    state: SortState,
}

impl SortController {
    /// Create a controller in the given state.
    pub fn new(state: SortState) -> Self {
        Self { state }
    }

    /// The current state.
    pub fn state(&self) -> &SortState {
        &self.state
    }

    /// Move to an arbitrary state.
    pub fn set(&mut self, next: SortState) -> Option<SortChange> {
        if self.state == next {
            return None;
        }
        let previous = std::mem::replace(&mut self.state, next);
        log::debug!(
            "[sort] {:?}/{:?} -> {:?}/{:?}",
            previous.column,
            previous.direction,
            self.state.column,
            self.state.direction
        );
        Some(SortChange {
            previous,
            current: self.state.clone(),
        })
    }

    /// Handle a sort request from a column header.
    ///
    /// A request for [`SortDirection::None`] cannot be applied and is ignored.
    pub fn request(&mut self, column: &str, direction: SortDirection) -> Option<SortChange> {
        if direction == SortDirection::None {
            return None;
        }
        self.set(SortState::by(column, direction))
    }

    /// Re-check the state against the current visible columns.
    ///
    /// With no visible columns the grid is unsorted. When the active column is
    /// not visible, the first visible column takes over with its initial
    /// direction. Calling this twice with the same columns changes nothing the
    /// second time.
    pub fn validate<T>(&mut self, visible: &[ColumnDefinition<T>]) -> Option<SortChange> {
        let Some(first) = visible.first() else {
            return self.set(SortState::unsorted());
        };

        let active_visible = self
            .state
            .column
            .as_deref()
            .is_some_and(|id| visible.iter().any(|c| c.id == id));

        if active_visible {
            return None;
        }

        self.set(SortState::by(
            first.id.clone(),
            first.initial_direction.or_ascending(),
        ))
    }

    /// Choose the sort state for a freshly loaded grid.
    ///
    /// Preference order: the persisted state (if its column still exists),
    /// the host's explicit default, the first selected and enabled column,
    /// then the first enabled column.
    pub fn initial<T>(
        persisted: Option<SortState>,
        default_column: Option<&str>,
        default_direction: Option<SortDirection>,
        columns: &[ColumnDefinition<T>],
        selected: &HashSet<String>,
    ) -> SortState {
        let find = |id: &str| columns.iter().find(|c| c.id == id);

        if let Some(state) = persisted {
            match state.column.as_deref() {
                Some(id) if find(id).is_some() => {
                    return SortState::by(id, state.direction.or_ascending());
                }
                Some(id) => log::debug!("[sort] dropping persisted sort on unknown column {}", id),
                None => {}
            }
        }

        if let Some(column) = default_column.and_then(find) {
            let direction = default_direction.unwrap_or(column.initial_direction);
            return SortState::by(column.id.clone(), direction.or_ascending());
        }

        columns
            .iter()
            .find(|c| c.enabled && selected.contains(&c.id))
            .or_else(|| columns.iter().find(|c| c.enabled))
            .map(|c| SortState::by(c.id.clone(), c.initial_direction.or_ascending()))
            .unwrap_or_default()
    }
}

/// Order rows for display.
///
/// Pre-sorted input is returned unchanged. Otherwise rows are stably sorted by
/// the active column's value; `None` (or an unknown column) keeps input order.
pub fn sort_rows<T: Clone>(
    rows: &[T],
    state: &SortState,
    columns: &[ColumnDefinition<T>],
    pre_sorted: bool,
) -> Vec<T> {
    if pre_sorted || state.direction == SortDirection::None {
        return rows.to_vec();
    }
    let Some(column) = state
        .column
        .as_deref()
        .and_then(|id| columns.iter().find(|c| c.id == id))
    else {
        return rows.to_vec();
    };

    let mut keyed: Vec<_> = rows.iter().map(|row| (column.value(row), row)).collect();
    match state.direction {
        SortDirection::Descending => keyed.sort_by(|a, b| b.0.total_cmp(&a.0)),
        _ => keyed.sort_by(|a, b| a.0.total_cmp(&b.0)),
    }
    keyed.into_iter().map(|(_, row)| row.clone()).collect()
}
