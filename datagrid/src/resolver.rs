//! Visible column resolution.

use std::collections::HashSet;
use std::sync::Arc;

use crate::column::ColumnDefinition;
use crate::persistence::{ColumnOrder, ColumnWidths};

/// Host predicate deciding whether a column may be shown.
pub type ColumnFilter<T> = Arc<dyn Fn(&ColumnDefinition<T>) -> bool + Send + Sync>;

/// Inputs to visible column resolution.
pub struct ColumnSource<'a, T> {
    /// All known definitions, in host order.
    pub definitions: &'a [ColumnDefinition<T>],
    /// Ids the user chose to show.
    pub selected: &'a HashSet<String>,
    /// Host filter predicate.
    pub filter: Option<&'a ColumnFilter<T>>,
    /// Persisted display ranks.
    pub order: &'a ColumnOrder,
    /// Persisted width overlay.
    pub widths: &'a ColumnWidths,
}

/// Compute the visible columns.
///
/// Keeps definitions that are selected and pass the filter, drops duplicate
/// ids, orders ranked columns by rank and appends unranked ones in their
/// original order, then overlays persisted widths on the copies. Ranks for
/// ids that are not visible are ignored.
pub fn visible_columns<T>(source: &ColumnSource<'_, T>) -> Vec<ColumnDefinition<T>> {
    let mut seen = HashSet::new();
    let filtered: Vec<&ColumnDefinition<T>> = source
        .definitions
        .iter()
        .filter(|c| source.selected.contains(&c.id))
        .filter(|c| source.filter.is_none_or(|filter| filter(*c)))
        .filter(|c| seen.insert(c.id.as_str()))
        .collect();

    let (mut ranked, unranked): (Vec<_>, Vec<_>) = filtered
        .into_iter()
        .partition(|c| source.order.contains_key(&c.id));
    ranked.sort_by_key(|c| source.order.get(&c.id).copied().unwrap_or(i32::MAX));

    ranked
        .into_iter()
        .chain(unranked)
        .map(|c| {
            let mut column = c.clone();
            if let Some(width) = source.widths.get(&column.id) {
                column.width = *width;
            }
            column
        })
        .collect()
}

/// Memoised visible columns.
///
/// The cache is cleared by the grid whenever one of the inputs changes.
#[derive(Debug)]
pub struct ColumnResolver<T> {
    cached: Option<Vec<ColumnDefinition<T>>>,
}

impl<T> Default for ColumnResolver<T> {
    fn default() -> Self {
        Self { cached: None }
    }
}

impl<T> ColumnResolver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached result.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Returns `true` if a result is cached.
    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// The cached result, computing it from `source` on a miss.
    pub fn resolve(&mut self, source: ColumnSource<'_, T>) -> &[ColumnDefinition<T>] {
        self.cached.get_or_insert_with(|| visible_columns(&source))
    }
}
