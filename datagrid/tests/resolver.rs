//! Tests for visible column resolution.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{Item, ids, named};
use datagrid::ColumnDefinition;
use datagrid::persistence::{ColumnOrder, ColumnWidths};
use datagrid::resolver::{ColumnFilter, ColumnResolver, ColumnSource, visible_columns};

fn set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn resolve(
    definitions: &[ColumnDefinition<Item>],
    selected: &HashSet<String>,
    filter: Option<&ColumnFilter<Item>>,
    order: &ColumnOrder,
    widths: &ColumnWidths,
) -> Vec<ColumnDefinition<Item>> {
    visible_columns(&ColumnSource {
        definitions,
        selected,
        filter,
        order,
        widths,
    })
}

fn source<'a>(
    definitions: &'a [ColumnDefinition<Item>],
    selected: &'a HashSet<String>,
    order: &'a ColumnOrder,
    widths: &'a ColumnWidths,
) -> ColumnSource<'a, Item> {
    ColumnSource {
        definitions,
        selected,
        filter: None,
        order,
        widths,
    }
}

// =============================================================================
// Selection and filtering
// =============================================================================

#[test]
fn test_only_selected_columns_are_visible() {
    let defs = named(&["A", "B", "C", "D"]);
    let visible = resolve(
        &defs,
        &set(&["b", "d"]),
        None,
        &ColumnOrder::new(),
        &ColumnWidths::new(),
    );
    assert_eq!(ids(&visible), vec!["b", "d"]);
}

#[test]
fn test_filter_predicate_hides_columns() {
    let defs = named(&["A", "B", "C"]);
    let filter: ColumnFilter<Item> = Arc::new(|c: &ColumnDefinition<Item>| c.id != "b");
    let visible = resolve(
        &defs,
        &set(&["a", "b", "c"]),
        Some(&filter),
        &ColumnOrder::new(),
        &ColumnWidths::new(),
    );
    assert_eq!(ids(&visible), vec!["a", "c"]);
}

#[test]
fn test_duplicate_ids_are_dropped() {
    let mut defs = named(&["A", "B"]);
    defs.push(ColumnDefinition::new("A", |_: &Item| datagrid::CellValue::from(1i64)).width(99));
    let visible = resolve(
        &defs,
        &set(&["a", "b"]),
        None,
        &ColumnOrder::new(),
        &ColumnWidths::new(),
    );
    assert_eq!(ids(&visible), vec!["a", "b"]);
    assert_eq!(visible[0].width, None);
}

#[test]
fn test_empty_selection_shows_nothing() {
    let defs = named(&["A", "B"]);
    let visible = resolve(
        &defs,
        &HashSet::new(),
        None,
        &ColumnOrder::new(),
        &ColumnWidths::new(),
    );
    assert!(visible.is_empty());
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_ranked_columns_come_first() {
    let defs = named(&["A", "B", "C", "D"]);
    let order = ColumnOrder::from([("c".to_string(), 0), ("a".to_string(), 1)]);
    let visible = resolve(
        &defs,
        &set(&["a", "b", "c", "d"]),
        None,
        &order,
        &ColumnWidths::new(),
    );
    assert_eq!(ids(&visible), vec!["c", "a", "b", "d"]);
}

#[test]
fn test_ranks_for_hidden_columns_are_ignored() {
    let defs = named(&["A", "B", "C"]);
    let order = ColumnOrder::from([
        ("gone".to_string(), 0),
        ("c".to_string(), 5),
        ("b".to_string(), 7),
    ]);
    let visible = resolve(
        &defs,
        &set(&["a", "b", "c"]),
        None,
        &order,
        &ColumnWidths::new(),
    );
    assert_eq!(ids(&visible), vec!["c", "b", "a"]);
}

// =============================================================================
// Width overlay
// =============================================================================

#[test]
fn test_widths_overlay_copies_only() {
    let defs: Vec<_> = named(&["A", "B", "C"])
        .into_iter()
        .map(|c| if c.id == "c" { c.width(80) } else { c })
        .collect();
    let widths = ColumnWidths::from([("b".to_string(), Some(200)), ("c".to_string(), None)]);

    let visible = resolve(
        &defs,
        &set(&["a", "b", "c"]),
        None,
        &ColumnOrder::new(),
        &widths,
    );

    assert_eq!(visible[0].width, None);
    assert_eq!(visible[1].width, Some(200));
    assert_eq!(visible[2].width, None);
    assert_eq!(defs[1].width, None);
    assert_eq!(defs[2].width, Some(80));
}

// =============================================================================
// Memoisation
// =============================================================================

#[test]
fn test_resolver_caches_until_invalidated() {
    let defs = named(&["A", "B"]);
    let order = ColumnOrder::new();
    let widths = ColumnWidths::new();
    let mut resolver = ColumnResolver::new();
    assert!(!resolver.is_cached());

    let first = set(&["a"]);
    let second = set(&["a", "b"]);
    assert_eq!(resolver.resolve(source(&defs, &first, &order, &widths)).len(), 1);
    assert!(resolver.is_cached());

    // Stale until invalidated.
    assert_eq!(resolver.resolve(source(&defs, &second, &order, &widths)).len(), 1);

    resolver.invalidate();
    assert!(!resolver.is_cached());
    assert_eq!(resolver.resolve(source(&defs, &second, &order, &widths)).len(), 2);
}
