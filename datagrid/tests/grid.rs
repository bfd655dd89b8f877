//! Tests for the grid controller lifecycle.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use common::{Item, columns, ids, item, items, keys};
use datagrid::prelude::*;
use datagrid::settings::{SettingsBackend, SettingsError};

struct Harness {
    grid: DataGrid<Item>,
    backend: Arc<MemoryBackend>,
    keyboard: Arc<KeyboardRegistry>,
}

fn harness(params: GridParams<Item>) -> Harness {
    let backend = Arc::new(MemoryBackend::new());
    let keyboard = Arc::new(KeyboardRegistry::new());
    let grid = DataGrid::new(
        params,
        SettingsProvider::from_shared(backend.clone()),
        keyboard.clone(),
    );
    Harness {
        grid,
        backend,
        keyboard,
    }
}

/// A loaded grid with the load notifications drained.
async fn loaded(params: GridParams<Item>) -> Harness {
    let h = harness(params);
    h.grid.load().await.unwrap();
    h.grid.take_events();
    h
}

fn multi() -> GridParams<Item> {
    GridParams::new("main", columns()).rows(items()).multi_selection()
}

fn single() -> GridParams<Item> {
    GridParams::new("main", columns())
        .rows(items())
        .select_on_row_click()
}

fn row(key: &str) -> Item {
    items().into_iter().find(|i| i.key == key).unwrap()
}

fn click(grid: &DataGrid<Item>, key: &str, modifiers: Modifiers) -> EventResult {
    grid.on_row_click(RowClick::new(row(key), modifiers))
}

struct FixedDialog(Option<ColumnOptions>);

#[async_trait]
impl ColumnOptionsDialog<Item> for FixedDialog {
    async fn show(
        &self,
        _columns: &[ColumnDefinition<Item>],
        _current: &ColumnOptions,
    ) -> Option<ColumnOptions> {
        self.0.clone()
    }
}

struct ReadOnlyBackend;

fn refused(key: &str) -> SettingsError {
    SettingsError::Encode {
        key: key.to_string(),
        source: serde_json::from_str::<u8>("read only").unwrap_err(),
    }
}

#[async_trait]
impl SettingsBackend for ReadOnlyBackend {
    async fn get_item(&self, _key: &str) -> Result<Option<String>, SettingsError> {
        Ok(None)
    }

    async fn set_item(&self, key: &str, _json: String) -> Result<(), SettingsError> {
        Err(refused(key))
    }

    async fn remove_item(&self, key: &str) -> Result<(), SettingsError> {
        Err(refused(key))
    }
}

// =============================================================================
// Loading and sorting
// =============================================================================

#[tokio::test]
async fn test_load_defaults_to_first_selected_column() {
    let h = harness(single());
    h.grid.load().await.unwrap();

    assert_eq!(h.grid.sort_state(), SortState::by("name", SortDirection::Ascending));
    assert_eq!(
        h.grid.take_events(),
        vec![
            GridEvent::SortColumnChanged(Some("name".to_string())),
            GridEvent::SortDirectionChanged(SortDirection::Ascending),
        ]
    );
    let stored: Option<SortState> = SettingsProvider::from_shared(h.backend.clone())
        .get(&h.grid.persistence().sort_key())
        .await
        .unwrap();
    assert_eq!(stored, Some(SortState::by("name", SortDirection::Ascending)));
}

#[tokio::test]
async fn test_load_restores_stored_configuration() {
    let h = harness(single());
    let persistence = h.grid.persistence();
    persistence
        .save_sort(None, &SortState::by("size", SortDirection::Ascending))
        .await
        .unwrap();
    persistence
        .save_selected_columns(None, &["size".to_string(), "ratio".to_string()].into())
        .await
        .unwrap();
    persistence
        .save_order(None, &ColumnOrder::from([("ratio".to_string(), 0)]))
        .await
        .unwrap();

    h.grid.load().await.unwrap();

    assert_eq!(ids(&h.grid.visible_columns()), vec!["ratio", "size"]);
    assert_eq!(h.grid.sort_state(), SortState::by("size", SortDirection::Ascending));
    let sizes: Vec<i64> = h.grid.displayed_rows().iter().map(|r| r.size).collect();
    assert_eq!(sizes, vec![10, 20, 30, 40, 50]);
}

#[tokio::test]
async fn test_zero_visible_columns_unsorts_and_removes_stored_sort() {
    let h = harness(single());
    let persistence = h.grid.persistence();
    persistence
        .save_sort(None, &SortState::by("size", SortDirection::Descending))
        .await
        .unwrap();
    persistence
        .save_selected_columns(None, &HashSet::new())
        .await
        .unwrap();

    h.grid.load().await.unwrap();

    assert_eq!(h.grid.sort_state(), SortState::unsorted());
    assert!(h.grid.visible_columns().is_empty());
    assert_eq!(
        h.backend.get_item(&persistence.sort_key()).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_load_with_no_visible_columns_stays_silent() {
    let h = harness(single());
    h.grid
        .persistence()
        .save_selected_columns(None, &HashSet::new())
        .await
        .unwrap();

    h.grid.load().await.unwrap();

    assert_eq!(h.grid.sort_state(), SortState::unsorted());
    assert!(h.grid.take_events().is_empty());
}

#[tokio::test]
async fn test_load_with_hidden_stored_sort_reports_settled_sort_only() {
    let h = harness(single());
    let persistence = h.grid.persistence();
    persistence
        .save_sort(None, &SortState::by("added", SortDirection::Descending))
        .await
        .unwrap();

    h.grid.load().await.unwrap();

    assert_eq!(h.grid.sort_state(), SortState::by("name", SortDirection::Ascending));
    assert_eq!(
        h.grid.take_events(),
        vec![
            GridEvent::SortColumnChanged(Some("name".to_string())),
            GridEvent::SortDirectionChanged(SortDirection::Ascending),
        ]
    );
    assert_eq!(
        persistence.load_sort().await,
        Some(SortState::by("name", SortDirection::Ascending))
    );
}

#[tokio::test]
async fn test_validate_sort_twice_changes_nothing() {
    let h = loaded(single()).await;
    h.grid.validate_sort().await.unwrap();
    h.grid.validate_sort().await.unwrap();
    assert!(h.grid.take_events().is_empty());
}

#[tokio::test]
async fn test_sort_by_notifies_and_persists() {
    let h = loaded(single()).await;
    h.grid.sort_by("size", SortDirection::Descending).await.unwrap();

    assert_eq!(
        h.grid.take_events(),
        vec![
            GridEvent::SortColumnChanged(Some("size".to_string())),
            GridEvent::SortDirectionChanged(SortDirection::Descending),
        ]
    );
    assert_eq!(
        h.grid.persistence().load_sort().await,
        Some(SortState::by("size", SortDirection::Descending))
    );

    // Same state again is a no-op.
    h.grid.sort_by("size", SortDirection::Descending).await.unwrap();
    assert!(h.grid.take_events().is_empty());
}

#[tokio::test]
async fn test_sort_by_hidden_column_is_ignored() {
    let h = loaded(single()).await;
    h.grid.sort_by("added", SortDirection::Ascending).await.unwrap();
    h.grid.toggle_sort("added").await.unwrap();
    assert_eq!(h.grid.sort_state(), SortState::by("name", SortDirection::Ascending));
    assert!(h.grid.take_events().is_empty());
}

#[tokio::test]
async fn test_toggle_sort() {
    let h = loaded(single()).await;
    h.grid.toggle_sort("name").await.unwrap();
    assert_eq!(h.grid.sort_state(), SortState::by("name", SortDirection::Descending));
    h.grid.toggle_sort("size").await.unwrap();
    assert_eq!(h.grid.sort_state(), SortState::by("size", SortDirection::Descending));
    h.grid.toggle_sort("size").await.unwrap();
    assert_eq!(h.grid.sort_state(), SortState::by("size", SortDirection::Ascending));
}

#[tokio::test]
async fn test_host_default_sort_is_used() {
    let h = loaded(single().default_sort("ratio", SortDirection::Descending)).await;
    assert_eq!(h.grid.sort_state(), SortState::by("ratio", SortDirection::Descending));
}

#[tokio::test]
async fn test_pre_sorted_rows_are_not_reordered() {
    let h = loaded(single().pre_sorted()).await;
    h.grid.sort_by("size", SortDirection::Ascending).await.unwrap();
    let displayed: Vec<String> = h.grid.displayed_rows().iter().map(|r| r.key.clone()).collect();
    assert_eq!(displayed, keys(&["A", "B", "C", "D", "E"]));
}

#[tokio::test]
async fn test_write_failures_surface() {
    let grid = DataGrid::new(
        single(),
        SettingsProvider::new(ReadOnlyBackend),
        Arc::new(KeyboardRegistry::new()),
    );
    let result = grid.load().await;
    assert!(matches!(result, Err(GridError::Settings(_))));
    assert_eq!(grid.sort_state(), SortState::by("name", SortDirection::Ascending));
}

// =============================================================================
// Row clicks
// =============================================================================

#[tokio::test]
async fn test_single_mode_click_notifies() {
    let h = loaded(single()).await;
    assert_eq!(click(&h.grid, "C", Modifiers::NONE), EventResult::Consumed);

    assert_eq!(
        h.grid.take_events(),
        vec![
            GridEvent::SelectedItemChanged(Some(row("C"))),
            GridEvent::SelectedItemsChanged(vec![row("C")]),
            GridEvent::RowClick {
                row: row("C"),
                modifiers: Modifiers::NONE,
            },
        ]
    );

    // Clicking the selected row again only forwards the click.
    click(&h.grid, "C", Modifiers::NONE);
    assert_eq!(h.grid.take_events().len(), 1);
}

#[tokio::test]
async fn test_no_selection_mode_still_forwards_clicks() {
    let h = loaded(GridParams::new("main", columns()).rows(items())).await;
    click(&h.grid, "A", Modifiers::NONE);
    assert!(h.grid.selected_items().is_empty());
    assert!(matches!(
        h.grid.take_events().as_slice(),
        [GridEvent::RowClick { .. }]
    ));
}

#[tokio::test]
async fn test_multi_mode_shift_click_range() {
    let h = loaded(multi()).await;
    click(&h.grid, "B", Modifiers::NONE);
    click(&h.grid, "D", Modifiers::shift());
    assert_eq!(h.grid.selected_keys(), keys(&["B", "C", "D"]));

    h.grid.take_events();
    click(&h.grid, "A", Modifiers::ctrl());
    let events = h.grid.take_events();
    assert_eq!(
        events[0],
        GridEvent::SelectedItemsChanged(vec![row("A"), row("B"), row("C"), row("D")])
    );
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, GridEvent::SelectedItemChanged(_)))
    );
}

#[tokio::test]
async fn test_selected_items_follow_display_order() {
    let h = loaded(multi()).await;
    click(&h.grid, "A", Modifiers::NONE);
    click(&h.grid, "E", Modifiers::ctrl());
    h.grid.sort_by("size", SortDirection::Ascending).await.unwrap();
    assert_eq!(h.grid.selected_items(), vec![row("E"), row("A")]);
}

#[tokio::test]
async fn test_long_press_swallows_next_click() {
    let h = loaded(single()).await;
    let t = Instant::now();
    h.grid.on_cell_long_press(row("B"), "name", t);
    assert_eq!(
        h.grid.take_events(),
        vec![GridEvent::CellLongPress {
            row: row("B"),
            column_id: "name".to_string(),
        }]
    );

    let early = RowClick::at(row("B"), Modifiers::NONE, t + Duration::from_millis(100));
    assert_eq!(h.grid.on_row_click(early), EventResult::Ignored);
    assert!(h.grid.selected_items().is_empty());
    assert!(h.grid.take_events().is_empty());

    h.grid.on_cell_long_press(row("B"), "name", t);
    let late = RowClick::at(row("B"), Modifiers::NONE, t + Duration::from_millis(600));
    assert_eq!(h.grid.on_row_click(late), EventResult::Consumed);
    assert_eq!(h.grid.selected_items(), vec![row("B")]);
}

#[tokio::test]
async fn test_context_menu_is_forwarded() {
    let h = loaded(single()).await;
    h.grid.on_cell_context_menu(row("D"), "size");
    assert_eq!(
        h.grid.take_events(),
        vec![GridEvent::CellContextMenu {
            row: row("D"),
            column_id: "size".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_select_all_and_clear() {
    let h = loaded(multi()).await;
    assert!(h.grid.select_all());
    assert_eq!(h.grid.selected_items().len(), 5);
    assert!(h.grid.clear_selection());
    assert!(h.grid.selected_items().is_empty());

    let h = loaded(single()).await;
    assert!(!h.grid.select_all());
}

// =============================================================================
// Keyboard
// =============================================================================

#[tokio::test]
async fn test_keyboard_navigation_through_registry() {
    let h = loaded(multi()).await;
    h.grid.after_render().await.unwrap();
    assert!(h.grid.has_key_subscription());

    let down = KeyCombo::key(Key::Down);
    assert_eq!(h.keyboard.dispatch(&down), 1);
    assert_eq!(h.grid.selected_keys(), keys(&["A"]));

    h.keyboard.dispatch(&KeyCombo::key(Key::Down).shift());
    assert_eq!(h.grid.selected_keys(), keys(&["A", "B"]));

    h.keyboard.dispatch(&down);
    assert_eq!(h.grid.selected_keys(), keys(&["C"]));

    h.keyboard.dispatch(&KeyCombo::key(Key::Up));
    assert_eq!(h.grid.selected_keys(), keys(&["B"]));

    h.grid.take_events();
    h.keyboard.dispatch(&KeyCombo::key(Key::Enter));
    assert_eq!(h.grid.take_events(), vec![GridEvent::ItemActivated(row("B"))]);
}

#[tokio::test]
async fn test_shift_arrow_in_single_mode_moves() {
    let h = loaded(single()).await;
    click(&h.grid, "B", Modifiers::NONE);
    h.grid.on_key(&KeyCombo::key(Key::Down).shift());
    assert_eq!(h.grid.selected_keys(), keys(&["C"]));
}

#[tokio::test]
async fn test_enter_needs_exactly_one_selected_row() {
    let h = loaded(multi()).await;
    h.grid.select_all();
    h.grid.take_events();
    assert_eq!(h.grid.on_key(&KeyCombo::key(Key::Enter)), EventResult::Ignored);
    assert!(h.grid.take_events().is_empty());
}

#[tokio::test]
async fn test_keys_register_once_and_release_once() {
    let h = loaded(single()).await;
    h.grid.after_render().await.unwrap();
    h.grid.after_render().await.unwrap();
    assert_eq!(h.keyboard.subscriber_count(&KeyCombo::key(Key::Up)), 1);

    h.grid.dispose().await.unwrap();
    assert!(h.keyboard.is_empty());
    assert!(h.grid.is_disposed());

    h.grid.dispose().await.unwrap();
    h.grid.after_render().await.unwrap();
    assert!(h.keyboard.is_empty());
}

#[tokio::test]
async fn test_two_grids_share_the_keyboard() {
    let keyboard = Arc::new(KeyboardRegistry::new());
    let settings = SettingsProvider::new(MemoryBackend::new());
    let first = DataGrid::new(single(), settings.clone(), keyboard.clone());
    let second = DataGrid::new(
        GridParams::new("details", columns())
            .rows(items())
            .select_on_row_click(),
        settings,
        keyboard.clone(),
    );
    first.after_render().await.unwrap();
    second.after_render().await.unwrap();

    assert_eq!(keyboard.dispatch(&KeyCombo::key(Key::Down)), 2);
    first.dispose().await.unwrap();
    assert_eq!(keyboard.dispatch(&KeyCombo::key(Key::Down)), 1);
}

// =============================================================================
// Column options
// =============================================================================

#[tokio::test]
async fn test_apply_dialog_result() {
    let h = loaded(single()).await;
    let options = ColumnOptions {
        selected_columns: ["size".to_string(), "ratio".to_string()].into(),
        widths: ColumnWidths::from([("size".to_string(), Some(120))]),
        order: ColumnOrder::from([("ratio".to_string(), 0)]),
    };

    let changed = h
        .grid
        .show_column_options(&FixedDialog(Some(options.clone())))
        .await
        .unwrap();
    assert!(changed);

    let visible = h.grid.visible_columns();
    assert_eq!(ids(&visible), vec!["ratio", "size"]);
    assert_eq!(visible[0].width, Some(60));
    assert_eq!(visible[1].width, Some(120));
    assert_eq!(h.grid.sort_state(), SortState::by("ratio", SortDirection::Ascending));

    assert_eq!(
        h.grid.take_events(),
        vec![
            GridEvent::SelectedColumnsChanged(options.selected_columns.clone()),
            GridEvent::SortColumnChanged(Some("ratio".to_string())),
            GridEvent::SortDirectionChanged(SortDirection::Ascending),
        ]
    );

    assert_eq!(h.grid.selected_columns(), options.selected_columns);
    assert_eq!(h.grid.column_order(), options.order);

    let config = h.grid.persistence().load().await;
    assert_eq!(config.selected_columns, Some(options.selected_columns));
    assert_eq!(config.widths, Some(options.widths));
    assert_eq!(config.order, Some(options.order));
    assert_eq!(
        config.sort,
        Some(SortState::by("ratio", SortDirection::Ascending))
    );
}

#[tokio::test]
async fn test_cancelled_dialog_changes_nothing() {
    let h = loaded(single()).await;
    let stored = h.backend.len();
    assert!(!h.grid.show_column_options(&FixedDialog(None)).await.unwrap());

    let current = h.grid.column_options();
    assert!(!h.grid.apply_column_options(current).await.unwrap());
    assert_eq!(h.backend.len(), stored);
    assert!(h.grid.take_events().is_empty());
}

#[tokio::test]
async fn test_set_column_width() {
    let h = loaded(single()).await;
    assert!(h.grid.set_column_width("name", Some(300)).await.unwrap());
    assert!(!h.grid.set_column_width("name", Some(300)).await.unwrap());

    assert_eq!(h.grid.visible_columns()[0].width, Some(300));
    assert_eq!(
        h.grid.persistence().load_widths().await,
        Some(ColumnWidths::from([("name".to_string(), Some(300))]))
    );
    assert!(h.grid.take_events().is_empty());
}

#[tokio::test]
async fn test_reset_configuration() {
    let h = loaded(single()).await;
    h.grid.set_column_width("name", Some(300)).await.unwrap();
    h.grid.sort_by("size", SortDirection::Ascending).await.unwrap();

    h.grid.take_events();

    h.grid.reset_configuration().await.unwrap();

    assert!(h.grid.column_widths().is_empty());
    assert_eq!(h.grid.visible_columns()[0].width, None);
    assert_eq!(h.grid.sort_state(), SortState::by("name", SortDirection::Ascending));
    assert_eq!(
        h.grid.take_events(),
        vec![
            GridEvent::SortColumnChanged(Some("name".to_string())),
            GridEvent::SortDirectionChanged(SortDirection::Ascending),
        ]
    );

    let persistence = h.grid.persistence();
    assert_eq!(h.backend.len(), 1);
    assert_eq!(
        persistence.load_sort().await,
        Some(SortState::by("name", SortDirection::Ascending))
    );
    assert_eq!(persistence.load_widths().await, None);
}

#[tokio::test]
async fn test_reset_before_load_settles_once() {
    let h = harness(single());
    h.grid
        .persistence()
        .save_sort(None, &SortState::by("size", SortDirection::Descending))
        .await
        .unwrap();

    h.grid.reset_configuration().await.unwrap();
    assert!(h.backend.is_empty());
    assert!(h.grid.take_events().is_empty());

    h.grid.load().await.unwrap();
    assert_eq!(h.grid.sort_state(), SortState::by("name", SortDirection::Ascending));
    assert_eq!(
        h.grid.take_events(),
        vec![
            GridEvent::SortColumnChanged(Some("name".to_string())),
            GridEvent::SortDirectionChanged(SortDirection::Ascending),
        ]
    );
}

// =============================================================================
// Parameter updates
// =============================================================================

#[tokio::test]
async fn test_set_parameters_prunes_missing_rows() {
    let h = loaded(multi()).await;
    h.grid.select_all();
    h.grid.take_events();

    let remaining = vec![item("A", "alpha", 50), item("B", "bravo", 40)];
    h.grid
        .set_parameters(multi().rows(remaining.clone()))
        .await
        .unwrap();

    assert_eq!(h.grid.selected_keys(), keys(&["A", "B"]));
    assert_eq!(
        h.grid.take_events(),
        vec![GridEvent::SelectedItemsChanged(remaining)]
    );
}

#[tokio::test]
async fn test_new_definitions_replace_visible_columns() {
    let definitions: Arc<[ColumnDefinition<Item>]> = columns().into();
    let params = GridParams::new("main", Arc::clone(&definitions))
        .rows(items())
        .select_on_row_click();
    let h = loaded(params.clone()).await;
    h.grid.visible_columns();
    assert!(h.grid.has_cached_columns());

    h.grid.set_parameters(params.clone().rows(Vec::new())).await.unwrap();
    assert!(h.grid.has_cached_columns());

    let only_name: Vec<_> = columns().into_iter().take(1).collect();
    h.grid
        .set_parameters(GridParams::new("main", only_name).select_on_row_click())
        .await
        .unwrap();
    assert_eq!(ids(&h.grid.visible_columns()), vec!["name"]);
}

#[tokio::test]
async fn test_filter_token_change_revalidates_sort() {
    let h = loaded(single().column_filter(|_| true, "all")).await;
    h.grid.set_parameters(
        GridParams::new("main", columns())
            .rows(items())
            .select_on_row_click()
            .column_filter(|c: &ColumnDefinition<Item>| c.id != "name", "no-name"),
    )
    .await
    .unwrap();

    assert_eq!(ids(&h.grid.visible_columns()), vec!["size", "ratio"]);
    assert_eq!(h.grid.sort_state(), SortState::by("size", SortDirection::Descending));
}

#[tokio::test]
async fn test_table_id_cannot_change() {
    let h = loaded(single()).await;
    h.grid
        .set_parameters(GridParams::new("other", columns()))
        .await
        .unwrap();
    assert_eq!(h.grid.table_id(), "main");
    assert_eq!(h.grid.persistence().sort_key(), "Item.ColumnSort.main");
}
