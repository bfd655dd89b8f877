//! The data-grid controller.
//!
//! [`DataGrid<T>`] ties the column resolver, sort controller, selection and
//! persistence gateway together behind one shared state object. It is a
//! cheap `Clone` handle; every clone drives the same grid.
//!
//! Lifecycle:
//!
//! 1. [`DataGrid::new`] with the host's [`GridParams`].
//! 2. [`DataGrid::load`] reads stored configuration and settles the sort.
//! 3. [`DataGrid::set_parameters`] on every host update.
//! 4. [`DataGrid::after_render`] after the first render registers keys.
//! 5. [`DataGrid::dispose`] releases the keys.
//!
//! No lock is held across an `.await`: state changes are computed under the
//! lock, then written to storage afterwards.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::column::ColumnDefinition;
use crate::dialog::{ColumnOptions, ColumnOptionsDialog};
use crate::error::GridError;
use crate::events::{EventResult, GridEvent, RowClick};
use crate::keybinds::{Key, KeyCombo, KeyHandler, KeySubscription, KeyboardService};
use crate::persistence::{ColumnOrder, ColumnWidths, GridConfig, GridPersistence};
use crate::resolver::{ColumnFilter, ColumnResolver, ColumnSource};
use crate::row::GridRow;
use crate::selection::{ClickSuppression, Navigation, Selection, SelectionMode};
use crate::settings::SettingsProvider;
use crate::sort::{SortChange, SortController, SortDirection, SortState, sort_rows};

/// Keys the grid subscribes to after its first render.
pub const NAVIGATION_KEYS: [KeyCombo; 5] = [
    KeyCombo::key(Key::Up),
    KeyCombo::key(Key::Down),
    KeyCombo::key(Key::Up).shift(),
    KeyCombo::key(Key::Down).shift(),
    KeyCombo::key(Key::Enter),
];

/// Parameters supplied by the host on every update.
#[derive(Clone)]
pub struct GridParams<T> {
    /// Rows in host order.
    pub rows: Vec<T>,
    /// All column definitions. A new `Arc` signals changed definitions.
    pub columns: Arc<[ColumnDefinition<T>]>,
    /// Scopes persisted configuration. Fixed for the lifetime of a grid.
    pub table_id: String,
    /// Host predicate limiting which columns may be shown.
    pub column_filter: Option<ColumnFilter<T>>,
    /// Opaque token; a different value re-runs the column filter.
    pub filter_state: Option<String>,
    pub multi_selection: bool,
    pub select_on_row_click: bool,
    /// The host already ordered the rows; the grid must not reorder them.
    pub pre_sorted: bool,
    /// Sort column used when nothing is stored.
    pub sort_column: Option<String>,
    /// Direction for `sort_column`; defaults to the column's initial direction.
    pub sort_direction: Option<SortDirection>,
}

impl<T> GridParams<T> {
    /// Parameters with no rows and no selection.
    pub fn new(table_id: impl Into<String>, columns: impl Into<Arc<[ColumnDefinition<T>]>>) -> Self {
        Self {
            rows: Vec::new(),
            columns: columns.into(),
            table_id: table_id.into(),
            column_filter: None,
            filter_state: None,
            multi_selection: false,
            select_on_row_click: false,
            pre_sorted: false,
            sort_column: None,
            sort_direction: None,
        }
    }

    pub fn rows(mut self, rows: Vec<T>) -> Self {
        self.rows = rows;
        self
    }

    /// Select a row when it is clicked.
    pub fn select_on_row_click(mut self) -> Self {
        self.select_on_row_click = true;
        self
    }

    /// Enable Ctrl/Shift/Alt-click and Shift+arrow multi-selection.
    pub fn multi_selection(mut self) -> Self {
        self.multi_selection = true;
        self
    }

    pub fn pre_sorted(mut self) -> Self {
        self.pre_sorted = true;
        self
    }

    /// Limit visible columns with a predicate, keyed by a filter-state token.
    pub fn column_filter(
        mut self,
        filter: impl Fn(&ColumnDefinition<T>) -> bool + Send + Sync + 'static,
        state: impl Into<String>,
    ) -> Self {
        self.column_filter = Some(Arc::new(filter));
        self.filter_state = Some(state.into());
        self
    }

    pub fn default_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_column = Some(column.into());
        self.sort_direction = Some(direction);
        self
    }

    pub fn selection_mode(&self) -> SelectionMode {
        if self.multi_selection {
            SelectionMode::Multiple
        } else if self.select_on_row_click {
            SelectionMode::Single
        } else {
            SelectionMode::None
        }
    }
}

#[derive(Debug)]
enum KeyState {
    Idle,
    Registering,
    Active(KeySubscription),
    Released,
}

struct GridInner<T> {
    params: GridParams<T>,
    selected_columns: HashSet<String>,
    widths: ColumnWidths,
    order: ColumnOrder,
    resolver: ColumnResolver<T>,
    sort: SortController,
    selection: Selection,
    suppression: ClickSuppression,
    events: Vec<GridEvent<T>>,
    keys: KeyState,
    loaded: bool,
}

fn default_selection<T>(columns: &[ColumnDefinition<T>]) -> HashSet<String> {
    columns
        .iter()
        .filter(|c| c.enabled)
        .map(|c| c.id.clone())
        .collect()
}

impl<T: GridRow> GridInner<T> {
    fn new(params: GridParams<T>) -> Self {
        Self {
            selected_columns: default_selection(&params.columns),
            params,
            widths: ColumnWidths::new(),
            order: ColumnOrder::new(),
            resolver: ColumnResolver::new(),
            sort: SortController::default(),
            selection: Selection::new(),
            suppression: ClickSuppression::default(),
            events: Vec::new(),
            keys: KeyState::Idle,
            loaded: false,
        }
    }

    fn visible_columns(&mut self) -> &[ColumnDefinition<T>] {
        self.resolver.resolve(ColumnSource {
            definitions: &self.params.columns,
            selected: &self.selected_columns,
            filter: self.params.column_filter.as_ref(),
            order: &self.order,
            widths: &self.widths,
        })
    }

    fn column_options(&self) -> ColumnOptions {
        ColumnOptions {
            selected_columns: self.selected_columns.clone(),
            widths: self.widths.clone(),
            order: self.order.clone(),
        }
    }

    fn displayed_rows(&self) -> Vec<T> {
        sort_rows(
            &self.params.rows,
            self.sort.state(),
            &self.params.columns,
            self.params.pre_sorted,
        )
    }

    fn displayed_keys(&self) -> Vec<String> {
        self.displayed_rows().iter().map(GridRow::key).collect()
    }

    fn selected_items(&self) -> Vec<T> {
        self.displayed_rows()
            .into_iter()
            .filter(|row| self.selection.is_selected(&row.key()))
            .collect()
    }

    fn emit_sort_change(&mut self, change: &SortChange) {
        self.events
            .push(GridEvent::SortColumnChanged(change.current.column.clone()));
        self.events
            .push(GridEvent::SortDirectionChanged(change.current.direction));
    }

    fn emit_selection_change(&mut self) {
        let items = self.selected_items();
        if self.params.selection_mode() == SelectionMode::Single {
            self.events
                .push(GridEvent::SelectedItemChanged(items.first().cloned()));
        }
        self.events.push(GridEvent::SelectedItemsChanged(items));
    }

    fn set_sort(&mut self, next: SortState) -> Option<SortChange> {
        let change = self.sort.set(next)?;
        self.emit_sort_change(&change);
        Some(change)
    }

    fn validate_sort(&mut self) -> Option<SortChange> {
        let visible = self.visible_columns().to_vec();
        let change = self.sort.validate(&visible)?;
        self.emit_sort_change(&change);
        Some(change)
    }

    /// Pick the starting sort and reconcile it with the visible columns.
    ///
    /// The candidate is validated on its own controller so only the settled
    /// state reaches the host.
    fn settle_initial_sort(&mut self, persisted: Option<SortState>) -> Option<SortChange> {
        let initial = SortController::initial(
            persisted,
            self.params.sort_column.as_deref(),
            self.params.sort_direction,
            &self.params.columns,
            &self.selected_columns,
        );
        let visible = self.visible_columns().to_vec();
        let mut candidate = SortController::new(initial);
        candidate.validate(&visible);
        self.set_sort(candidate.state().clone())
    }

    fn handle_click(&mut self, click: RowClick<T>) -> EventResult {
        if self.suppression.should_swallow(click.at) {
            log::debug!("[grid] swallowed click after long press");
            return EventResult::Ignored;
        }

        let key = click.row.key();
        let displayed = self.displayed_keys();
        let mode = self.params.selection_mode();
        if self.selection.click(&displayed, &key, click.modifiers, mode) {
            self.emit_selection_change();
        }

        self.events.push(GridEvent::RowClick {
            row: click.row,
            modifiers: click.modifiers,
        });
        EventResult::Consumed
    }

    fn handle_key(&mut self, combo: &KeyCombo) -> EventResult {
        let mode = self.params.selection_mode();
        let modifiers = combo.modifiers;
        if mode == SelectionMode::None || modifiers.ctrl || modifiers.alt || modifiers.meta {
            return EventResult::Ignored;
        }

        let direction = match combo.key {
            Key::Up => Navigation::Up,
            Key::Down => Navigation::Down,
            Key::Enter => return self.activate(),
            _ => return EventResult::Ignored,
        };

        let extend = modifiers.shift && mode == SelectionMode::Multiple;
        let displayed = self.displayed_keys();
        if self.selection.navigate(&displayed, direction, extend) {
            self.emit_selection_change();
        }
        EventResult::Consumed
    }

    fn activate(&mut self) -> EventResult {
        let Some(key) = self.selection.single() else {
            return EventResult::Ignored;
        };
        let Some(row) = self.params.rows.iter().find(|r| r.key() == key).cloned() else {
            return EventResult::Ignored;
        };
        self.events.push(GridEvent::ItemActivated(row));
        EventResult::Consumed
    }
}

/// Interactive data-grid controller over rows of type `T`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use datagrid::prelude::*;
///
/// #[derive(Debug, Clone)]
/// struct Torrent {
///     hash: String,
///     size: i64,
/// }
///
/// impl GridRow for Torrent {
///     fn key(&self) -> String {
///         self.hash.clone()
///     }
/// }
///
/// # tokio_test_block(async {
/// let columns = vec![ColumnDefinition::new("Size", |t: &Torrent| CellValue::from(t.size))];
/// let params = GridParams::new("main", columns).select_on_row_click();
/// let settings = SettingsProvider::new(MemoryBackend::new());
/// let grid = DataGrid::new(params, settings, Arc::new(KeyboardRegistry::new()));
/// grid.load().await.unwrap();
/// assert_eq!(grid.sort_state(), SortState::by("size", SortDirection::Ascending));
/// # });
/// # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct DataGrid<T> {
    inner: Arc<RwLock<GridInner<T>>>,
    persistence: GridPersistence,
    keyboard: Arc<dyn KeyboardService>,
}

impl<T> Clone for DataGrid<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            persistence: self.persistence.clone(),
            keyboard: Arc::clone(&self.keyboard),
        }
    }
}

impl<T: GridRow> DataGrid<T> {
    /// Create a grid. Nothing is read from storage until [`load`](Self::load).
    pub fn new(
        params: GridParams<T>,
        settings: SettingsProvider,
        keyboard: Arc<dyn KeyboardService>,
    ) -> Self {
        let persistence = GridPersistence::new(settings, T::type_name(), params.table_id.clone());
        Self {
            inner: Arc::new(RwLock::new(GridInner::new(params))),
            persistence,
            keyboard,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, GridInner<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GridInner<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn table_id(&self) -> &str {
        self.persistence.table_id()
    }

    /// The gateway storing this grid's configuration.
    pub fn persistence(&self) -> &GridPersistence {
        &self.persistence
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Read stored configuration and settle the initial sort.
    pub async fn load(&self) -> Result<(), GridError> {
        let GridConfig {
            selected_columns,
            widths,
            order,
            sort,
        } = self.persistence.load().await;
        let stored_sort = sort.clone();

        let settled = {
            let mut guard = self.write();
            let g = &mut *guard;
            if let Some(selected) = selected_columns {
                g.selected_columns = selected;
            }
            g.widths = widths.unwrap_or_default();
            g.order = order.unwrap_or_default();
            g.resolver.invalidate();
            g.settle_initial_sort(sort);
            g.loaded = true;
            g.sort.state().clone()
        };

        log::debug!(
            "[grid] loaded {} sorted by {:?}",
            self.persistence.scope(),
            settled.column
        );

        if settled.is_unsorted() {
            if stored_sort.is_some() {
                self.persistence.remove_sort().await?;
            }
        } else {
            self.persistence
                .save_sort(stored_sort.as_ref(), &settled)
                .await?;
        }
        Ok(())
    }

    /// Apply a host update.
    ///
    /// New definitions (a different `Arc`) or a new filter-state token clear
    /// the column cache and re-check the sort. Selected rows that are no
    /// longer present are dropped from the selection.
    pub async fn set_parameters(&self, params: GridParams<T>) -> Result<(), GridError> {
        let change = {
            let mut guard = self.write();
            let g = &mut *guard;

            if params.table_id != g.params.table_id {
                log::warn!(
                    "[grid] table id is fixed at {}; ignoring {}",
                    g.params.table_id,
                    params.table_id
                );
            }
            let columns_changed = !Arc::ptr_eq(&g.params.columns, &params.columns);
            let filter_changed = g.params.filter_state != params.filter_state;

            let table_id = std::mem::take(&mut g.params.table_id);
            g.params = params;
            g.params.table_id = table_id;

            let keys: HashSet<String> = g.params.rows.iter().map(GridRow::key).collect();
            if g.selection.retain(|key| keys.contains(key)) {
                g.emit_selection_change();
            }

            if columns_changed || filter_changed {
                g.resolver.invalidate();
                if g.loaded { g.validate_sort() } else { None }
            } else {
                None
            }
        };
        self.persist_sort(change).await
    }

    /// Register keyboard navigation. Only the first call after a successful
    /// render registers; later calls do nothing.
    pub async fn after_render(&self) -> Result<(), GridError> {
        {
            let mut g = self.write();
            if !matches!(g.keys, KeyState::Idle) {
                return Ok(());
            }
            g.keys = KeyState::Registering;
        }

        let weak = Arc::downgrade(&self.inner);
        let handler: KeyHandler = Arc::new(move |combo: &KeyCombo| {
            if let Some(inner) = weak.upgrade() {
                inner
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .handle_key(combo);
            }
        });

        let acquired = KeySubscription::acquire(
            self.keyboard.as_ref(),
            self.persistence.scope(),
            NAVIGATION_KEYS.to_vec(),
            handler,
        )
        .await;

        let subscription = match acquired {
            Ok(subscription) => subscription,
            Err(e) => {
                let mut g = self.write();
                if matches!(g.keys, KeyState::Registering) {
                    g.keys = KeyState::Idle;
                }
                return Err(e.into());
            }
        };

        // Disposed while registering: give the keys straight back.
        let orphaned = {
            let mut g = self.write();
            if matches!(g.keys, KeyState::Released) {
                Some(subscription)
            } else {
                g.keys = KeyState::Active(subscription);
                None
            }
        };
        if let Some(mut subscription) = orphaned {
            subscription.release(self.keyboard.as_ref()).await?;
        }
        Ok(())
    }

    /// Release keyboard registrations. Safe to call more than once.
    pub async fn dispose(&self) -> Result<(), GridError> {
        let previous = std::mem::replace(&mut self.write().keys, KeyState::Released);
        if let KeyState::Active(mut subscription) = previous {
            subscription.release(self.keyboard.as_ref()).await?;
        }
        Ok(())
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.read().keys, KeyState::Released)
    }

    /// Returns `true` while keyboard navigation is registered.
    pub fn has_key_subscription(&self) -> bool {
        matches!(self.read().keys, KeyState::Active(_))
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// Visible columns in display order, with stored widths applied.
    pub fn visible_columns(&self) -> Vec<ColumnDefinition<T>> {
        self.write().visible_columns().to_vec()
    }

    /// Returns `true` if the visible columns are cached.
    pub fn has_cached_columns(&self) -> bool {
        self.read().resolver.is_cached()
    }

    pub fn selected_columns(&self) -> HashSet<String> {
        self.read().selected_columns.clone()
    }

    pub fn column_widths(&self) -> ColumnWidths {
        self.read().widths.clone()
    }

    pub fn column_order(&self) -> ColumnOrder {
        self.read().order.clone()
    }

    pub fn column_options(&self) -> ColumnOptions {
        self.read().column_options()
    }

    /// Open the column options dialog and apply its result.
    ///
    /// Returns `false` when the dialog was cancelled or nothing changed.
    pub async fn show_column_options(
        &self,
        dialog: &dyn ColumnOptionsDialog<T>,
    ) -> Result<bool, GridError> {
        let (columns, current) = {
            let g = self.read();
            (g.params.columns.to_vec(), g.column_options())
        };
        let Some(options) = dialog.show(&columns, &current).await else {
            log::debug!("[grid] column options cancelled");
            return Ok(false);
        };
        self.apply_column_options(options).await
    }

    /// Apply selected columns, widths and order in one step.
    ///
    /// Each value is stored only if it changed. Returns `true` if anything
    /// changed.
    pub async fn apply_column_options(&self, options: ColumnOptions) -> Result<bool, GridError> {
        let (previous, change) = {
            let mut guard = self.write();
            let g = &mut *guard;
            let previous = g.column_options();
            if previous == options {
                return Ok(false);
            }

            g.selected_columns = options.selected_columns.clone();
            g.widths = options.widths.clone();
            g.order = options.order.clone();
            g.resolver.invalidate();

            if previous.selected_columns != options.selected_columns {
                g.events
                    .push(GridEvent::SelectedColumnsChanged(g.selected_columns.clone()));
            }
            let change = if g.loaded { g.validate_sort() } else { None };
            (previous, change)
        };

        self.persistence
            .save_selected_columns(Some(&previous.selected_columns), &options.selected_columns)
            .await?;
        self.persistence
            .save_widths(Some(&previous.widths), &options.widths)
            .await?;
        self.persistence
            .save_order(Some(&previous.order), &options.order)
            .await?;
        self.persist_sort(change).await?;
        Ok(true)
    }

    /// Resize one column. `None` returns it to auto width.
    pub async fn set_column_width(
        &self,
        column_id: &str,
        width: Option<u32>,
    ) -> Result<bool, GridError> {
        let mut options = self.column_options();
        options.widths.insert(column_id.to_string(), width);
        self.apply_column_options(options).await
    }

    /// Forget stored configuration and return to the host defaults.
    ///
    /// On a loaded grid the sort is settled again and stored. Before
    /// [`load`](Self::load) only storage and column state are cleared.
    pub async fn reset_configuration(&self) -> Result<(), GridError> {
        self.persistence.reset().await?;

        let settled = {
            let mut guard = self.write();
            let g = &mut *guard;
            let defaults = default_selection(&g.params.columns);
            if g.selected_columns != defaults {
                g.selected_columns = defaults;
                g.events
                    .push(GridEvent::SelectedColumnsChanged(g.selected_columns.clone()));
            }
            g.widths.clear();
            g.order.clear();
            g.resolver.invalidate();
            if !g.loaded {
                return Ok(());
            }
            g.settle_initial_sort(None);
            g.sort.state().clone()
        };

        if !settled.is_unsorted() {
            self.persistence.save_sort(None, &settled).await?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    pub fn sort_state(&self) -> SortState {
        self.read().sort.state().clone()
    }

    /// Sort by a visible column. `SortDirection::None` and hidden columns are ignored.
    pub async fn sort_by(&self, column_id: &str, direction: SortDirection) -> Result<(), GridError> {
        let change = {
            let mut g = self.write();
            if !g.visible_columns().iter().any(|c| c.id == column_id) {
                log::debug!("[grid] sort on hidden column {} ignored", column_id);
                return Ok(());
            }
            match g.sort.request(column_id, direction) {
                Some(change) => {
                    g.emit_sort_change(&change);
                    Some(change)
                }
                None => None,
            }
        };
        self.persist_sort(change).await
    }

    /// Header click: flip the direction of the active column, or start
    /// sorting a new column in its initial direction.
    pub async fn toggle_sort(&self, column_id: &str) -> Result<(), GridError> {
        let direction = {
            let g = self.read();
            let state = g.sort.state();
            if state.column.as_deref() == Some(column_id) {
                state.direction.toggled()
            } else {
                match g.params.columns.iter().find(|c| c.id == column_id) {
                    Some(column) => column.initial_direction.or_ascending(),
                    None => return Ok(()),
                }
            }
        };
        self.sort_by(column_id, direction).await
    }

    /// Re-check the sort against the visible columns.
    pub async fn validate_sort(&self) -> Result<(), GridError> {
        let change = self.write().validate_sort();
        self.persist_sort(change).await
    }

    async fn persist_sort(&self, change: Option<SortChange>) -> Result<(), GridError> {
        let Some(change) = change else {
            return Ok(());
        };
        if change.current.is_unsorted() {
            self.persistence.remove_sort().await?;
        } else {
            self.persistence
                .save_sort(Some(&change.previous), &change.current)
                .await?;
        }
        Ok(())
    }

    /// Rows in display order.
    pub fn displayed_rows(&self) -> Vec<T> {
        self.read().displayed_rows()
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn selection_mode(&self) -> SelectionMode {
        self.read().params.selection_mode()
    }

    /// Selected rows in display order.
    pub fn selected_items(&self) -> Vec<T> {
        self.read().selected_items()
    }

    pub fn selected_keys(&self) -> Vec<String> {
        self.read().selection.keys()
    }

    pub fn is_selected(&self, row: &T) -> bool {
        self.read().selection.is_selected(&row.key())
    }

    /// Select every displayed row (multi-selection only).
    pub fn select_all(&self) -> bool {
        let mut g = self.write();
        if g.params.selection_mode() != SelectionMode::Multiple {
            return false;
        }
        let displayed = g.displayed_keys();
        let changed = g.selection.select_all(&displayed);
        if changed {
            g.emit_selection_change();
        }
        changed
    }

    pub fn clear_selection(&self) -> bool {
        let mut g = self.write();
        let changed = g.selection.clear();
        if changed {
            g.emit_selection_change();
        }
        changed
    }

    /// Handle a click on a data row.
    pub fn on_row_click(&self, click: RowClick<T>) -> EventResult {
        self.write().handle_click(click)
    }

    /// Handle a key press (normally delivered by the keyboard service).
    pub fn on_key(&self, key: &KeyCombo) -> EventResult {
        self.write().handle_key(key)
    }

    /// Context menu requested on a cell.
    pub fn on_cell_context_menu(&self, row: T, column_id: &str) {
        self.write().events.push(GridEvent::CellContextMenu {
            row,
            column_id: column_id.to_string(),
        });
    }

    /// Long press on a cell. The next row click within the suppression
    /// window is swallowed.
    pub fn on_cell_long_press(&self, row: T, column_id: &str, at: Instant) {
        let mut g = self.write();
        g.suppression.arm(at);
        g.events.push(GridEvent::CellLongPress {
            row,
            column_id: column_id.to_string(),
        });
    }

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    /// Drain queued notifications in the order they were raised.
    pub fn take_events(&self) -> Vec<GridEvent<T>> {
        std::mem::take(&mut self.write().events)
    }
}
