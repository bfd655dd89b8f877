//! Column definitions.

use std::fmt;
use std::sync::Arc;

use crate::sort::SortDirection;
use crate::value::CellValue;

/// Extracts the sortable value of a cell from a row.
pub type ValueSelector<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;

/// Renders the display text of a cell from a row.
pub type CellFormatter<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Column configuration.
///
/// Definitions are owned by the host and handed to the grid on every
/// parameter update. The grid never mutates them: persisted widths are
/// applied to the copies it returns from
/// [`visible_columns`](crate::DataGrid::visible_columns).
///
/// # Examples
///
/// ```
/// use datagrid::{Alignment, CellValue, ColumnDefinition};
///
/// #[derive(Debug, Clone)]
/// struct Peer {
///     address: String,
///     progress: f64,
/// }
///
/// let columns: Vec<ColumnDefinition<Peer>> = vec![
///     ColumnDefinition::new("IP Address", |p: &Peer| CellValue::from(&p.address)),
///     ColumnDefinition::new("Progress", |p: &Peer| CellValue::from(p.progress))
///         .align(Alignment::Right)
///         .descending(),
/// ];
/// assert_eq!(columns[0].id, "ip_address");
/// ```
pub struct ColumnDefinition<T> {
    /// Stable identifier, derived from the name unless overridden.
    pub id: String,
    /// Header text.
    pub name: String,
    /// Width in display units; `None` lets the renderer size the column.
    pub width: Option<u32>,
    /// Whether the column is shown when no column selection is stored.
    pub enabled: bool,
    /// Direction applied when the column first becomes the sort column.
    pub initial_direction: SortDirection,
    /// Class hook for renderers.
    pub class: Option<String>,
    /// Render the cell as an icon only (no header text).
    pub icon_only: bool,
    /// Horizontal alignment.
    pub align: Alignment,
    selector: ValueSelector<T>,
    formatter: Option<CellFormatter<T>>,
}

impl<T> ColumnDefinition<T> {
    /// Create a column from its header text and value selector.
    ///
    /// The column is enabled, auto-sized, and sorts ascending first.
    pub fn new(
        name: impl Into<String>,
        selector: impl Fn(&T) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        Self {
            id: column_id(&name),
            name,
            width: None,
            enabled: true,
            initial_direction: SortDirection::Ascending,
            class: None,
            icon_only: false,
            align: Alignment::Left,
            selector: Arc::new(selector),
            formatter: None,
        }
    }

    /// Override the derived identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set a default width.
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Hide the column unless the user selects it.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Sort descending when the column first becomes the sort column.
    pub fn descending(mut self) -> Self {
        self.initial_direction = SortDirection::Descending;
        self
    }

    /// Set the initial sort direction.
    pub fn initial_direction(mut self, direction: SortDirection) -> Self {
        self.initial_direction = direction;
        self
    }

    /// Set the class hook.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Render as an icon only.
    pub fn icon_only(mut self) -> Self {
        self.icon_only = true;
        self
    }

    /// Set the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Set the display formatter.
    pub fn formatter(mut self, formatter: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Extract the cell value for a row.
    pub fn value(&self, row: &T) -> CellValue {
        (self.selector)(row)
    }

    /// Render the display text for a row.
    pub fn display(&self, row: &T) -> String {
        match &self.formatter {
            Some(formatter) => formatter(row),
            None => self.value(row).to_string(),
        }
    }
}

impl<T> Clone for ColumnDefinition<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            width: self.width,
            enabled: self.enabled,
            initial_direction: self.initial_direction,
            class: self.class.clone(),
            icon_only: self.icon_only,
            align: self.align,
            selector: Arc::clone(&self.selector),
            formatter: self.formatter.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("width", &self.width)
            .field("enabled", &self.enabled)
            .field("initial_direction", &self.initial_direction)
            .field("icon_only", &self.icon_only)
            .finish_non_exhaustive()
    }
}

/// Derive a column identifier from its header text.
///
/// Lower-cases the name and collapses every run of non-alphanumeric
/// characters into a single `_`.
pub fn column_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            id.extend(c.to_lowercase());
        } else if !id.is_empty() && !id.ends_with('_') {
            id.push('_');
        }
    }
    while id.ends_with('_') {
        id.pop();
    }
    id
}
