//! The row contract every grid is parameterised over.

/// Trait for items that can be displayed as rows in a [`DataGrid`](crate::DataGrid).
///
/// Rows are identified by [`key`](GridRow::key): two rows with the same key
/// are the same row for selection purposes, even across refreshes where the
/// host hands the grid freshly deserialised values.
///
/// # Example
///
/// ```
/// use datagrid::GridRow;
///
/// #[derive(Debug, Clone)]
/// struct Torrent {
///     hash: String,
///     name: String,
/// }
///
/// impl GridRow for Torrent {
///     fn key(&self) -> String {
///         self.hash.clone()
///     }
/// }
///
/// assert_eq!(Torrent::type_name(), "Torrent");
/// ```
pub trait GridRow: std::fmt::Debug + Clone + Send + Sync + 'static {
    /// Stable identity of this row.
    fn key(&self) -> String;

    /// Optional class hook for the row (used by renderers for styling).
    fn row_class(&self) -> Option<String> {
        None
    }

    /// Optional test identifier for the row.
    fn test_id(&self) -> Option<String> {
        None
    }

    /// Name of the row type, used to namespace persisted grid configuration.
    ///
    /// Defaults to the last path segment of the Rust type name.
    fn type_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }
}
