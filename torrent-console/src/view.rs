//! Plain-text rendering of a grid.

use datagrid::prelude::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Auto-sized columns never grow past this.
const MAX_AUTO_WIDTH: usize = 40;

const SELECTED: &str = "■ ";
const UNSELECTED: &str = "□ ";
const GAP: &str = "  ";

/// Cut `text` to `width` display cells, ending in `…` when shortened.
pub fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn pad(text: &str, width: usize, align: Alignment) -> String {
    let text = fit(text, width);
    let fill = width.saturating_sub(text.width());
    match align {
        Alignment::Left => format!("{}{}", text, " ".repeat(fill)),
        Alignment::Right => format!("{}{}", " ".repeat(fill), text),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(fill - left))
        }
    }
}

fn header(column: &ColumnDefinition<impl GridRow>, sort: &SortState) -> String {
    let mut title = if column.icon_only {
        String::new()
    } else {
        column.name.clone()
    };
    if sort.column.as_deref() == Some(column.id.as_str()) {
        match sort.direction {
            SortDirection::Ascending => title.push_str(" ▲"),
            SortDirection::Descending => title.push_str(" ▼"),
            SortDirection::None => {}
        }
    }
    title
}

/// Render visible columns and displayed rows as an aligned table.
///
/// Each row starts with a selection marker. Column widths come from the
/// grid (stored or default); auto columns fit their content.
pub fn render<T: GridRow>(grid: &DataGrid<T>) -> String {
    let columns = grid.visible_columns();
    let rows = grid.displayed_rows();
    let sort = grid.sort_state();

    let headers: Vec<String> = columns.iter().map(|c| header(c, &sort)).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| c.display(row)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| match column.width {
            Some(width) => width as usize,
            None => cells
                .iter()
                .map(|line| line[i].width())
                .chain(std::iter::once(headers[i].width()))
                .max()
                .unwrap_or(0)
                .min(MAX_AUTO_WIDTH),
        })
        .collect();

    let line = |marker: &str, texts: &[String]| -> String {
        let fields: Vec<String> = columns
            .iter()
            .zip(texts)
            .zip(&widths)
            .map(|((column, text), width)| pad(text, *width, column.align))
            .collect();
        format!("{}{}", marker, fields.join(GAP)).trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&" ".repeat(SELECTED.width()), &headers));
    out.push('\n');
    for (row, texts) in rows.iter().zip(&cells) {
        let marker = if grid.is_selected(row) {
            SELECTED
        } else {
            UNSELECTED
        };
        out.push_str(&line(marker, texts));
        out.push('\n');
    }
    out
}

/// One-line summary of a notification for the log.
pub fn describe<T: GridRow>(event: &GridEvent<T>) -> String {
    match event {
        GridEvent::RowClick { row, .. } => format!("row click {}", row.key()),
        GridEvent::SelectedItemChanged(row) => format!(
            "selected item {}",
            row.as_ref().map(GridRow::key).unwrap_or_default()
        ),
        GridEvent::SelectedItemsChanged(rows) => format!("{} rows selected", rows.len()),
        GridEvent::SortColumnChanged(column) => {
            format!("sort column {}", column.as_deref().unwrap_or("-"))
        }
        GridEvent::SortDirectionChanged(direction) => format!("sort direction {:?}", direction),
        GridEvent::SelectedColumnsChanged(columns) => format!("{} columns selected", columns.len()),
        GridEvent::CellContextMenu { row, column_id } => {
            format!("context menu {} {}", row.key(), column_id)
        }
        GridEvent::CellLongPress { row, column_id } => {
            format!("long press {} {}", row.key(), column_id)
        }
        GridEvent::ItemActivated(row) => format!("activated {}", row.key()),
    }
}
