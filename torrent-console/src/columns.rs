//! Default column sets for each row type.

use std::sync::Arc;

use chrono::DateTime;
use datagrid::{Alignment, CellValue, ColumnDefinition, SortDirection};

use crate::config::TableKind;
use crate::format::{
    format_eta, format_percent, format_ratio, format_size, format_speed, format_timestamp,
};
use crate::model::{LogEntry, Peer, Torrent, TorrentFile};

fn unix(seconds: i64) -> CellValue {
    DateTime::from_timestamp(seconds, 0)
        .filter(|_| seconds > 0)
        .into()
}

fn size(
    name: &str,
    selector: impl Fn(&Torrent) -> i64 + Send + Sync + 'static,
) -> ColumnDefinition<Torrent> {
    let selector = Arc::new(selector);
    let display = Arc::clone(&selector);
    ColumnDefinition::new(name, move |t: &Torrent| CellValue::from(selector(t)))
        .formatter(move |t| format_size(display(t)))
        .align(Alignment::Right)
        .descending()
}

pub fn torrent_columns() -> Vec<ColumnDefinition<Torrent>> {
    vec![
        ColumnDefinition::new("State", |t: &Torrent| CellValue::from(t.status()))
            .with_id("state_icon")
            .formatter(|t| t.state_icon().to_string())
            .icon_only()
            .width(2),
        ColumnDefinition::new("#", |t: &Torrent| CellValue::from(t.priority))
            .with_id("queue")
            .formatter(|t| {
                if t.priority > 0 {
                    t.priority.to_string()
                } else {
                    "*".to_string()
                }
            })
            .align(Alignment::Right)
            .disabled(),
        ColumnDefinition::new("Name", |t: &Torrent| CellValue::from(&t.name)).width(40),
        size("Size", |t| t.size),
        ColumnDefinition::new("Progress", |t: &Torrent| CellValue::from(t.progress))
            .formatter(|t| format_percent(t.progress))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Status", |t: &Torrent| CellValue::from(t.status())),
        ColumnDefinition::new("Seeds", |t: &Torrent| CellValue::from(t.num_seeds))
            .formatter(|t| format!("{} ({})", t.num_seeds, t.num_complete))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Peers", |t: &Torrent| CellValue::from(t.num_leechs))
            .formatter(|t| format!("{} ({})", t.num_leechs, t.num_incomplete))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Down Speed", |t: &Torrent| CellValue::from(t.dlspeed))
            .formatter(|t| format_speed(t.dlspeed))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Up Speed", |t: &Torrent| CellValue::from(t.upspeed))
            .formatter(|t| format_speed(t.upspeed))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("ETA", |t: &Torrent| CellValue::from(t.eta))
            .formatter(|t| format_eta(t.eta))
            .align(Alignment::Right),
        ColumnDefinition::new("Ratio", |t: &Torrent| CellValue::from(t.ratio))
            .formatter(|t| format_ratio(t.ratio))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Category", |t: &Torrent| CellValue::from(&t.category)),
        ColumnDefinition::new("Tags", |t: &Torrent| CellValue::from(&t.tags)).disabled(),
        ColumnDefinition::new("Added On", |t: &Torrent| unix(t.added_on))
            .formatter(|t| format_timestamp(t.added_on))
            .descending(),
        ColumnDefinition::new("Completed On", |t: &Torrent| unix(t.completion_on))
            .formatter(|t| format_timestamp(t.completion_on))
            .descending()
            .disabled(),
        size("Downloaded", |t| t.downloaded).disabled(),
        size("Uploaded", |t| t.uploaded).disabled(),
        ColumnDefinition::new("Save Path", |t: &Torrent| CellValue::from(&t.save_path)).disabled(),
    ]
}

pub fn peer_columns() -> Vec<ColumnDefinition<Peer>> {
    vec![
        ColumnDefinition::new("Country", |p: &Peer| CellValue::from(&p.country))
            .formatter(|p| p.country_code.to_uppercase())
            .icon_only()
            .width(2),
        ColumnDefinition::new("IP", |p: &Peer| CellValue::from(&p.ip)),
        ColumnDefinition::new("Port", |p: &Peer| CellValue::from(i64::from(p.port))).align(Alignment::Right),
        ColumnDefinition::new("Connection", |p: &Peer| CellValue::from(&p.connection)),
        ColumnDefinition::new("Flags", |p: &Peer| CellValue::from(&p.flags)),
        ColumnDefinition::new("Client", |p: &Peer| CellValue::from(&p.client)).width(24),
        ColumnDefinition::new("Progress", |p: &Peer| CellValue::from(p.progress))
            .formatter(|p| format_percent(p.progress))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Down Speed", |p: &Peer| CellValue::from(p.dl_speed))
            .formatter(|p| format_speed(p.dl_speed))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Up Speed", |p: &Peer| CellValue::from(p.up_speed))
            .formatter(|p| format_speed(p.up_speed))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Downloaded", |p: &Peer| CellValue::from(p.downloaded))
            .formatter(|p| format_size(p.downloaded))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Uploaded", |p: &Peer| CellValue::from(p.uploaded))
            .formatter(|p| format_size(p.uploaded))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Relevance", |p: &Peer| CellValue::from(p.relevance))
            .formatter(|p| format_percent(p.relevance))
            .align(Alignment::Right)
            .disabled(),
    ]
}

pub fn log_columns() -> Vec<ColumnDefinition<LogEntry>> {
    vec![
        ColumnDefinition::new("ID", |l: &LogEntry| CellValue::from(l.id))
            .align(Alignment::Right)
            .disabled(),
        ColumnDefinition::new("Time", |l: &LogEntry| CellValue::from(l.timestamp))
            .formatter(|l| format_timestamp(l.timestamp / 1000))
            .descending(),
        ColumnDefinition::new("Type", |l: &LogEntry| CellValue::from(l.level as i64))
            .formatter(|l| l.level.label().to_string())
            .descending(),
        ColumnDefinition::new("Message", |l: &LogEntry| CellValue::from(&l.message)).width(80),
    ]
}

pub fn file_columns() -> Vec<ColumnDefinition<TorrentFile>> {
    vec![
        ColumnDefinition::new("Name", |f: &TorrentFile| CellValue::from(&f.name)).width(48),
        ColumnDefinition::new("Size", |f: &TorrentFile| CellValue::from(f.size))
            .formatter(|f| format_size(f.size))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Progress", |f: &TorrentFile| CellValue::from(f.progress))
            .formatter(|f| format_percent(f.progress))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Priority", |f: &TorrentFile| CellValue::from(f.priority))
            .formatter(|f| f.priority_label().to_string()),
        ColumnDefinition::new("Remaining", |f: &TorrentFile| CellValue::from(f.remaining()))
            .formatter(|f| format_size(f.remaining()))
            .align(Alignment::Right)
            .descending(),
        ColumnDefinition::new("Availability", |f: &TorrentFile| CellValue::from(f.availability))
            .formatter(|f| {
                if f.availability < 0.0 {
                    String::new()
                } else {
                    format!("{:.3}", f.availability)
                }
            })
            .align(Alignment::Right),
    ]
}

/// Host default sort for each table, used when nothing is stored.
pub fn default_sort(table: TableKind) -> Option<(&'static str, SortDirection)> {
    match table {
        TableKind::Torrents => Some(("added_on", SortDirection::Descending)),
        TableKind::Log => Some(("time", SortDirection::Descending)),
        TableKind::Peers | TableKind::Files => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn unique<T>(columns: &[ColumnDefinition<T>]) -> bool {
        let ids: HashSet<&str> = columns.iter().map(|c| c.id.as_str()).collect();
        ids.len() == columns.len()
    }

    #[test]
    fn ids_are_unique() {
        assert!(unique(&torrent_columns()));
        assert!(unique(&peer_columns()));
        assert!(unique(&log_columns()));
        assert!(unique(&file_columns()));
    }

    #[test]
    fn default_sorts_name_real_columns() {
        let torrent_ids: Vec<String> = torrent_columns().into_iter().map(|c| c.id).collect();
        assert!(torrent_ids.contains(&"added_on".to_string()));
        let log_ids: Vec<String> = log_columns().into_iter().map(|c| c.id).collect();
        assert!(log_ids.contains(&"time".to_string()));
    }

    #[test]
    fn state_column_renders_icon() {
        let columns = torrent_columns();
        let torrent = Torrent {
            state: "uploading".to_string(),
            ..Default::default()
        };
        assert_eq!(columns[0].display(&torrent), "↑");
        assert_eq!(columns[0].value(&torrent), CellValue::from("Seeding"));
    }

    #[test]
    fn unset_timestamps_sort_first() {
        assert!(unix(0).is_empty());
        assert!(!unix(1_700_000_000).is_empty());
    }
}
