//! Rows shown by the console, deserialised from the remote API's JSON.

use std::collections::BTreeMap;

use datagrid::GridRow;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ConsoleError;

/// A row that can also arrive as the value of an object keyed by its id.
///
/// Sync endpoints send `{ "<hash>": { ... } }` without repeating the key in
/// the value; `with_key` puts it back.
pub trait KeyedRow: GridRow + DeserializeOwned {
    fn with_key(self, _key: &str) -> Self {
        self
    }
}

/// Parse rows from either a JSON array or an object keyed by row id.
pub fn parse_rows<T: KeyedRow>(text: &str) -> Result<Vec<T>, ConsoleError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(ConsoleError::from))
            .collect(),
        Value::Object(map) => {
            let keyed: BTreeMap<String, Value> = map.into_iter().collect();
            keyed
                .into_iter()
                .map(|(key, item)| -> Result<T, ConsoleError> {
                    Ok(serde_json::from_value::<T>(item)?.with_key(&key))
                })
                .collect()
        }
        _ => Err(ConsoleError::usage("row data must be a JSON array or object")),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Torrent {
    pub hash: String,
    pub name: String,
    pub size: i64,
    pub progress: f64,
    pub dlspeed: i64,
    pub upspeed: i64,
    pub num_seeds: i64,
    pub num_complete: i64,
    pub num_leechs: i64,
    pub num_incomplete: i64,
    pub ratio: f64,
    pub eta: i64,
    pub state: String,
    pub category: String,
    pub tags: String,
    pub added_on: i64,
    pub completion_on: i64,
    pub priority: i64,
    pub save_path: String,
    pub downloaded: i64,
    pub uploaded: i64,
}

impl Default for Torrent {
    fn default() -> Self {
        Self {
            hash: String::new(),
            name: String::new(),
            size: -1,
            progress: 0.0,
            dlspeed: 0,
            upspeed: 0,
            num_seeds: 0,
            num_complete: 0,
            num_leechs: 0,
            num_incomplete: 0,
            ratio: 0.0,
            eta: crate::format::ETA_INFINITE,
            state: String::new(),
            category: String::new(),
            tags: String::new(),
            added_on: 0,
            completion_on: 0,
            priority: 0,
            save_path: String::new(),
            downloaded: 0,
            uploaded: 0,
        }
    }
}

impl Torrent {
    /// Short status text for the raw API state.
    pub fn status(&self) -> &'static str {
        match self.state.as_str() {
            "downloading" | "forcedDL" => "Downloading",
            "metaDL" | "forcedMetaDL" => "Downloading metadata",
            "stalledDL" => "Stalled",
            "uploading" | "forcedUP" | "stalledUP" => "Seeding",
            "pausedDL" | "stoppedDL" => "Paused",
            "pausedUP" | "stoppedUP" => "Completed",
            "queuedDL" | "queuedUP" => "Queued",
            "checkingDL" | "checkingUP" | "checkingResumeData" => "Checking",
            "moving" => "Moving",
            "missingFiles" => "Missing files",
            "error" => "Errored",
            _ => "Unknown",
        }
    }

    /// One-character state glyph for the icon column.
    pub fn state_icon(&self) -> &'static str {
        match self.status() {
            "Downloading" | "Downloading metadata" => "↓",
            "Seeding" => "↑",
            "Paused" | "Completed" => "‖",
            "Stalled" | "Queued" => "…",
            "Checking" | "Moving" => "⟳",
            "Errored" | "Missing files" => "!",
            _ => "?",
        }
    }
}

impl GridRow for Torrent {
    fn key(&self) -> String {
        self.hash.clone()
    }

    fn row_class(&self) -> Option<String> {
        Some(self.state.clone()).filter(|s| !s.is_empty())
    }
}

impl KeyedRow for Torrent {
    fn with_key(mut self, key: &str) -> Self {
        if self.hash.is_empty() {
            self.hash = key.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Peer {
    pub ip: String,
    pub port: u16,
    pub client: String,
    pub connection: String,
    pub flags: String,
    pub country: String,
    pub country_code: String,
    pub progress: f64,
    pub dl_speed: i64,
    pub up_speed: i64,
    pub downloaded: i64,
    pub uploaded: i64,
    pub relevance: f64,
}

impl GridRow for Peer {
    fn key(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

impl KeyedRow for Peer {
    /// Keys look like `1.2.3.4:6881` or `[::1]:6881`.
    fn with_key(mut self, key: &str) -> Self {
        if !self.ip.is_empty() {
            return self;
        }
        if let Some((ip, port)) = key.rsplit_once(':') {
            self.ip = ip.trim_start_matches('[').trim_end_matches(']').to_string();
            self.port = port.parse().unwrap_or_default();
        }
        self
    }
}

/// Severity of a log message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(from = "i64")]
pub enum LogLevel {
    #[default]
    Normal,
    Info,
    Warning,
    Critical,
}

impl From<i64> for LogLevel {
    fn from(bits: i64) -> Self {
        match bits {
            8 => LogLevel::Critical,
            4 => LogLevel::Warning,
            2 => LogLevel::Info,
            _ => LogLevel::Normal,
        }
    }
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Normal => "Normal",
            LogLevel::Info => "Info",
            LogLevel::Warning => "Warning",
            LogLevel::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    pub id: i64,
    pub message: String,
    /// Unix time in milliseconds.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub level: LogLevel,
}

impl GridRow for LogEntry {
    fn key(&self) -> String {
        self.id.to_string()
    }

    fn row_class(&self) -> Option<String> {
        Some(self.level.label().to_lowercase())
    }
}

impl KeyedRow for LogEntry {}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TorrentFile {
    pub index: i64,
    pub name: String,
    pub size: i64,
    pub progress: f64,
    pub priority: i64,
    pub availability: f64,
}

impl TorrentFile {
    /// Bytes left to download.
    pub fn remaining(&self) -> i64 {
        let done = (self.size as f64 * self.progress.clamp(0.0, 1.0)) as i64;
        (self.size - done).max(0)
    }

    pub fn priority_label(&self) -> &'static str {
        match self.priority {
            0 => "Do not download",
            1 => "Normal",
            6 => "High",
            7 => "Maximum",
            _ => "Mixed",
        }
    }
}

impl GridRow for TorrentFile {
    fn key(&self) -> String {
        self.index.to_string()
    }
}

impl KeyedRow for TorrentFile {}
