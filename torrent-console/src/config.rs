//! Console configuration and command-line parsing.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use datagrid::SortDirection;
use datagrid::keybinds::KeyCombo;
use simplelog::LevelFilter;

use crate::error::ConsoleError;

pub const USAGE: &str = "\
Usage: torrent-console [OPTIONS]

Options:
  --table <torrents|peers|log|files>   Table to show (default: torrents)
  --table-id <id>                      Configuration scope (default: main)
  --data <file>                        JSON rows (array or object keyed by id)
  --sort <column>[:asc|desc]           Sort by a column; no direction toggles
  --columns <id,id,...>                Show only these columns
  --width <column>=<n|auto>            Set a column width (repeatable)
  --keys <key,key,...>                 Replay key presses, e.g. down,shift+down,enter
  --settings <file>                    Settings database (default: platform data dir)
  --memory                             Keep configuration in memory only
  --reset                              Forget stored configuration first
  --log-level <level>                  off, error, warn, info, debug, trace
  -h, --help                           Show this help";

/// Which grid the console shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableKind {
    #[default]
    Torrents,
    Peers,
    Log,
    Files,
}

impl FromStr for TableKind {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "torrents" | "transfers" => Ok(TableKind::Torrents),
            "peers" => Ok(TableKind::Peers),
            "log" | "logs" => Ok(TableKind::Log),
            "files" | "content" => Ok(TableKind::Files),
            other => Err(ConsoleError::usage(format!("unknown table: {}", other))),
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableKind::Torrents => "torrents",
            TableKind::Peers => "peers",
            TableKind::Log => "log",
            TableKind::Files => "files",
        })
    }
}

/// A sort request from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRequest {
    pub column: String,
    /// `None` toggles like a header click.
    pub direction: Option<SortDirection>,
}

impl FromStr for SortRequest {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match s.split_once(':') {
            Some((column, direction)) => (column, Some(direction)),
            None => (s, None),
        };
        if column.is_empty() {
            return Err(ConsoleError::usage("empty sort column"));
        }
        let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
            None => None,
            Some("asc") | Some("ascending") => Some(SortDirection::Ascending),
            Some("desc") | Some("descending") => Some(SortDirection::Descending),
            Some(other) => {
                return Err(ConsoleError::usage(format!("unknown sort direction: {}", other)));
            }
        };
        Ok(Self {
            column: column.to_string(),
            direction,
        })
    }
}

/// Where grid configuration is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SettingsLocation {
    /// The platform data directory.
    #[default]
    Default,
    File(PathBuf),
    Memory,
}

/// Console configuration, normally built by [`ConsoleConfig::from_args`].
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub table: TableKind,
    pub table_id: String,
    pub data: Option<PathBuf>,
    pub sort: Option<SortRequest>,
    pub columns: Option<Vec<String>>,
    pub widths: Vec<(String, Option<u32>)>,
    pub keys: Vec<KeyCombo>,
    pub settings: SettingsLocation,
    pub reset: bool,
    pub log_level: LevelFilter,
    pub help: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            table: TableKind::Torrents,
            table_id: "main".to_string(),
            data: None,
            sort: None,
            columns: None,
            widths: Vec::new(),
            keys: Vec::new(),
            settings: SettingsLocation::Default,
            reset: false,
            log_level: LevelFilter::Info,
            help: false,
        }
    }
}

impl ConsoleConfig {
    pub fn with_settings(mut self, settings: SettingsLocation) -> Self {
        self.settings = settings;
        self
    }

    /// Parse command-line arguments (without the program name).
    pub fn from_args<I>(args: I) -> Result<Self, ConsoleError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .ok_or_else(|| ConsoleError::usage(format!("{} needs a value", name)))
            };
            match arg.as_str() {
                "-h" | "--help" => config.help = true,
                "--table" => config.table = value("--table")?.parse()?,
                "--table-id" => config.table_id = value("--table-id")?,
                "--data" => config.data = Some(PathBuf::from(value("--data")?)),
                "--sort" => config.sort = Some(value("--sort")?.parse()?),
                "--columns" => {
                    config.columns = Some(split_list(&value("--columns")?));
                }
                "--width" => config.widths.push(parse_width(&value("--width")?)?),
                "--keys" => {
                    for key in split_list(&value("--keys")?) {
                        config.keys.push(key.parse()?);
                    }
                }
                "--settings" => {
                    config.settings = SettingsLocation::File(PathBuf::from(value("--settings")?));
                }
                "--memory" => config.settings = SettingsLocation::Memory,
                "--reset" => config.reset = true,
                "--log-level" => {
                    let level = value("--log-level")?;
                    config.log_level = level
                        .parse()
                        .map_err(|_| ConsoleError::usage(format!("unknown log level: {}", level)))?;
                }
                other => return Err(ConsoleError::usage(format!("unknown argument: {}", other))),
            }
        }

        if config.table_id.is_empty() {
            return Err(ConsoleError::usage("table id must not be empty"));
        }
        Ok(config)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_width(value: &str) -> Result<(String, Option<u32>), ConsoleError> {
    let invalid = || ConsoleError::usage(format!("invalid width: {}", value));
    let (column, width) = value.split_once('=').ok_or_else(invalid)?;
    if column.is_empty() {
        return Err(invalid());
    }
    let width = match width {
        "auto" => None,
        n => Some(n.parse().map_err(|_| invalid())?),
    };
    Ok((column.to_string(), width))
}
