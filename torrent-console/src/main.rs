mod columns;
mod config;
mod error;
mod format;
mod model;
mod paths;
mod view;

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Arc;

use datagrid::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::config::{ConsoleConfig, SettingsLocation, TableKind, USAGE};
use crate::error::ConsoleError;
use crate::model::{KeyedRow, parse_rows};

/// Create the log file and any missing parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    File::create(path)
}

fn init_logging(level: LevelFilter) {
    if level == LevelFilter::Off {
        return;
    }
    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return;
    };
    match open_log_file(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, Config::default(), file) {
                eprintln!("Warning: logging disabled: {}", e);
            }
        }
        Err(e) => eprintln!("Warning: cannot create {}: {}", path.display(), e),
    }
}

/// Resolve the platform default to a concrete location. Falls back to
/// memory when there is no data directory.
fn resolve_settings(location: SettingsLocation) -> SettingsLocation {
    if location != SettingsLocation::Default {
        return location;
    }
    match paths::settings_db() {
        Some(path) => SettingsLocation::File(path),
        None => {
            log::warn!("[console] no data directory, configuration will not be kept");
            SettingsLocation::Memory
        }
    }
}

async fn open_settings(location: &SettingsLocation) -> Result<SettingsProvider, ConsoleError> {
    let path = match location {
        SettingsLocation::File(path) => path,
        SettingsLocation::Memory | SettingsLocation::Default => {
            return Ok(SettingsProvider::new(MemoryBackend::new()));
        }
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    log::info!("[console] settings at {}", path.display());
    Ok(SettingsProvider::new(SqliteBackend::new(path).await?))
}

async fn show<T: KeyedRow>(
    config: &ConsoleConfig,
    settings: SettingsProvider,
    keyboard: Arc<KeyboardRegistry>,
    definitions: Vec<ColumnDefinition<T>>,
) -> Result<String, ConsoleError> {
    let rows = match &config.data {
        Some(path) => parse_rows::<T>(&tokio::fs::read_to_string(path).await?)?,
        None => Vec::new(),
    };
    log::info!("[console] {} {} rows", rows.len(), config.table);

    let mut params = GridParams::new(config.table_id.clone(), definitions)
        .rows(rows)
        .multi_selection();
    if let Some((column, direction)) = columns::default_sort(config.table) {
        params = params.default_sort(column, direction);
    }

    let grid = DataGrid::new(params, settings, Arc::clone(&keyboard) as Arc<dyn KeyboardService>);
    if config.reset {
        grid.reset_configuration().await?;
    }
    grid.load().await?;

    if let Some(selected) = &config.columns {
        let mut options = grid.column_options();
        options.selected_columns = selected.iter().cloned().collect();
        grid.apply_column_options(options).await?;
    }
    for (column, width) in &config.widths {
        grid.set_column_width(column, *width).await?;
    }
    if let Some(sort) = &config.sort {
        match sort.direction {
            Some(direction) => grid.sort_by(&sort.column, direction).await?,
            None => grid.toggle_sort(&sort.column).await?,
        }
    }

    grid.after_render().await?;
    for key in &config.keys {
        if keyboard.dispatch(key) == 0 {
            log::debug!("[console] key {} not bound", key);
        }
    }
    for event in grid.take_events() {
        log::info!("[console] {}", view::describe(&event));
    }

    let text = view::render(&grid);
    grid.dispose().await?;
    Ok(text)
}

async fn run(config: ConsoleConfig) -> Result<(), ConsoleError> {
    let location = resolve_settings(config.settings.clone());
    let config = config.with_settings(location);
    let settings = open_settings(&config.settings).await?;
    let keyboard = Arc::new(KeyboardRegistry::new());

    let text = match config.table {
        TableKind::Torrents => show(&config, settings, keyboard, columns::torrent_columns()).await?,
        TableKind::Peers => show(&config, settings, keyboard, columns::peer_columns()).await?,
        TableKind::Log => show(&config, settings, keyboard, columns::log_columns()).await?,
        TableKind::Files => show(&config, settings, keyboard, columns::file_columns()).await?,
    };
    print!("{}", text);
    Ok(())
}

#[tokio::main]
async fn main() {
    let config = match ConsoleConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };
    if config.help {
        println!("{}", USAGE);
        return;
    }

    init_logging(config.log_level);

    if let Err(e) = run(config).await {
        log::error!("[console] {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
