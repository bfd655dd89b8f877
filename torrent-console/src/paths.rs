//! Platform-specific file locations.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "norpie";
const APPLICATION: &str = "torrent-console";

/// Log files kept besides `latest.log`.
const MAX_OLD_LOGS: usize = 10;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Settings database holding persisted grid configuration.
///
/// - Linux: `~/.local/share/torrent-console/settings.db`
/// - macOS: `~/Library/Application Support/dev.norpie.torrent-console/settings.db`
pub fn settings_db() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("settings.db"))
}

/// Log file for the current run.
pub fn log_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().join("latest.log"))
}

/// Archive `latest.log` under a timestamped name and prune old archives.
pub fn rotate_logs() {
    let Some(latest) = log_file() else { return };
    let Some(dir) = latest.parent() else { return };

    if latest.exists() {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let _ = fs::rename(&latest, dir.join(format!("{}.log", stamp)));
    }
    prune_logs(dir, MAX_OLD_LOGS);
}

/// Remove the oldest archived logs in `dir`, keeping `keep`.
fn prune_logs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut archived: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != "latest.log"
        })
        .collect();
    if archived.len() <= keep {
        return;
    }

    archived.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());
    for entry in &archived[..archived.len() - keep] {
        let _ = fs::remove_file(entry.path());
    }
}
