use std::path::Path;

use async_sqlite::rusqlite::{self, OptionalExtension};
use async_sqlite::{Client, ClientBuilder, JournalMode};
use async_trait::async_trait;
use dashmap::DashMap;

use super::{SettingsBackend, SettingsError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS grid_settings (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)";

/// Grid configuration in an SQLite file, so it survives restarts.
///
/// Lookups are cached, including misses; every write goes through to the
/// database before the cache is updated.
pub struct SqliteBackend {
    client: Client,
    cache: DashMap<String, Option<String>>,
}

impl SqliteBackend {
    /// Open or create the database at `path` (WAL journal).
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;
        Self::init(client).await
    }

    /// A private in-memory database, gone when dropped.
    pub async fn open_in_memory() -> Result<Self, SettingsError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;
        Self::init(client).await
    }

    async fn init(client: Client) -> Result<Self, SettingsError> {
        client.conn(|conn| conn.execute_batch(SCHEMA)).await?;
        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }
}

#[async_trait]
impl SettingsBackend for SqliteBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SettingsError> {
        if let Some(cached) = self.cache.get(key) {
            return Ok(cached.value().clone());
        }

        let lookup = key.to_string();
        let json = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT value FROM grid_settings WHERE key = ?1",
                    [&lookup],
                    |row| row.get::<_, String>(0),
                )
                .optional()
            })
            .await?;

        self.cache.insert(key.to_string(), json.clone());
        Ok(json)
    }

    async fn set_item(&self, key: &str, json: String) -> Result<(), SettingsError> {
        let (owned_key, value) = (key.to_string(), json.clone());
        let now = chrono::Utc::now().timestamp();
        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO grid_settings (key, value, updated_at)
                     VALUES (?1, ?2, ?3)",
                    rusqlite::params![owned_key, value, now],
                )
            })
            .await?;
        self.cache.insert(key.to_string(), Some(json));
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), SettingsError> {
        let owned_key = key.to_string();
        self.client
            .conn(move |conn| {
                conn.execute("DELETE FROM grid_settings WHERE key = ?1", [&owned_key])
            })
            .await?;
        self.cache.insert(key.to_string(), None);
        Ok(())
    }
}
