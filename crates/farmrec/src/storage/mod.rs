//! Storage layer for farmrec.
//!
//! This module provides `SQLite`-based persistent storage for every dataset.
//! Each table's queries live in their own submodule as an `impl Storage`
//! block. Writes are plain statements with "last writer wins" semantics.

mod crops;
mod farmers;
mod plantings;
mod profits;
pub mod schema;
mod users;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Storage engine for farm records.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the tables cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        schema::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next id for `table`: one past the largest, or 1 when empty.
    fn next_id(&self, table: &'static str) -> Result<i64> {
        let id: i64 = self.conn.query_row(
            &format!("SELECT COALESCE(MAX(id), 0) + 1 FROM {table}"),
            [],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn count_rows(&self, table: &'static str) -> Result<i64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }

    /// Row counts for every dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        Ok(StorageStats {
            users: self.count_rows("users")?,
            farmers: self.count_rows("farmers")?,
            crops: self.count_rows("crops")?,
            crop_profits: self.count_rows("crop_profits")?,
            farmer_crops: self.count_rows("farmer_crops")?,
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct StorageStats {
    /// Registered accounts.
    pub users: i64,
    /// Farmer records.
    pub farmers: i64,
    /// Crop catalog rows.
    pub crops: i64,
    /// Reference crops with profit data.
    pub crop_profits: i64,
    /// Crop entries recorded by farmers.
    pub farmer_crops: i64,
}

/// Parse an RFC 3339 column, falling back to now for unreadable values.
fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_next_id_starts_at_one() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.next_id("farmers").unwrap(), 1);
    }

    #[test]
    fn test_stats_empty() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.stats().unwrap(), StorageStats::default());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested/deeper/farm.db");

        let storage = Storage::open(&nested).unwrap();
        assert!(nested.exists());
        assert_eq!(storage.path(), nested);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("farm.db");

        {
            let storage = Storage::open(&path).unwrap();
            storage
                .conn
                .execute(
                    "INSERT INTO crop_profits (crop_name, season, profit_per_acre) VALUES ('Rice', 'Kharif', 30000)",
                    [],
                )
                .unwrap();
        }

        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.stats().unwrap().crop_profits, 1);
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-06-01T10:00:00+00:00");
        assert_eq!(ts.to_rfc3339(), "2024-06-01T10:00:00+00:00");
    }
}
