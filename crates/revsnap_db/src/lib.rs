//! Snapshot registry database layer.
//!
//! This crate provides a single source of truth for all database operations.
//! All interfaces (CLI, ingestion, comparison) should use this crate for
//! database access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use revsnap_db::{Result, RevsnapDb};
//!
//! let db = RevsnapDb::open("~/.revsnap/revsnap.sqlite3").await?;
//!
//! let hotels = db.hotel_list(false).await?;
//! let latest = db.snapshot_latest_completed(hotels[0].id, 2).await?;
//! ```

mod error;
mod schema;

// Method implementations organized by domain
mod compare;
mod hotels;
mod mail;
mod rows;
mod snapshots;

pub use error::{DbError, Result};
pub use snapshots::{RegistryStats, SnapshotFilter};

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Unified database handle for the snapshot registry.
///
/// This is the ONLY way to access the database. Do not use raw sqlx elsewhere.
#[derive(Clone)]
pub struct RevsnapDb {
    pool: SqlitePool,
}

impl RevsnapDb {
    /// Open or create a database at the given path.
    ///
    /// Creates all tables if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;

        info!(path = %path.display(), "Database opened");

        Ok(db)
    }

    /// Open an existing database (fails if not exists).
    pub async fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DbError::NotFound(format!(
                "Database not found: {}",
                path.display()
            )));
        }

        let url = format!("sqlite:{}?mode=rw", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        Ok(Self { pool })
    }

    /// Get the underlying connection pool (escape hatch for complex queries).
    ///
    /// Prefer the typed methods instead.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

// Timestamp utilities
impl RevsnapDb {
    /// Current time as milliseconds since Unix epoch.
    pub fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Convert milliseconds to DateTime.
    pub fn millis_to_datetime(millis: i64) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(millis).unwrap_or_else(chrono::Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_database() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("registry.db");

        let db = RevsnapDb::open(&db_path).await.unwrap();
        assert!(db_path.exists());

        db.close().await;
    }

    #[tokio::test]
    async fn test_open_existing_fails_if_not_exists() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("nonexistent.db");

        let result = RevsnapDb::open_existing(&db_path).await;
        assert!(result.is_err());
    }
}
