//! Database schema creation for all registry tables.
//!
//! All CREATE TABLE statements live here - single source of truth.

use crate::error::Result;
use crate::RevsnapDb;
use tracing::info;

impl RevsnapDb {
    /// Ensure all tables exist.
    pub(crate) async fn ensure_schema(&self) -> Result<()> {
        // Enable WAL mode for better concurrent access
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&self.pool)
            .await?;
        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&self.pool)
            .await?;
        sqlx::query("PRAGMA foreign_keys=ON")
            .execute(&self.pool)
            .await?;

        self.create_registry_tables().await?;

        info!("Database schema verified");
        Ok(())
    }

    async fn create_registry_tables(&self) -> Result<()> {
        // Hotels: onboarded properties and their routing addresses
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS rs_hotels (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                available_rooms INTEGER NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;

        // Processed mail: audit log written after an item fully succeeds
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS rs_processed_mail (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message_id TEXT NOT NULL UNIQUE,
                sender TEXT,
                subject TEXT,
                received_at INTEGER,
                processed_at INTEGER NOT NULL,
                content_hash TEXT NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;

        // Snapshots: one per ingested file, content hash globally unique
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS rs_snapshots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                hotel_id INTEGER NOT NULL REFERENCES rs_hotels(id),
                taken_at INTEGER NOT NULL,
                filename TEXT NOT NULL,
                storage_ref TEXT NOT NULL,
                content_hash TEXT NOT NULL UNIQUE,
                available_rooms INTEGER NOT NULL,
                is_seed INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'PENDING',
                error_message TEXT,
                row_count INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;

        // Snapshot rows: one per stay date per kind within a snapshot
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS rs_snapshot_rows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                snapshot_id INTEGER NOT NULL REFERENCES rs_snapshots(id) ON DELETE CASCADE,
                hotel_id INTEGER NOT NULL REFERENCES rs_hotels(id),
                stay_date TEXT NOT NULL,
                kind TEXT NOT NULL,
                raw_values TEXT NOT NULL,
                room_nights REAL NOT NULL,
                room_revenue REAL NOT NULL,
                out_of_order REAL NOT NULL,
                occupancy_pct REAL NOT NULL,
                adr REAL NOT NULL,
                revpar REAL NOT NULL,
                row_index INTEGER NOT NULL,
                UNIQUE(snapshot_id, stay_date, kind)
            )"#,
        )
        .execute(&self.pool)
        .await?;

        // Indexes
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_snapshots_hotel_taken ON rs_snapshots(hotel_id, taken_at)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_snapshots_status ON rs_snapshots(status)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_rows_snapshot ON rs_snapshot_rows(snapshot_id)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_rows_hotel_date ON rs_snapshot_rows(hotel_id, stay_date)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_mail_processed_at ON rs_processed_mail(processed_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
