//! Snapshot registry operations.
//!
//! Registration is two-phase: `snapshot_register` writes a PENDING header
//! row, then `snapshot_commit_rows` flips it to PROCESSING, inserts the day
//! rows and marks COMPLETED inside one transaction. A failed commit rolls
//! the whole transaction back and leaves the header PENDING; callers decide
//! whether to mark the snapshot FAILED afterwards.

use crate::error::{is_unique_violation, DbError, Result};
use crate::RevsnapDb;
use revsnap_core::record::raw_values_to_json;
use revsnap_core::{NewSnapshot, RowDraft, Snapshot, SnapshotStatus};
use sqlx::Row;

impl RevsnapDb {
    // ========================================================================
    // Two-phase registration
    // ========================================================================

    /// Phase one: register a snapshot header in PENDING state.
    ///
    /// The content hash is globally unique; registering the same bytes twice
    /// is a constraint error regardless of hotel.
    pub async fn snapshot_register(&self, new: &NewSnapshot) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO rs_snapshots
                (hotel_id, taken_at, filename, storage_ref, content_hash,
                 available_rooms, is_seed, status, row_count, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'PENDING', 0, ?)
            "#,
        )
        .bind(new.hotel_id)
        .bind(new.taken_at.timestamp_millis())
        .bind(&new.filename)
        .bind(&new.storage_ref)
        .bind(&new.content_hash)
        .bind(new.available_rooms)
        .bind(new.is_seed)
        .bind(Self::now_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::constraint(format!(
                    "content hash already registered: {}",
                    new.content_hash
                ))
            } else {
                e.into()
            }
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Phase two: atomically flip PENDING -> PROCESSING, insert all day rows
    /// and mark the snapshot COMPLETED.
    ///
    /// Any failure (including a duplicate stay date within the file) rolls
    /// back rows and status together. This method never marks FAILED; that
    /// is the caller's decision.
    pub async fn snapshot_commit_rows(&self, snapshot_id: i64, rows: &[RowDraft]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query("SELECT hotel_id, status FROM rs_snapshots WHERE id = ?")
            .bind(snapshot_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(header) = header else {
            tx.rollback().await?;
            return Err(DbError::not_found(format!("snapshot {snapshot_id}")));
        };

        let hotel_id: i64 = header.get("hotel_id");
        let status_str: String = header.get("status");
        let status = SnapshotStatus::parse(&status_str).ok_or_else(|| {
            DbError::invalid_state(format!("unknown snapshot status: {status_str}"))
        })?;

        if status != SnapshotStatus::Pending {
            tx.rollback().await?;
            return Err(DbError::invalid_state(format!(
                "snapshot {snapshot_id} is {status}, expected PENDING"
            )));
        }

        let claimed =
            sqlx::query("UPDATE rs_snapshots SET status = 'PROCESSING' WHERE id = ? AND status = 'PENDING'")
                .bind(snapshot_id)
                .execute(&mut *tx)
                .await?;
        if claimed.rows_affected() != 1 {
            tx.rollback().await?;
            return Err(DbError::invalid_state(format!(
                "snapshot {snapshot_id} was claimed concurrently"
            )));
        }

        for draft in rows {
            sqlx::query(
                r#"
                INSERT INTO rs_snapshot_rows
                    (snapshot_id, hotel_id, stay_date, kind, raw_values,
                     room_nights, room_revenue, out_of_order,
                     occupancy_pct, adr, revpar, row_index)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(snapshot_id)
            .bind(hotel_id)
            .bind(draft.stay_date.to_string())
            .bind(draft.kind.as_str())
            .bind(raw_values_to_json(&draft.raw_values)?)
            .bind(draft.room_nights)
            .bind(draft.room_revenue)
            .bind(draft.out_of_order)
            .bind(draft.occupancy_pct)
            .bind(draft.adr)
            .bind(draft.revpar)
            .bind(draft.row_index)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::constraint(format!(
                        "duplicate day {} {} in snapshot {snapshot_id}",
                        draft.stay_date, draft.kind
                    ))
                } else {
                    e.into()
                }
            })?;
        }

        sqlx::query(
            "UPDATE rs_snapshots SET status = 'COMPLETED', row_count = ?, error_message = NULL WHERE id = ?",
        )
        .bind(rows.len() as i64)
        .bind(snapshot_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Mark a non-terminal snapshot FAILED with an operator-facing message.
    pub async fn snapshot_mark_failed(&self, id: i64, error: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE rs_snapshots SET
                status = 'FAILED',
                error_message = ?
            WHERE id = ? AND status IN ('PENDING', 'PROCESSING')
            "#,
        )
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::invalid_state(format!(
                "snapshot {id} is missing or already terminal"
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Get a snapshot by ID.
    pub async fn snapshot_get(&self, id: i64) -> Result<Option<Snapshot>> {
        let row = sqlx::query("SELECT * FROM rs_snapshots WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_snapshot(&row)?)),
            None => Ok(None),
        }
    }

    /// Whether any snapshot (in any state) already carries this content hash.
    pub async fn snapshot_hash_exists(&self, content_hash: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM rs_snapshots WHERE content_hash = ? LIMIT 1")
            .bind(content_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// List snapshots with optional filters, newest business time first.
    pub async fn snapshot_list(&self, filter: SnapshotFilter) -> Result<Vec<Snapshot>> {
        let mut sql = String::from("SELECT * FROM rs_snapshots WHERE 1=1");

        if let Some(hotel_id) = filter.hotel_id {
            sql.push_str(&format!(" AND hotel_id = {hotel_id}"));
        }
        if let Some(status) = filter.status {
            sql.push_str(&format!(" AND status = '{}'", status.as_str()));
        }
        if filter.seed_only {
            sql.push_str(" AND is_seed = 1");
        }

        sql.push_str(" ORDER BY taken_at DESC, id DESC");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_snapshot).collect()
    }

    /// The hotel's committed seed snapshot, if any.
    ///
    /// When more than one seed slipped in, the chronologically earliest wins.
    pub async fn snapshot_seed_for_hotel(&self, hotel_id: i64) -> Result<Option<Snapshot>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM rs_snapshots
            WHERE hotel_id = ? AND is_seed = 1 AND status = 'COMPLETED'
            ORDER BY taken_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_snapshot(&row)?)),
            None => Ok(None),
        }
    }

    /// Whether the hotel already has a live (non-FAILED) seed.
    ///
    /// A FAILED seed attempt does not block a retry.
    pub async fn hotel_has_seed(&self, hotel_id: i64) -> Result<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM rs_snapshots WHERE hotel_id = ? AND is_seed = 1 AND status != 'FAILED' LIMIT 1",
        )
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Registry-wide statistics.
    pub async fn registry_stats(&self) -> Result<RegistryStats> {
        let hotels = sqlx::query(
            "SELECT COUNT(*) as total, SUM(CASE WHEN active = 1 THEN 1 ELSE 0 END) as active FROM rs_hotels",
        )
        .fetch_one(&self.pool)
        .await?;

        let snapshots = sqlx::query(
            r#"
            SELECT
                COUNT(*) as total,
                SUM(CASE WHEN status = 'PENDING' THEN 1 ELSE 0 END) as pending,
                SUM(CASE WHEN status = 'PROCESSING' THEN 1 ELSE 0 END) as processing,
                SUM(CASE WHEN status = 'COMPLETED' THEN 1 ELSE 0 END) as completed,
                SUM(CASE WHEN status = 'FAILED' THEN 1 ELSE 0 END) as failed,
                SUM(CASE WHEN is_seed = 1 THEN 1 ELSE 0 END) as seeds
            FROM rs_snapshots
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query("SELECT COUNT(*) as total FROM rs_snapshot_rows")
            .fetch_one(&self.pool)
            .await?;

        let mail = sqlx::query("SELECT COUNT(*) as total FROM rs_processed_mail")
            .fetch_one(&self.pool)
            .await?;

        Ok(RegistryStats {
            hotels: hotels.get::<i64, _>("total") as u64,
            active_hotels: hotels.get::<Option<i64>, _>("active").unwrap_or(0) as u64,
            snapshots: snapshots.get::<i64, _>("total") as u64,
            pending: snapshots.get::<Option<i64>, _>("pending").unwrap_or(0) as u64,
            processing: snapshots.get::<Option<i64>, _>("processing").unwrap_or(0) as u64,
            completed: snapshots.get::<Option<i64>, _>("completed").unwrap_or(0) as u64,
            failed: snapshots.get::<Option<i64>, _>("failed").unwrap_or(0) as u64,
            seeds: snapshots.get::<Option<i64>, _>("seeds").unwrap_or(0) as u64,
            rows: rows.get::<i64, _>("total") as u64,
            processed_mail: mail.get::<i64, _>("total") as u64,
        })
    }
}

pub(crate) fn row_to_snapshot(row: &sqlx::sqlite::SqliteRow) -> Result<Snapshot> {
    let status_str: String = row.get("status");
    let status = SnapshotStatus::parse(&status_str).ok_or_else(|| {
        DbError::invalid_state(format!("unknown snapshot status: {status_str}"))
    })?;

    Ok(Snapshot {
        id: row.get("id"),
        hotel_id: row.get("hotel_id"),
        taken_at: RevsnapDb::millis_to_datetime(row.get("taken_at")),
        filename: row.get("filename"),
        storage_ref: row.get("storage_ref"),
        content_hash: row.get("content_hash"),
        available_rooms: row.get("available_rooms"),
        is_seed: row.get("is_seed"),
        status,
        error_message: row.get("error_message"),
        row_count: row.get("row_count"),
        created_at: RevsnapDb::millis_to_datetime(row.get("created_at")),
    })
}

/// Filter for listing snapshots.
#[derive(Debug, Clone, Default)]
pub struct SnapshotFilter {
    pub hotel_id: Option<i64>,
    pub status: Option<SnapshotStatus>,
    pub seed_only: bool,
    pub limit: Option<usize>,
}

/// Registry statistics.
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    pub hotels: u64,
    pub active_hotels: u64,
    pub snapshots: u64,
    pub pending: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
    pub seeds: u64,
    pub rows: u64,
    pub processed_mail: u64,
}
