//! Snapshot row operations.

use crate::error::{DbError, Result};
use crate::RevsnapDb;
use chrono::NaiveDate;
use revsnap_core::record::{raw_values_from_json, raw_values_to_json};
use revsnap_core::{RowDraft, RowKind, SnapshotRow};
use sqlx::Row;

impl RevsnapDb {
    /// All rows of a snapshot in file order.
    pub async fn rows_for_snapshot(&self, snapshot_id: i64) -> Result<Vec<SnapshotRow>> {
        let rows = sqlx::query(
            "SELECT * FROM rs_snapshot_rows WHERE snapshot_id = ? ORDER BY row_index ASC",
        )
        .bind(snapshot_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_snapshot_row).collect()
    }

    /// HISTORY rows of a snapshot in file order.
    pub async fn history_rows_for_snapshot(&self, snapshot_id: i64) -> Result<Vec<SnapshotRow>> {
        let rows = sqlx::query(
            "SELECT * FROM rs_snapshot_rows WHERE snapshot_id = ? AND kind = 'HISTORY' ORDER BY row_index ASC",
        )
        .bind(snapshot_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_snapshot_row).collect()
    }

    /// Overwrite matching seed rows with fresher settled figures.
    ///
    /// Updates are keyed on (stay date, kind); days the seed does not contain
    /// are ignored. Returns how many rows changed. All updates ride one
    /// transaction so a partial overlay never becomes visible.
    pub async fn seed_rows_overwrite(
        &self,
        seed_snapshot_id: i64,
        rows: &[RowDraft],
    ) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut updated = 0u64;

        for draft in rows {
            let result = sqlx::query(
                r#"
                UPDATE rs_snapshot_rows SET
                    raw_values = ?,
                    room_nights = ?,
                    room_revenue = ?,
                    out_of_order = ?,
                    occupancy_pct = ?,
                    adr = ?,
                    revpar = ?
                WHERE snapshot_id = ? AND stay_date = ? AND kind = ?
                "#,
            )
            .bind(raw_values_to_json(&draft.raw_values)?)
            .bind(draft.room_nights)
            .bind(draft.room_revenue)
            .bind(draft.out_of_order)
            .bind(draft.occupancy_pct)
            .bind(draft.adr)
            .bind(draft.revpar)
            .bind(seed_snapshot_id)
            .bind(draft.stay_date.to_string())
            .bind(draft.kind.as_str())
            .execute(&mut *tx)
            .await?;

            updated += result.rows_affected();
        }

        tx.commit().await?;
        Ok(updated)
    }
}

fn row_to_snapshot_row(row: &sqlx::sqlite::SqliteRow) -> Result<SnapshotRow> {
    let date_str: String = row.get("stay_date");
    let stay_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| DbError::invalid_state(format!("bad stay_date '{date_str}': {e}")))?;

    let kind_str: String = row.get("kind");
    let kind = RowKind::parse(&kind_str)
        .ok_or_else(|| DbError::invalid_state(format!("unknown row kind: {kind_str}")))?;

    let raw_json: String = row.get("raw_values");
    let raw_values = raw_values_from_json(&raw_json)?;

    Ok(SnapshotRow {
        id: row.get("id"),
        snapshot_id: row.get("snapshot_id"),
        hotel_id: row.get("hotel_id"),
        stay_date,
        kind,
        raw_values,
        room_nights: row.get("room_nights"),
        room_revenue: row.get("room_revenue"),
        out_of_order: row.get("out_of_order"),
        occupancy_pct: row.get("occupancy_pct"),
        adr: row.get("adr"),
        revpar: row.get("revpar"),
        row_index: row.get("row_index"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use revsnap_core::record::{COL_RECORD_TYPE, COL_STAY_DATE, RETAINED_COLUMNS};
    use revsnap_core::{DerivedMetrics, NewHotel, NewSnapshot};
    use tempfile::TempDir;

    async fn seeded_db(tmp: &TempDir) -> (RevsnapDb, i64, i64) {
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let hotel_id = db
            .hotel_create(&NewHotel {
                name: "Harbour View".to_string(),
                email: "reports@harbourview.example".to_string(),
                available_rooms: 120,
            })
            .await
            .unwrap();
        let snapshot_id = db
            .snapshot_register(&NewSnapshot {
                hotel_id,
                taken_at: RevsnapDb::millis_to_datetime(1_000),
                filename: "seed.tsv".to_string(),
                storage_ref: "blobs/seed".to_string(),
                content_hash: "seedhash".to_string(),
                available_rooms: 120,
                is_seed: true,
            })
            .await
            .unwrap();
        (db, hotel_id, snapshot_id)
    }

    fn draft(day: u32, kind: RowKind, rooms: f64, revenue: f64, idx: i64) -> RowDraft {
        let metrics = DerivedMetrics::derive(rooms, revenue, 120);
        let mut raw_values = vec![String::new(); RETAINED_COLUMNS];
        raw_values[COL_RECORD_TYPE] = kind.to_string();
        raw_values[COL_STAY_DATE] = format!("{day:02}/11/25");
        RowDraft {
            stay_date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            kind,
            raw_values,
            room_nights: rooms,
            room_revenue: revenue,
            out_of_order: 0.0,
            occupancy_pct: metrics.occupancy_pct,
            adr: metrics.adr,
            revpar: metrics.revpar,
            row_index: idx,
        }
    }

    #[tokio::test]
    async fn test_rows_roundtrip_raw_values() {
        let tmp = TempDir::new().unwrap();
        let (db, _, snapshot_id) = seeded_db(&tmp).await;

        let mut d = draft(1, RowKind::History, 45.0, 12500.0, 0);
        d.raw_values[5] = "1,250.00".to_string();
        db.snapshot_commit_rows(snapshot_id, &[d.clone()]).await.unwrap();

        let stored = db.rows_for_snapshot(snapshot_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].raw_values, d.raw_values);
        assert_eq!(stored[0].stay_date, d.stay_date);
        assert_eq!(stored[0].adr, 277.78);
    }

    #[tokio::test]
    async fn test_history_filter() {
        let tmp = TempDir::new().unwrap();
        let (db, _, snapshot_id) = seeded_db(&tmp).await;

        db.snapshot_commit_rows(
            snapshot_id,
            &[
                draft(1, RowKind::History, 45.0, 12500.0, 0),
                draft(2, RowKind::Forecast, 30.0, 6000.0, 1),
                draft(3, RowKind::History, 50.0, 14000.0, 2),
            ],
        )
        .await
        .unwrap();

        let history = db.history_rows_for_snapshot(snapshot_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|r| r.kind == RowKind::History));
        assert_eq!(history[0].row_index, 0);
        assert_eq!(history[1].row_index, 2);
    }

    #[tokio::test]
    async fn test_seed_overwrite_updates_only_matching_days() {
        let tmp = TempDir::new().unwrap();
        let (db, _, snapshot_id) = seeded_db(&tmp).await;

        db.snapshot_commit_rows(
            snapshot_id,
            &[
                draft(1, RowKind::History, 40.0, 10000.0, 0),
                draft(2, RowKind::History, 41.0, 10100.0, 1),
            ],
        )
        .await
        .unwrap();

        let overlay = vec![
            draft(2, RowKind::History, 55.0, 16000.0, 0),
            draft(9, RowKind::History, 60.0, 17000.0, 1),
        ];
        let updated = db.seed_rows_overwrite(snapshot_id, &overlay).await.unwrap();
        assert_eq!(updated, 1);

        let stored = db.rows_for_snapshot(snapshot_id).await.unwrap();
        assert_eq!(stored[0].room_nights, 40.0);
        assert_eq!(stored[1].room_nights, 55.0);
        assert_eq!(stored[1].adr, DerivedMetrics::derive(55.0, 16000.0, 120).adr);
    }

    #[tokio::test]
    async fn test_seed_overwrite_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let (db, _, snapshot_id) = seeded_db(&tmp).await;

        db.snapshot_commit_rows(snapshot_id, &[draft(1, RowKind::History, 40.0, 10000.0, 0)])
            .await
            .unwrap();

        let overlay = vec![draft(1, RowKind::History, 55.0, 16000.0, 0)];
        db.seed_rows_overwrite(snapshot_id, &overlay).await.unwrap();
        let first = db.rows_for_snapshot(snapshot_id).await.unwrap();

        db.seed_rows_overwrite(snapshot_id, &overlay).await.unwrap();
        let second = db.rows_for_snapshot(snapshot_id).await.unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].raw_values, second[0].raw_values);
        assert_eq!(first[0].room_nights, second[0].room_nights);
        assert_eq!(first[0].adr, second[0].adr);
    }
}
