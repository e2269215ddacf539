//! Source-pair queries for the comparison engine.
//!
//! Comparisons only ever read COMPLETED periodic snapshots; seeds are
//! resolved separately through `snapshot_seed_for_hotel`.

use crate::error::Result;
use crate::snapshots::row_to_snapshot;
use crate::RevsnapDb;
use chrono::{DateTime, Duration, Utc};
use revsnap_core::Snapshot;

impl RevsnapDb {
    /// Latest COMPLETED periodic snapshots, newest business time first.
    /// Seeds are excluded.
    pub async fn snapshot_latest_completed(
        &self,
        hotel_id: i64,
        limit: usize,
    ) -> Result<Vec<Snapshot>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM rs_snapshots
            WHERE hotel_id = ? AND is_seed = 0 AND status = 'COMPLETED'
            ORDER BY taken_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(hotel_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_snapshot).collect()
    }

    /// The COMPLETED periodic snapshot whose business time lies closest to
    /// `center`, searched within `+/- window`. Seeds are excluded.
    pub async fn snapshot_nearest(
        &self,
        hotel_id: i64,
        center: DateTime<Utc>,
        window: Duration,
    ) -> Result<Option<Snapshot>> {
        let center_millis = center.timestamp_millis();
        let lo = (center - window).timestamp_millis();
        let hi = (center + window).timestamp_millis();

        let row = sqlx::query(
            r#"
            SELECT * FROM rs_snapshots
            WHERE hotel_id = ? AND is_seed = 0 AND status = 'COMPLETED'
              AND taken_at BETWEEN ? AND ?
            ORDER BY ABS(taken_at - ?) ASC, id DESC
            LIMIT 1
            "#,
        )
        .bind(hotel_id)
        .bind(lo)
        .bind(hi)
        .bind(center_millis)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_snapshot(&row)?)),
            None => Ok(None),
        }
    }
}
