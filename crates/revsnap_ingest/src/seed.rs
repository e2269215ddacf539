//! Seed snapshots: the long-horizon baseline each hotel starts from.
//!
//! A seed is ingested once, outside the mail path, and afterwards serves as
//! the actuals side of comparisons. Periodic snapshots keep it honest: after
//! each commit the final stretch of settled HISTORY figures is overlaid onto
//! the matching seed days, so the baseline tracks reality as nights close
//! out.

use chrono::{NaiveDate, NaiveTime, Utc};
use revsnap_core::{RowDraft, RowKind, Snapshot};
use revsnap_db::{DbError, RevsnapDb};
use revsnap_storage::BlobStore;
use tracing::{debug, info, warn};

use crate::attachment::{ingest_attachment, IngestOutcome};
use crate::error::{IngestError, Result};

/// How many trailing HISTORY days of a committed snapshot are written back
/// over the seed. Figures older than a week are considered settled and stop
/// moving, so a longer tail would only rewrite identical values.
pub const SEED_OVERLAY_DAYS: usize = 7;

/// Ingest a hotel's one-off seed report.
///
/// Business time falls back to midnight UTC of `onboarding_date` when the
/// filename carries no epoch token, and to the wall clock when neither is
/// available. Fails with [`IngestError::SeedExists`] when the hotel already
/// has a live seed; a FAILED attempt does not count and may be retried.
pub async fn register_seed(
    db: &RevsnapDb,
    blobs: &impl BlobStore,
    hotel_id: i64,
    bytes: &[u8],
    filename: &str,
    onboarding_date: Option<NaiveDate>,
) -> Result<Snapshot> {
    let hotel = db
        .hotel_get(hotel_id)
        .await?
        .ok_or(IngestError::HotelNotFound(hotel_id))?;

    if db.hotel_has_seed(hotel_id).await? {
        return Err(IngestError::SeedExists(hotel_id));
    }

    let fallback_time = match onboarding_date {
        Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
        None => Utc::now(),
    };

    let outcome =
        ingest_attachment(db, blobs, &hotel, filename, bytes, fallback_time, true).await?;

    match outcome {
        IngestOutcome::Committed { snapshot_id, rows } => {
            info!(
                hotel_id,
                snapshot_id,
                row_count = rows.len(),
                "seed registered"
            );
            db.snapshot_get(snapshot_id)
                .await?
                .ok_or_else(|| DbError::not_found(format!("snapshot {snapshot_id}")).into())
        }
        IngestOutcome::Duplicate { content_hash } => {
            Err(IngestError::DuplicateContent(content_hash))
        }
    }
}

/// Write a committed snapshot's settled tail back over the hotel's seed.
///
/// Best effort by contract: the snapshot itself is already durable, so an
/// overlay problem is logged and swallowed rather than failing the cycle
/// that triggered it. Hotels without a seed are a no-op.
pub async fn apply_seed_overlay(db: &RevsnapDb, hotel_id: i64, rows: &[RowDraft]) {
    let tail = final_history_rows(rows);
    if tail.is_empty() {
        return;
    }

    match overlay_tail(db, hotel_id, &tail).await {
        Ok(Some(updated)) => {
            debug!(hotel_id, updated, days = tail.len(), "seed overlay applied");
        }
        Ok(None) => {
            debug!(hotel_id, "hotel has no seed; overlay skipped");
        }
        Err(err) => {
            warn!(hotel_id, error = %err, "seed overlay failed");
        }
    }
}

async fn overlay_tail(db: &RevsnapDb, hotel_id: i64, tail: &[RowDraft]) -> Result<Option<u64>> {
    let Some(seed) = db.snapshot_seed_for_hotel(hotel_id).await? else {
        return Ok(None);
    };
    let updated = db.seed_rows_overwrite(seed.id, tail).await?;
    Ok(Some(updated))
}

/// The last [`SEED_OVERLAY_DAYS`] HISTORY rows in file order.
fn final_history_rows(rows: &[RowDraft]) -> Vec<RowDraft> {
    let history: Vec<&RowDraft> = rows.iter().filter(|r| r.kind == RowKind::History).collect();
    let skip = history.len().saturating_sub(SEED_OVERLAY_DAYS);
    history.into_iter().skip(skip).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{history_report, hotel_fixture, hotel_with_email, parse_fixture_report};
    use chrono::{Datelike, TimeZone};
    use revsnap_core::SnapshotStatus;
    use revsnap_storage::MemoryBlobStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_register_seed_uses_onboarding_midnight() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let blobs = MemoryBlobStore::new();
        let hotel = hotel_fixture(&db).await;

        let report = history_report(1, 10, 40);
        let onboarding = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let seed = register_seed(&db, &blobs, hotel.id, report.as_bytes(), "seed.tsv", Some(onboarding))
            .await
            .unwrap();

        assert!(seed.is_seed);
        assert_eq!(seed.status, SnapshotStatus::Completed);
        assert_eq!(seed.row_count, 10);
        assert_eq!(seed.taken_at, Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap());
        assert!(db.hotel_has_seed(hotel.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_register_seed_filename_token_wins() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let blobs = MemoryBlobStore::new();
        let hotel = hotel_fixture(&db).await;

        let report = history_report(1, 3, 40);
        let onboarding = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let seed = register_seed(
            &db,
            &blobs,
            hotel.id,
            report.as_bytes(),
            "seed_1731283200.tsv",
            Some(onboarding),
        )
        .await
        .unwrap();

        assert_eq!(seed.taken_at.timestamp(), 1_731_283_200);
        assert_eq!(seed.taken_at.year(), 2024);
    }

    #[tokio::test]
    async fn test_register_seed_rejects_second_seed() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let blobs = MemoryBlobStore::new();
        let hotel = hotel_fixture(&db).await;

        register_seed(&db, &blobs, hotel.id, history_report(1, 3, 40).as_bytes(), "a.tsv", None)
            .await
            .unwrap();
        let err = register_seed(&db, &blobs, hotel.id, history_report(4, 6, 40).as_bytes(), "b.tsv", None)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::SeedExists(id) if id == hotel.id));
    }

    #[tokio::test]
    async fn test_register_seed_rejects_known_bytes() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let blobs = MemoryBlobStore::new();
        let first = hotel_fixture(&db).await;
        let second = hotel_with_email(&db, "Seaview", "reports@seaview.example").await;

        let report = history_report(1, 3, 40);
        register_seed(&db, &blobs, first.id, report.as_bytes(), "a.tsv", None)
            .await
            .unwrap();
        let err = register_seed(&db, &blobs, second.id, report.as_bytes(), "b.tsv", None)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::DuplicateContent(_)));
    }

    #[tokio::test]
    async fn test_register_seed_unknown_hotel() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let blobs = MemoryBlobStore::new();

        let err = register_seed(&db, &blobs, 404, b"x", "a.tsv", None).await.unwrap_err();
        assert!(matches!(err, IngestError::HotelNotFound(404)));
    }

    #[tokio::test]
    async fn test_register_seed_failed_attempt_can_retry() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let blobs = MemoryBlobStore::new();
        let hotel = hotel_fixture(&db).await;

        let err = register_seed(&db, &blobs, hotel.id, &[0xff, 0xfe], "bad.tsv", None)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::SnapshotFailed { .. }));
        assert!(!db.hotel_has_seed(hotel.id).await.unwrap());

        let seed = register_seed(&db, &blobs, hotel.id, history_report(1, 3, 40).as_bytes(), "good.tsv", None)
            .await
            .unwrap();
        assert_eq!(seed.status, SnapshotStatus::Completed);
    }

    #[tokio::test]
    async fn test_overlay_takes_final_week_and_matches_days() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let blobs = MemoryBlobStore::new();
        let hotel = hotel_fixture(&db).await;

        let seed = register_seed(&db, &blobs, hotel.id, history_report(1, 10, 40).as_bytes(), "seed.tsv", None)
            .await
            .unwrap();

        // Nine settled days; the overlay keeps only 8..=14 and the seed
        // only knows 1..=10, so exactly 8, 9 and 10 change.
        let fresh = parse_fixture_report(&history_report(6, 14, 90));
        apply_seed_overlay(&db, hotel.id, &fresh).await;

        let rows = db.rows_for_snapshot(seed.id).await.unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[4].room_nights, 45.0);
        assert_eq!(rows[6].room_nights, 47.0);
        assert_eq!(rows[7].room_nights, 98.0);
        assert_eq!(rows[8].room_nights, 99.0);
        assert_eq!(rows[9].room_nights, 100.0);
    }

    #[tokio::test]
    async fn test_overlay_without_seed_is_noop() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let hotel = hotel_fixture(&db).await;

        let fresh = parse_fixture_report(&history_report(1, 3, 90));
        apply_seed_overlay(&db, hotel.id, &fresh).await;

        let stats = db.registry_stats().await.unwrap();
        assert_eq!(stats.rows, 0);
    }

    #[tokio::test]
    async fn test_overlay_swallows_db_errors() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let hotel = hotel_fixture(&db).await;

        let fresh = parse_fixture_report(&history_report(1, 3, 90));
        let handle = db.clone();
        db.close().await;

        // Must neither panic nor error out.
        apply_seed_overlay(&handle, hotel.id, &fresh).await;
    }

    #[test]
    fn test_final_history_rows_filters_and_truncates() {
        let rows = parse_fixture_report(&[
            history_report(1, 9, 40),
            crate::testkit::report_line("Forecast", "20/11/25 Thu", "30", "6000.00"),
        ]
        .join("\n"));
        assert_eq!(rows.len(), 10);

        let tail = final_history_rows(&rows);
        assert_eq!(tail.len(), SEED_OVERLAY_DAYS);
        assert!(tail.iter().all(|r| r.kind == RowKind::History));
        assert_eq!(tail[0].stay_date.day(), 3);
        assert_eq!(tail[6].stay_date.day(), 9);
    }
}
