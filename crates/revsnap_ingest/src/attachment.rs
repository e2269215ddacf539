//! Single-attachment ingestion: gate, store, register, parse, commit.

use chrono::{DateTime, Utc};
use revsnap_core::{sha256_hex, Hotel, NewSnapshot, RowDraft};
use revsnap_db::{DbError, RevsnapDb};
use revsnap_parse::{business_time_from_filename, parse_report};
use revsnap_storage::BlobStore;
use tracing::{info, warn};

use crate::error::{IngestError, Result};

/// What happened to one attachment.
#[derive(Debug)]
pub enum IngestOutcome {
    /// A new COMPLETED snapshot, with the rows that went into it.
    Committed {
        snapshot_id: i64,
        rows: Vec<RowDraft>,
    },
    /// The exact bytes were ingested before; nothing was written.
    Duplicate { content_hash: String },
}

/// Run one attachment through the full ingestion path.
///
/// The dedup gate is a pure read; the original bytes are stored before any
/// parsing so FAILED snapshots can still be inspected. The business time
/// comes from an epoch token in the filename when present, otherwise from
/// `fallback_time`. A parse or commit failure marks the snapshot FAILED and
/// surfaces as [`IngestError::SnapshotFailed`].
pub async fn ingest_attachment(
    db: &RevsnapDb,
    blobs: &impl BlobStore,
    hotel: &Hotel,
    filename: &str,
    bytes: &[u8],
    fallback_time: DateTime<Utc>,
    is_seed: bool,
) -> Result<IngestOutcome> {
    let content_hash = sha256_hex(bytes);

    if db.snapshot_hash_exists(&content_hash).await? {
        return Ok(IngestOutcome::Duplicate { content_hash });
    }

    let stored = blobs.put(hotel.id, filename, bytes).await?;

    let taken_at = business_time_from_filename(filename).unwrap_or(fallback_time);

    let snapshot_id = match db
        .snapshot_register(&NewSnapshot {
            hotel_id: hotel.id,
            taken_at,
            filename: filename.to_string(),
            storage_ref: stored.storage_ref,
            content_hash: content_hash.clone(),
            available_rooms: hotel.available_rooms,
            is_seed,
        })
        .await
    {
        Ok(id) => id,
        // Another writer registered the same bytes between gate and insert.
        Err(DbError::Constraint(_)) => {
            return Ok(IngestOutcome::Duplicate { content_hash });
        }
        Err(err) => return Err(err.into()),
    };

    let rows = match parse_report(bytes, hotel.available_rooms) {
        Ok(rows) => rows,
        Err(err) => {
            return Err(fail_snapshot(db, snapshot_id, err.to_string()).await);
        }
    };

    if let Err(err) = db.snapshot_commit_rows(snapshot_id, &rows).await {
        return Err(fail_snapshot(db, snapshot_id, err.to_string()).await);
    }

    info!(
        hotel_id = hotel.id,
        snapshot_id,
        filename,
        row_count = rows.len(),
        is_seed,
        "snapshot committed"
    );

    Ok(IngestOutcome::Committed { snapshot_id, rows })
}

async fn fail_snapshot(db: &RevsnapDb, snapshot_id: i64, reason: String) -> IngestError {
    if let Err(mark_err) = db.snapshot_mark_failed(snapshot_id, &reason).await {
        warn!(
            snapshot_id,
            error = %mark_err,
            "could not mark snapshot FAILED"
        );
    }
    IngestError::SnapshotFailed {
        id: snapshot_id,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{hotel_fixture, report_line};
    use revsnap_core::SnapshotStatus;
    use revsnap_storage::MemoryBlobStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_commit_path() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let blobs = MemoryBlobStore::new();
        let hotel = hotel_fixture(&db).await;

        let report = [
            report_line("History", "01/11/25 Sat", "45", "12500.00"),
            report_line("Forecast", "02/11/25 Sun", "30", "6000.00"),
        ]
        .join("\n");

        let outcome = ingest_attachment(
            &db,
            &blobs,
            &hotel,
            "fc_1731283200.tsv",
            report.as_bytes(),
            Utc::now(),
            false,
        )
        .await
        .unwrap();

        let IngestOutcome::Committed { snapshot_id, rows } = outcome else {
            panic!("expected committed outcome");
        };
        assert_eq!(rows.len(), 2);

        let snap = db.snapshot_get(snapshot_id).await.unwrap().unwrap();
        assert_eq!(snap.status, SnapshotStatus::Completed);
        assert_eq!(snap.row_count, 2);
        // Business time taken from the filename token, not from wall clock.
        assert_eq!(snap.taken_at.timestamp(), 1_731_283_200);
        assert!(blobs.get(&snap.storage_ref).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_bytes_short_circuit() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let blobs = MemoryBlobStore::new();
        let hotel = hotel_fixture(&db).await;

        let report = report_line("History", "01/11/25 Sat", "45", "12500.00");
        let first = ingest_attachment(&db, &blobs, &hotel, "a.tsv", report.as_bytes(), Utc::now(), false)
            .await
            .unwrap();
        assert!(matches!(first, IngestOutcome::Committed { .. }));

        let second = ingest_attachment(&db, &blobs, &hotel, "b.tsv", report.as_bytes(), Utc::now(), false)
            .await
            .unwrap();
        assert!(matches!(second, IngestOutcome::Duplicate { .. }));

        let stats = db.registry_stats().await.unwrap();
        assert_eq!(stats.snapshots, 1);
    }

    #[tokio::test]
    async fn test_unparseable_file_marks_snapshot_failed() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let blobs = MemoryBlobStore::new();
        let hotel = hotel_fixture(&db).await;

        let bytes = vec![0xff, 0xfe, 0x41];
        let err = ingest_attachment(&db, &blobs, &hotel, "bad.tsv", &bytes, Utc::now(), false)
            .await
            .unwrap_err();

        let IngestError::SnapshotFailed { id, reason } = err else {
            panic!("expected snapshot failure");
        };
        assert!(reason.contains("UTF-8"));

        let snap = db.snapshot_get(id).await.unwrap().unwrap();
        assert_eq!(snap.status, SnapshotStatus::Failed);
        assert_eq!(snap.error_message.as_deref(), Some(reason.as_str()));
        // The raw bytes were stored before parsing was attempted.
        assert_eq!(blobs.get(&snap.storage_ref).await.unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_duplicate_day_in_file_marks_snapshot_failed() {
        let tmp = TempDir::new().unwrap();
        let db = RevsnapDb::open(tmp.path().join("registry.db")).await.unwrap();
        let blobs = MemoryBlobStore::new();
        let hotel = hotel_fixture(&db).await;

        let report = [
            report_line("History", "01/11/25 Sat", "45", "12500.00"),
            report_line("History", "01/11/25 Sat", "46", "12600.00"),
        ]
        .join("\n");

        let err = ingest_attachment(&db, &blobs, &hotel, "dup.tsv", report.as_bytes(), Utc::now(), false)
            .await
            .unwrap_err();
        let IngestError::SnapshotFailed { id, .. } = err else {
            panic!("expected snapshot failure");
        };

        let snap = db.snapshot_get(id).await.unwrap().unwrap();
        assert_eq!(snap.status, SnapshotStatus::Failed);
        assert!(db.rows_for_snapshot(id).await.unwrap().is_empty());
    }
}
