//! Source-pair resolution for the three comparison modes.

use chrono::{Duration, Months, NaiveDate, NaiveTime, Utc};
use revsnap_core::{CompareMode, ComparisonReport, Hotel, Snapshot, SnapshotMeta, SnapshotStatus};
use revsnap_db::RevsnapDb;
use tracing::debug;

use crate::engine;
use crate::error::{CompareError, Result};

/// How far a year-ago snapshot may drift from the exact target date.
const STLY_WINDOW_DAYS: i64 = 7;

/// One comparison request, mirroring the exposed `compare` operation.
#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub hotel_id: i64,
    pub mode: CompareMode,
    pub snapshot_a: Option<i64>,
    pub snapshot_b: Option<i64>,
    pub as_of: Option<NaiveDate>,
}

/// Resolve the mode's source pair and build the comparison payload.
///
/// Whenever two explicit snapshot ids arrive, the chronologically earlier
/// one becomes the baseline regardless of argument order.
pub async fn compare(db: &RevsnapDb, request: &CompareRequest) -> Result<ComparisonReport> {
    let hotel = db
        .hotel_get(request.hotel_id)
        .await?
        .ok_or(CompareError::HotelNotFound(request.hotel_id))?;

    let as_of = request.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let (baseline, current) = match request.mode {
        CompareMode::Pickup => resolve_pickup(db, &hotel, request).await?,
        CompareMode::Actuals => resolve_actuals(db, &hotel, request).await?,
        CompareMode::Stly => resolve_stly(db, &hotel, as_of).await?,
    };
    debug!(
        hotel_id = hotel.id,
        mode = %request.mode,
        baseline = baseline.id,
        current = current.id,
        "comparison sources resolved"
    );

    let baseline_rows = db.rows_for_snapshot(baseline.id).await?;
    // In actuals mode the current side is the seed, and only its settled
    // HISTORY rows count as actuals.
    let current_rows = if request.mode == CompareMode::Actuals {
        db.history_rows_for_snapshot(current.id).await?
    } else {
        db.rows_for_snapshot(current.id).await?
    };

    let tables = engine::build_tables(&baseline_rows, &current_rows, as_of);

    Ok(ComparisonReport {
        hotel_id: hotel.id,
        hotel_name: hotel.name,
        mode: request.mode,
        as_of,
        baseline: SnapshotMeta::from(&baseline),
        current: SnapshotMeta::from(&current),
        daily: tables.daily,
        monthly: tables.monthly,
        month_to_date: tables.month_to_date,
    })
}

async fn resolve_pickup(
    db: &RevsnapDb,
    hotel: &Hotel,
    request: &CompareRequest,
) -> Result<(Snapshot, Snapshot)> {
    match (request.snapshot_a, request.snapshot_b) {
        (Some(a), Some(b)) => {
            let first = load_completed(db, hotel, a).await?;
            let second = load_completed(db, hotel, b).await?;
            Ok(order_chronologically(first, second))
        }
        (Some(id), None) | (None, Some(id)) => {
            let explicit = load_completed(db, hotel, id).await?;
            let other = db
                .snapshot_latest_completed(hotel.id, 2)
                .await?
                .into_iter()
                .find(|s| s.id != explicit.id)
                .ok_or_else(|| {
                    CompareError::InsufficientData(format!(
                        "hotel {} has no other completed snapshot to compare against",
                        hotel.id
                    ))
                })?;
            Ok(order_chronologically(explicit, other))
        }
        (None, None) => {
            let mut latest = db.snapshot_latest_completed(hotel.id, 2).await?;
            if latest.len() < 2 {
                return Err(CompareError::InsufficientData(format!(
                    "hotel {} needs at least two completed snapshots for pickup",
                    hotel.id
                )));
            }
            let current = latest.remove(0);
            let baseline = latest.remove(0);
            Ok((baseline, current))
        }
    }
}

async fn resolve_actuals(
    db: &RevsnapDb,
    hotel: &Hotel,
    request: &CompareRequest,
) -> Result<(Snapshot, Snapshot)> {
    let seed = db.snapshot_seed_for_hotel(hotel.id).await?.ok_or_else(|| {
        CompareError::InsufficientData(format!("hotel {} has no seed snapshot", hotel.id))
    })?;

    let chosen = match request.snapshot_a.or(request.snapshot_b) {
        Some(id) => load_completed(db, hotel, id).await?,
        None => latest_completed_one(db, hotel).await?,
    };

    Ok((chosen, seed))
}

async fn resolve_stly(
    db: &RevsnapDb,
    hotel: &Hotel,
    as_of: NaiveDate,
) -> Result<(Snapshot, Snapshot)> {
    let current = latest_completed_one(db, hotel).await?;

    let target = as_of - Months::new(12);
    let center = target.and_time(NaiveTime::MIN).and_utc();
    let baseline = db
        .snapshot_nearest(hotel.id, center, Duration::days(STLY_WINDOW_DAYS))
        .await?
        .ok_or_else(|| {
            CompareError::InsufficientData(format!(
                "hotel {} has no snapshot within {STLY_WINDOW_DAYS} days of {target}",
                hotel.id
            ))
        })?;

    if baseline.id == current.id {
        return Err(CompareError::InsufficientData(format!(
            "hotel {} has only one snapshot in the year-ago window; nothing to compare",
            hotel.id
        )));
    }

    Ok((baseline, current))
}

async fn latest_completed_one(db: &RevsnapDb, hotel: &Hotel) -> Result<Snapshot> {
    db.snapshot_latest_completed(hotel.id, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            CompareError::InsufficientData(format!(
                "hotel {} has no completed snapshots",
                hotel.id
            ))
        })
}

async fn load_completed(db: &RevsnapDb, hotel: &Hotel, snapshot_id: i64) -> Result<Snapshot> {
    let snapshot = db
        .snapshot_get(snapshot_id)
        .await?
        .ok_or(CompareError::SnapshotNotFound(snapshot_id))?;

    if snapshot.hotel_id != hotel.id {
        return Err(CompareError::WrongHotel {
            snapshot_id,
            hotel_id: hotel.id,
        });
    }
    if snapshot.status != SnapshotStatus::Completed {
        return Err(CompareError::NotCompleted {
            snapshot_id,
            status: snapshot.status,
        });
    }
    Ok(snapshot)
}

fn order_chronologically(a: Snapshot, b: Snapshot) -> (Snapshot, Snapshot) {
    if (b.taken_at, b.id) < (a.taken_at, a.id) {
        (b, a)
    } else {
        (a, b)
    }
}
