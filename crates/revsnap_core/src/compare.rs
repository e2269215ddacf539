//! Comparison payloads exchanged between the engine and its callers.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::metrics::round2;
use crate::model::Snapshot;

/// Which source pair a comparison runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Latest two periodic snapshots.
    Pickup,
    /// Seed actuals against a chosen snapshot.
    Actuals,
    /// Same time last year against the latest snapshot.
    Stly,
}

impl CompareMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareMode::Pickup => "pickup",
            CompareMode::Actuals => "actuals",
            CompareMode::Stly => "stly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pickup" => Some(CompareMode::Pickup),
            "actuals" => Some(CompareMode::Actuals),
            "stly" => Some(CompareMode::Stly),
            _ => None,
        }
    }
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side's figures for a date or an aggregation bucket.
///
/// `adr` is always this side's own revenue-over-rooms ratio, computed from
/// the bucket totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideFigures {
    pub room_nights: f64,
    pub room_revenue: f64,
    pub adr: f64,
}

impl SideFigures {
    pub fn from_totals(room_nights: f64, room_revenue: f64) -> Self {
        let adr = if room_nights != 0.0 {
            room_revenue / room_nights
        } else {
            0.0
        };
        Self {
            room_nights: round2(room_nights),
            room_revenue: round2(room_revenue),
            adr: round2(adr),
        }
    }

    pub fn zero() -> Self {
        Self {
            room_nights: 0.0,
            room_revenue: 0.0,
            adr: 0.0,
        }
    }
}

/// Presentation classification of a signed delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Up
        } else if delta < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }
}

/// A signed difference plus its classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub value: f64,
    pub direction: Direction,
}

impl Delta {
    pub fn of(value: f64) -> Self {
        let value = round2(value);
        // Fold -0.0 so a flat delta prints without a sign.
        let value = if value == 0.0 { 0.0 } else { value };
        Self {
            value,
            direction: Direction::of(value),
        }
    }
}

/// The pickup triple between a baseline and a current side.
///
/// The ADR delta is the difference of the two sides' own ratios, never a
/// ratio of summed deltas or an average of ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickup {
    pub room_nights: Delta,
    pub room_revenue: Delta,
    pub adr: Delta,
}

impl Pickup {
    pub fn between(baseline: &SideFigures, current: &SideFigures) -> Self {
        Self {
            room_nights: Delta::of(current.room_nights - baseline.room_nights),
            room_revenue: Delta::of(current.room_revenue - baseline.room_revenue),
            adr: Delta::of(current.adr - baseline.adr),
        }
    }
}

/// Per-stay-date comparison line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayComparison {
    pub stay_date: NaiveDate,
    pub baseline: SideFigures,
    pub current: SideFigures,
    pub pickup: Pickup,
}

/// Per-calendar-month aggregation, also used for the month-to-date bucket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthComparison {
    pub year: i32,
    pub month: u32,
    pub baseline: SideFigures,
    pub current: SideFigures,
    pub pickup: Pickup,
}

/// The snapshot identity behind one comparison side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    pub id: i64,
    pub taken_at: DateTime<Utc>,
    pub filename: String,
    pub is_seed: bool,
    pub row_count: i64,
}

impl From<&Snapshot> for SnapshotMeta {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            id: snapshot.id,
            taken_at: snapshot.taken_at,
            filename: snapshot.filename.clone(),
            is_seed: snapshot.is_seed,
            row_count: snapshot.row_count,
        }
    }
}

/// The full structured payload of one comparison run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub hotel_id: i64,
    pub hotel_name: String,
    pub mode: CompareMode,
    pub as_of: NaiveDate,
    pub baseline: SnapshotMeta,
    pub current: SnapshotMeta,
    pub daily: Vec<DayComparison>,
    pub monthly: Vec<MonthComparison>,
    pub month_to_date: Option<MonthComparison>,
}
