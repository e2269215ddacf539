//! Pure pickup computation over two row sets keyed by stay date.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use revsnap_core::{DayComparison, MonthComparison, Pickup, RowKind, SideFigures, SnapshotRow};

pub(crate) struct Tables {
    pub daily: Vec<DayComparison>,
    pub monthly: Vec<MonthComparison>,
    pub month_to_date: Option<MonthComparison>,
}

/// Build all three aggregation levels for one baseline/current pair.
///
/// Dates are the union of both sides; a date one side lacks counts as zero
/// figures there, so a freshly added stay date shows up as pure pickup.
pub(crate) fn build_tables(
    baseline: &[SnapshotRow],
    current: &[SnapshotRow],
    as_of: NaiveDate,
) -> Tables {
    let base = figures_by_date(baseline);
    let curr = figures_by_date(current);

    Tables {
        daily: daily(&base, &curr),
        monthly: monthly(&base, &curr),
        month_to_date: month_to_date(&base, &curr, as_of),
    }
}

type Figures = BTreeMap<NaiveDate, (f64, f64)>;

/// Collapse rows to one (rooms, revenue) pair per stay date. When a date
/// carries both kinds, HISTORY wins: settled figures beat the forecast.
fn figures_by_date(rows: &[SnapshotRow]) -> Figures {
    let mut picked: BTreeMap<NaiveDate, &SnapshotRow> = BTreeMap::new();
    for row in rows {
        match picked.get(&row.stay_date) {
            Some(existing) if existing.kind == RowKind::History => {}
            _ => {
                picked.insert(row.stay_date, row);
            }
        }
    }

    picked
        .into_iter()
        .map(|(date, row)| (date, (row.room_nights, row.room_revenue)))
        .collect()
}

fn side_of(figures: Option<&(f64, f64)>) -> SideFigures {
    match figures {
        Some(&(rooms, revenue)) => SideFigures::from_totals(rooms, revenue),
        None => SideFigures::zero(),
    }
}

fn daily(base: &Figures, curr: &Figures) -> Vec<DayComparison> {
    let mut dates: Vec<NaiveDate> = base.keys().chain(curr.keys()).copied().collect();
    dates.sort_unstable();
    dates.dedup();

    dates
        .into_iter()
        .map(|stay_date| {
            let baseline = side_of(base.get(&stay_date));
            let current = side_of(curr.get(&stay_date));
            DayComparison {
                stay_date,
                baseline,
                current,
                pickup: Pickup::between(&baseline, &current),
            }
        })
        .collect()
}

fn month_totals(figures: &Figures) -> BTreeMap<(i32, u32), (f64, f64)> {
    let mut totals: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for (date, &(rooms, revenue)) in figures {
        let bucket = totals
            .entry((date.year(), date.month()))
            .or_insert((0.0, 0.0));
        bucket.0 += rooms;
        bucket.1 += revenue;
    }
    totals
}

/// Per-month aggregation. ADR per side is the ratio of that side's summed
/// revenue to its summed rooms, never an average of daily ratios.
fn monthly(base: &Figures, curr: &Figures) -> Vec<MonthComparison> {
    let base_months = month_totals(base);
    let curr_months = month_totals(curr);

    let mut keys: Vec<(i32, u32)> = base_months.keys().chain(curr_months.keys()).copied().collect();
    keys.sort_unstable();
    keys.dedup();

    keys.into_iter()
        .map(|(year, month)| {
            let baseline = side_of(base_months.get(&(year, month)));
            let current = side_of(curr_months.get(&(year, month)));
            MonthComparison {
                year,
                month,
                baseline,
                current,
                pickup: Pickup::between(&baseline, &current),
            }
        })
        .collect()
}

fn range_totals(figures: &Figures, from: NaiveDate, to: NaiveDate) -> Option<(f64, f64)> {
    let mut any = false;
    let mut totals = (0.0, 0.0);
    for (_, &(rooms, revenue)) in figures.range(from..=to) {
        any = true;
        totals.0 += rooms;
        totals.1 += revenue;
    }
    any.then_some(totals)
}

/// The [first-of-month, as_of] bucket. `None` when neither side has a stay
/// date inside the window.
fn month_to_date(base: &Figures, curr: &Figures, as_of: NaiveDate) -> Option<MonthComparison> {
    let from = as_of.with_day(1)?;

    let base_totals = range_totals(base, from, as_of);
    let curr_totals = range_totals(curr, from, as_of);
    if base_totals.is_none() && curr_totals.is_none() {
        return None;
    }

    let baseline = side_of(base_totals.as_ref());
    let current = side_of(curr_totals.as_ref());
    Some(MonthComparison {
        year: as_of.year(),
        month: as_of.month(),
        baseline,
        current,
        pickup: Pickup::between(&baseline, &current),
    })
}
