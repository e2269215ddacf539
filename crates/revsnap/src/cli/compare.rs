//! Compare command - pickup, actuals, and stly comparisons
//!
//! Resolves a pair of snapshots for the requested mode and renders the
//! daily and monthly deltas between them.

use chrono::NaiveDate;
use comfy_table::Color;

use crate::cli::config;
use crate::cli::error::HelpfulError;
use crate::cli::output::{
    direction_color, format_figure, format_figure_signed, print_table_colored,
};
use revsnap_compare::{compare, CompareError, CompareRequest};
use revsnap_core::{
    CompareMode, ComparisonReport, DayComparison, MonthComparison, Pickup, SideFigures,
    SnapshotMeta,
};

/// Arguments for the compare command
#[derive(Debug, clap::Args)]
pub struct CompareArgs {
    /// Comparison mode: pickup, actuals, or stly
    pub mode: String,
    /// Hotel to compare
    #[arg(long)]
    pub hotel: i64,
    /// Baseline snapshot id; resolved per mode when omitted
    #[arg(long)]
    pub baseline: Option<i64>,
    /// Current snapshot id; defaults to the hotel's latest
    #[arg(long)]
    pub snapshot: Option<i64>,
    /// Business date anchoring month-to-date; defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
    /// Show per-stay-date rows
    #[arg(long)]
    pub daily: bool,
    /// Show per-month rollups (the default view)
    #[arg(long)]
    pub monthly: bool,
    #[arg(long)]
    pub json: bool,
}

/// Execute the compare command
pub fn run(args: CompareArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(run_async(args))
}

async fn run_async(args: CompareArgs) -> anyhow::Result<()> {
    let mode =
        CompareMode::parse(&args.mode).ok_or_else(|| HelpfulError::unknown_mode(&args.mode))?;

    let db = config::open_registry_existing().await?;

    let request = CompareRequest {
        hotel_id: args.hotel,
        mode,
        snapshot_a: args.baseline,
        snapshot_b: args.snapshot,
        as_of: args.as_of,
    };

    let report = match compare(&db, &request).await {
        Ok(report) => report,
        Err(CompareError::HotelNotFound(id)) => {
            return Err(HelpfulError::hotel_not_found(id).into());
        }
        Err(CompareError::SnapshotNotFound(id)) => {
            return Err(HelpfulError::snapshot_not_found(id).into());
        }
        Err(err) => return Err(err.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_header(&report);
    if args.daily {
        println!();
        print_daily(&report);
    }
    if args.monthly || !args.daily {
        println!();
        print_monthly(&report);
    }

    Ok(())
}

fn print_header(report: &ComparisonReport) {
    println!(
        "{} {} (hotel {}) as of {}",
        report.mode.as_str().to_uppercase(),
        report.hotel_name,
        report.hotel_id,
        report.as_of
    );
    print_side("Baseline", &report.baseline);
    print_side("Current", &report.current);
}

fn print_side(label: &str, meta: &SnapshotMeta) {
    println!(
        "  {:<9} snapshot {:<5} {}  {}{}",
        format!("{label}:"),
        meta.id,
        meta.taken_at.format("%Y-%m-%d %H:%M UTC"),
        meta.filename,
        if meta.is_seed { "  (seed)" } else { "" }
    );
}

const FIGURE_HEADERS: [&str; 7] = [
    "BASE RN",
    "CURR RN",
    "RN PICKUP",
    "BASE REV",
    "CURR REV",
    "REV PICKUP",
    "ADR PICKUP",
];

/// The seven figure cells shared by daily and monthly rows.
fn figure_cells(
    baseline: &SideFigures,
    current: &SideFigures,
    pickup: &Pickup,
) -> Vec<(String, Option<Color>)> {
    vec![
        (format_figure(baseline.room_nights), None),
        (format_figure(current.room_nights), None),
        (
            format_figure_signed(pickup.room_nights.value),
            direction_color(pickup.room_nights.direction),
        ),
        (format_figure(baseline.room_revenue), None),
        (format_figure(current.room_revenue), None),
        (
            format_figure_signed(pickup.room_revenue.value),
            direction_color(pickup.room_revenue.direction),
        ),
        (
            format_figure_signed(pickup.adr.value),
            direction_color(pickup.adr.direction),
        ),
    ]
}

fn daily_row(day: &DayComparison) -> Vec<(String, Option<Color>)> {
    let mut row = vec![(day.stay_date.to_string(), None)];
    row.extend(figure_cells(&day.baseline, &day.current, &day.pickup));
    row
}

fn month_row(label: String, month: &MonthComparison) -> Vec<(String, Option<Color>)> {
    let mut row = vec![(label, None)];
    row.extend(figure_cells(&month.baseline, &month.current, &month.pickup));
    row
}

fn month_label(month: &MonthComparison) -> String {
    format!("{}-{:02}", month.year, month.month)
}

fn print_daily(report: &ComparisonReport) {
    if report.daily.is_empty() {
        println!("No stay dates on either side.");
        return;
    }

    let mut headers = vec!["STAY DATE"];
    headers.extend(FIGURE_HEADERS);

    let rows = report.daily.iter().map(daily_row).collect();
    print_table_colored(&headers, rows);
}

fn print_monthly(report: &ComparisonReport) {
    if report.monthly.is_empty() && report.month_to_date.is_none() {
        println!("No stay dates on either side.");
        return;
    }

    let mut headers = vec!["MONTH"];
    headers.extend(FIGURE_HEADERS);

    let mut rows: Vec<Vec<(String, Option<Color>)>> = report
        .monthly
        .iter()
        .map(|month| month_row(month_label(month), month))
        .collect();
    if let Some(mtd) = &report.month_to_date {
        rows.push(month_row(format!("MTD {}", report.as_of), mtd));
    }

    print_table_colored(&headers, rows);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_cells_color_pickup_by_direction() {
        let baseline = SideFigures::from_totals(30.0, 6000.0);
        let current = SideFigures::from_totals(38.0, 9500.0);
        let pickup = Pickup::between(&baseline, &current);

        let cells = figure_cells(&baseline, &current, &pickup);
        assert_eq!(cells.len(), 7);
        assert_eq!(cells[0], ("30.00".to_string(), None));
        assert_eq!(cells[2], ("+8.00".to_string(), Some(Color::Green)));
        assert_eq!(cells[5].0, "+3,500.00");
        assert_eq!(cells[5].1, Some(Color::Green));
    }

    #[test]
    fn test_flat_pickup_is_uncolored() {
        let side = SideFigures::from_totals(40.0, 8000.0);
        let pickup = Pickup::between(&side, &side);

        let cells = figure_cells(&side, &side, &pickup);
        assert_eq!(cells[2], ("0.00".to_string(), None));
    }

    #[test]
    fn test_month_label() {
        let month = MonthComparison {
            year: 2025,
            month: 3,
            baseline: SideFigures::zero(),
            current: SideFigures::zero(),
            pickup: Pickup::between(&SideFigures::zero(), &SideFigures::zero()),
        };
        assert_eq!(month_label(&month), "2025-03");
    }
}
