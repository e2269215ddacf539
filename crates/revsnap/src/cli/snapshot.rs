//! Snapshot command - Inspect registered snapshots
//!
//! Snapshots are immutable once committed; these subcommands only read
//! and export them.

use std::path::PathBuf;

use clap::Subcommand;
use comfy_table::Color;
use serde::Serialize;

use crate::cli::config;
use crate::cli::error::HelpfulError;
use crate::cli::output::{format_figure, print_table_colored, status_color};
use revsnap_core::{RowKind, Snapshot, SnapshotRow, SnapshotStatus};
use revsnap_db::SnapshotFilter;
use revsnap_storage::{BlobStore, FsBlobStore};

/// Subcommands for snapshot inspection
#[derive(Subcommand, Debug, Clone)]
pub enum SnapshotAction {
    /// List snapshots, newest first
    List {
        /// Only this hotel's snapshots
        #[arg(long)]
        hotel: Option<i64>,
        /// Only snapshots in this status
        #[arg(long)]
        status: Option<String>,
        /// Only seed snapshots
        #[arg(long)]
        seeds: bool,
        #[arg(long, default_value = "50")]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show one snapshot and a sample of its rows
    Show {
        id: i64,
        /// Stay-date rows to print from each end of the report
        #[arg(long, default_value = "5")]
        rows: usize,
        #[arg(long)]
        json: bool,
    },
    /// Write the original report bytes back to disk
    Export {
        id: i64,
        /// Destination path; defaults to the stored filename
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Execute the snapshot command
pub fn run(action: SnapshotAction) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match action {
            SnapshotAction::List {
                hotel,
                status,
                seeds,
                limit,
                json,
            } => list(hotel, status, seeds, limit, json).await,
            SnapshotAction::Show { id, rows, json } => show(id, rows, json).await,
            SnapshotAction::Export { id, output } => export(id, output).await,
        }
    })
}

async fn list(
    hotel: Option<i64>,
    status: Option<String>,
    seeds: bool,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let status = match status {
        Some(raw) => Some(SnapshotStatus::parse(&raw).ok_or_else(|| {
            HelpfulError::new(format!("Unknown snapshot status: '{raw}'"))
                .with_context("Valid statuses are pending, processing, completed, failed")
        })?),
        None => None,
    };

    let db = config::open_registry_existing().await?;
    let snapshots = db
        .snapshot_list(SnapshotFilter {
            hotel_id: hotel,
            status,
            seed_only: seeds,
            limit: Some(limit),
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        println!("No snapshots match the filter.");
        return Ok(());
    }

    let headers = &[
        "ID", "HOTEL", "TAKEN AT", "FILE", "SEED", "STATUS", "ROWS", "ERROR",
    ];
    let rows = snapshots.iter().map(list_row).collect();
    print_table_colored(headers, rows);
    Ok(())
}

fn list_row(snapshot: &Snapshot) -> Vec<(String, Option<Color>)> {
    vec![
        (snapshot.id.to_string(), None),
        (snapshot.hotel_id.to_string(), None),
        (
            snapshot.taken_at.format("%Y-%m-%d %H:%M").to_string(),
            None,
        ),
        (truncate(&snapshot.filename, 40), None),
        (
            if snapshot.is_seed { "yes" } else { "" }.to_string(),
            None,
        ),
        (
            snapshot.status.as_str().to_string(),
            Some(status_color(snapshot.status)),
        ),
        (snapshot.row_count.to_string(), None),
        (
            snapshot
                .error_message
                .as_deref()
                .map(|message| truncate(message, 40))
                .unwrap_or_else(|| "-".to_string()),
            None,
        ),
    ]
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDetails {
    snapshot: Snapshot,
    rows: Vec<SnapshotRow>,
}

async fn show(id: i64, edge_rows: usize, json: bool) -> anyhow::Result<()> {
    let db = config::open_registry_existing().await?;

    let snapshot = db
        .snapshot_get(id)
        .await?
        .ok_or_else(|| HelpfulError::snapshot_not_found(id))?;
    let rows = db.rows_for_snapshot(id).await?;

    if json {
        let details = SnapshotDetails { snapshot, rows };
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    println!("SNAPSHOT {}", snapshot.id);
    println!("  Hotel:    {}", snapshot.hotel_id);
    println!(
        "  Taken at: {}",
        snapshot.taken_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("  File:     {}", snapshot.filename);
    println!("  Hash:     {}", snapshot.content_hash);
    println!("  Seed:     {}", if snapshot.is_seed { "yes" } else { "no" });
    println!("  Status:   {}", snapshot.status);
    if let Some(error) = &snapshot.error_message {
        println!("  Error:    {error}");
    }
    println!("  Rows:     {}", snapshot.row_count);

    if rows.is_empty() {
        return Ok(());
    }

    println!();
    let headers = &[
        "STAY DATE", "KIND", "RN", "REVENUE", "OOO", "OCC%", "ADR", "REVPAR",
    ];

    let mut table: Vec<Vec<(String, Option<Color>)>> = Vec::new();
    if rows.len() <= edge_rows * 2 {
        table.extend(rows.iter().map(row_cells));
    } else {
        table.extend(rows.iter().take(edge_rows).map(row_cells));
        let mut ellipsis = vec![(format!("({} more)", rows.len() - edge_rows * 2), None)];
        ellipsis.resize(headers.len(), (String::new(), None));
        table.push(ellipsis);
        table.extend(rows.iter().skip(rows.len() - edge_rows).map(row_cells));
    }

    print_table_colored(headers, table);
    Ok(())
}

fn row_cells(row: &SnapshotRow) -> Vec<(String, Option<Color>)> {
    let kind_color = match row.kind {
        RowKind::History => Color::Green,
        RowKind::Forecast => Color::Cyan,
    };
    vec![
        (row.stay_date.to_string(), None),
        (row.kind.as_str().to_string(), Some(kind_color)),
        (format_figure(row.room_nights), None),
        (format_figure(row.room_revenue), None),
        (format_figure(row.out_of_order), None),
        (format!("{:.1}", row.occupancy_pct), None),
        (format_figure(row.adr), None),
        (format_figure(row.revpar), None),
    ]
}

async fn export(id: i64, output: Option<PathBuf>) -> anyhow::Result<()> {
    let db = config::open_registry_existing().await?;

    let snapshot = db
        .snapshot_get(id)
        .await?
        .ok_or_else(|| HelpfulError::snapshot_not_found(id))?;

    let blobs = FsBlobStore::new(config::blobs_dir());
    let bytes = blobs.get(&snapshot.storage_ref).await?;

    let destination = output.unwrap_or_else(|| PathBuf::from(&snapshot.filename));
    std::fs::write(&destination, &bytes)?;

    println!("Wrote {} bytes to {}", bytes.len(), destination.display());
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short.tsv", 40), "short.tsv");
        let long = "a".repeat(60);
        let cut = truncate(&long, 40);
        assert_eq!(cut.len(), 40);
        assert!(cut.ends_with("..."));
    }
}
