//! Status command - Registry-wide ingest statistics

use serde::Serialize;

use crate::cli::config;
use crate::cli::output::format_number;
use revsnap_db::RegistryStats;

/// Arguments for the status command
#[derive(Debug, clap::Args)]
pub struct StatusArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOutput {
    hotels: u64,
    active_hotels: u64,
    snapshots: u64,
    pending: u64,
    processing: u64,
    completed: u64,
    failed: u64,
    seeds: u64,
    rows: u64,
    processed_mail: u64,
}

impl From<RegistryStats> for StatusOutput {
    fn from(stats: RegistryStats) -> Self {
        StatusOutput {
            hotels: stats.hotels,
            active_hotels: stats.active_hotels,
            snapshots: stats.snapshots,
            pending: stats.pending,
            processing: stats.processing,
            completed: stats.completed,
            failed: stats.failed,
            seeds: stats.seeds,
            rows: stats.rows,
            processed_mail: stats.processed_mail,
        }
    }
}

/// Execute the status command
pub fn run(args: StatusArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(run_async(args))
}

async fn run_async(args: StatusArgs) -> anyhow::Result<()> {
    let db = config::open_registry_existing().await?;
    let stats = db.registry_stats().await?;

    if args.json {
        let output = StatusOutput::from(stats);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("REGISTRY STATUS");
    println!(
        "  Hotels:         {:>8} ({} active)",
        format_number(stats.hotels as i64),
        format_number(stats.active_hotels as i64)
    );
    println!("  Snapshots:      {:>8}", format_number(stats.snapshots as i64));
    println!("    Pending:      {:>8}", format_number(stats.pending as i64));
    println!("    Processing:   {:>8}", format_number(stats.processing as i64));
    println!("    Completed:    {:>8}", format_number(stats.completed as i64));
    println!("    Failed:       {:>8}", format_number(stats.failed as i64));
    println!("    Seeds:        {:>8}", format_number(stats.seeds as i64));
    println!("  Rows:           {:>8}", format_number(stats.rows as i64));
    println!("  Processed mail: {:>8}", format_number(stats.processed_mail as i64));

    Ok(())
}
