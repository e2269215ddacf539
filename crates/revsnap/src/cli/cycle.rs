//! Cycle command - Run or watch the mailbox ingestion cycle
//!
//! One cycle scans the drop-directory inbox, ingests every unread
//! report addressed to a known hotel, and records the outcome per item.
//! Watch mode repeats the cycle on a timer until interrupted.

use std::path::PathBuf;
use std::time::Duration;

use clap::Subcommand;
use tracing::{info, warn};

use crate::cli::config;
use crate::cli::output::format_number;
use revsnap_core::CycleSummary;
use revsnap_ingest::Orchestrator;
use revsnap_mail::DropDirMailbox;
use revsnap_storage::FsBlobStore;

/// Subcommands for the ingestion cycle
#[derive(Subcommand, Debug, Clone)]
pub enum CycleAction {
    /// Run a single ingestion cycle
    Run {
        /// Scan this directory instead of the configured inbox
        #[arg(long)]
        inbox: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Run cycles on a timer until interrupted
    Watch {
        /// Seconds between cycles
        #[arg(long, default_value = "300")]
        every: u64,
        /// Scan this directory instead of the configured inbox
        #[arg(long)]
        inbox: Option<PathBuf>,
    },
}

/// Execute the cycle command
pub fn run(action: CycleAction) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match action {
            CycleAction::Run { inbox, json } => run_once(inbox, json).await,
            CycleAction::Watch { every, inbox } => watch(every, inbox).await,
        }
    })
}

async fn build_orchestrator(
    inbox: Option<PathBuf>,
) -> anyhow::Result<Orchestrator<DropDirMailbox, FsBlobStore>> {
    let db = config::open_registry().await?;
    let inbox_dir = inbox.unwrap_or_else(config::inbox_dir);
    std::fs::create_dir_all(&inbox_dir)?;

    Ok(Orchestrator::new(
        db,
        DropDirMailbox::new(inbox_dir),
        FsBlobStore::new(config::blobs_dir()),
    ))
}

async fn run_once(inbox: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(inbox).await?;

    match orchestrator.run_cycle().await {
        Some(summary) => print_summary(&summary, json)?,
        None => println!("A cycle is already in flight; nothing to do."),
    }

    Ok(())
}

async fn watch(every: u64, inbox: Option<PathBuf>) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(inbox).await?;

    let period = Duration::from_secs(every.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(every_secs = period.as_secs(), "Watching inbox; press ctrl-c to stop");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match orchestrator.run_cycle().await {
                    Some(summary) => {
                        info!(
                            run_id = %summary.run_id,
                            processed = summary.processed,
                            snapshots = summary.snapshots_created,
                            errors = summary.error_count,
                            "Cycle finished"
                        );
                    }
                    None => {
                        warn!("Previous cycle still in flight; skipping this tick");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; stopping watch loop");
                break;
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &CycleSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("CYCLE {}", summary.run_id);
    println!("  Items seen:        {:>6}", format_number(summary.items_seen as i64));
    println!("  Processed:         {:>6}", format_number(summary.processed as i64));
    println!("  Skipped:           {:>6}", format_number(summary.skipped as i64));
    println!("  Snapshots created: {:>6}", format_number(summary.snapshots_created as i64));
    println!("  Errors:            {:>6}", format_number(summary.error_count as i64));
    for message in &summary.error_messages {
        println!("    - {message}");
    }

    Ok(())
}
