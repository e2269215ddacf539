//! Seed command - Register one-time seed history files
//!
//! A seed is the long-horizon baseline a hotel starts from. It arrives
//! out of band at onboarding, not through the mailbox.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Subcommand;

use crate::cli::config;
use crate::cli::error::HelpfulError;
use revsnap_ingest::{register_seed, IngestError};
use revsnap_storage::FsBlobStore;

/// Subcommands for seed management
#[derive(Subcommand, Debug, Clone)]
pub enum SeedAction {
    /// Register a hotel's seed history file
    Register {
        /// Hotel the seed belongs to
        #[arg(long)]
        hotel: i64,
        /// Path to the seed report
        #[arg(long)]
        file: PathBuf,
        /// Business date of onboarding, used when the filename carries
        /// no timestamp
        #[arg(long)]
        onboarding_date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
}

/// Execute the seed command
pub fn run(action: SeedAction) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match action {
            SeedAction::Register {
                hotel,
                file,
                onboarding_date,
                json,
            } => register(hotel, file, onboarding_date, json).await,
        }
    })
}

async fn register(
    hotel_id: i64,
    file: PathBuf,
    onboarding_date: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    if !file.exists() {
        return Err(HelpfulError::file_not_found(&file).into());
    }
    let bytes = std::fs::read(&file)?;
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "seed.tsv".to_string());

    let db = config::open_registry().await?;
    let blobs = FsBlobStore::new(config::blobs_dir());

    let snapshot = match register_seed(&db, &blobs, hotel_id, &bytes, &filename, onboarding_date)
        .await
    {
        Ok(snapshot) => snapshot,
        Err(IngestError::HotelNotFound(id)) => {
            return Err(HelpfulError::hotel_not_found(id).into());
        }
        Err(IngestError::SeedExists(id)) => {
            return Err(HelpfulError::new(format!(
                "Hotel {id} already has a seed snapshot"
            ))
            .with_context("A hotel's history is seeded exactly once at onboarding")
            .with_suggestion("TRY: revsnap snapshot list --seeds   # Show existing seeds")
            .into());
        }
        Err(IngestError::DuplicateContent(hash)) => {
            return Err(HelpfulError::new("This file has already been ingested")
                .with_context(format!("Content hash {hash} is known to the registry"))
                .with_suggestion("TRY: revsnap snapshot list   # Find the earlier snapshot")
                .into());
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!(
            "Registered seed snapshot {} for hotel {} ({} rows, taken at {})",
            snapshot.id,
            snapshot.hotel_id,
            snapshot.row_count,
            snapshot.taken_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
