//! Configuration paths for revsnap
//!
//! Simple path resolution with sensible defaults. Everything lives under
//! ~/.revsnap unless REVSNAP_HOME points elsewhere.

use std::path::{Path, PathBuf};

use crate::cli::error::HelpfulError;
use revsnap_db::RevsnapDb;

/// Resolve the revsnap home directory.
///
/// Priority:
/// 1) REVSNAP_HOME
/// 2) ~/.revsnap
/// 3) ./.revsnap
pub fn revsnap_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("REVSNAP_HOME") {
        return PathBuf::from(override_path);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".revsnap"),
        None => PathBuf::from(".").join(".revsnap"),
    }
}

/// Registry database: ~/.revsnap/revsnap.sqlite3
pub fn db_path() -> PathBuf {
    revsnap_home().join("revsnap.sqlite3")
}

/// Raw report bytes: ~/.revsnap/blobs
pub fn blobs_dir() -> PathBuf {
    revsnap_home().join("blobs")
}

/// Drop-directory inbox scanned by the cycle: ~/.revsnap/inbox
///
/// Layout is one subdirectory per routing address, one file per
/// attachment.
pub fn inbox_dir() -> PathBuf {
    revsnap_home().join("inbox")
}

/// Log files: ~/.revsnap/logs
pub fn logs_dir() -> PathBuf {
    revsnap_home().join("logs")
}

/// Ensure the logs directory exists
pub fn ensure_logs_dir() -> std::io::Result<PathBuf> {
    let dir = logs_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Open the registry database, creating it on first use
pub async fn open_registry() -> anyhow::Result<RevsnapDb> {
    Ok(RevsnapDb::open(db_path()).await?)
}

/// Open the registry for inspection, failing with guidance when it does
/// not exist yet
pub async fn open_registry_existing() -> anyhow::Result<RevsnapDb> {
    let path = db_path();
    if !path.exists() {
        return Err(HelpfulError::database_missing(&path).into());
    }
    Ok(RevsnapDb::open_existing(&path).await?)
}

/// Arguments for the config command
#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Show resolved paths in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the config command - shows current paths
pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let home = revsnap_home();
    let database = db_path();
    let blobs = blobs_dir();
    let inbox = inbox_dir();
    let logs = logs_dir();

    if args.json {
        let config = serde_json::json!({
            "home": home.to_string_lossy(),
            "database": {
                "path": database.to_string_lossy(),
                "exists": database.exists(),
            },
            "blobs": {
                "path": blobs.to_string_lossy(),
                "exists": blobs.exists(),
            },
            "inbox": {
                "path": inbox.to_string_lossy(),
                "exists": inbox.exists(),
            },
            "logs": {
                "path": logs.to_string_lossy(),
                "exists": logs.exists(),
            },
        });
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("REVSNAP CONFIGURATION");
        println!("=====================");
        println!();
        println!("Home:     {}", home.display());
        println!();
        print_path("Database", &database);
        print_path("Blobs", &blobs);
        print_path("Inbox", &inbox);
        print_path("Logs", &logs);
    }

    Ok(())
}

fn print_path(label: &str, path: &Path) {
    println!(
        "{:<9} {} ({})",
        format!("{label}:"),
        path.display(),
        if path.exists() { "exists" } else { "not found" }
    );
}
