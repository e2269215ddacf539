//! Mail command - Browse the processed-mail audit log

use clap::Subcommand;

use crate::cli::config;
use crate::cli::output::print_table;

/// Subcommands for the mail audit log
#[derive(Subcommand, Debug, Clone)]
pub enum MailAction {
    /// Show recently processed mail, newest first
    Log {
        #[arg(long, default_value = "50")]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
}

/// Execute the mail command
pub fn run(action: MailAction) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match action {
            MailAction::Log { limit, json } => log(limit, json).await,
        }
    })
}

async fn log(limit: usize, json: bool) -> anyhow::Result<()> {
    let db = config::open_registry_existing().await?;
    let records = db.mail_recent(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No mail has been processed yet.");
        return Ok(());
    }

    let headers = &[
        "ID", "MESSAGE", "SENDER", "SUBJECT", "RECEIVED", "PROCESSED", "HASH",
    ];
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            vec![
                record.id.to_string(),
                record.message_id.clone(),
                record.sender.clone().unwrap_or_else(|| "-".to_string()),
                record.subject.clone().unwrap_or_else(|| "-".to_string()),
                record
                    .received_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                record.processed_at.format("%Y-%m-%d %H:%M").to_string(),
                short_hash(&record.content_hash),
            ]
        })
        .collect();

    print_table(headers, rows);
    Ok(())
}

/// First 12 hex characters, enough to eyeball duplicates.
fn short_hash(hash: &str) -> String {
    hash.chars().take(12).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("abcdef0123456789abcdef"), "abcdef012345");
        assert_eq!(short_hash("abc"), "abc");
    }
}
