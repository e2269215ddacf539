//! Mail intake sources for forecast report attachments.
//!
//! The ingestion cycle only needs three capabilities from a mailbox: list
//! unread items carrying attachments, fetch attachment bytes, and mark an
//! item handled. [`DropDirMailbox`] maps that contract onto a spool
//! directory filled by an external mail fetcher, one subdirectory per
//! routing address. [`MemoryMailbox`] backs tests.

mod drop_dir;
mod memory;

pub use drop_dir::DropDirMailbox;
pub use memory::MemoryMailbox;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MailError>;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mail item not found: {0}")]
    NotFound(String),
}

/// One unread mail item and its attachment names.
#[derive(Debug, Clone)]
pub struct MailItem {
    /// Stable message id, unique per item across the mailbox's lifetime.
    pub id: String,
    /// Routing address the item arrived on.
    pub recipient: String,
    pub sender: Option<String>,
    pub subject: Option<String>,
    pub received_at: DateTime<Utc>,
    pub attachments: Vec<String>,
}

/// Read-side contract the ingestion cycle runs against.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// List unread items with attachments, oldest first.
    async fn list_unread(&self) -> Result<Vec<MailItem>>;

    /// Fetch one attachment's raw bytes.
    async fn fetch_attachment(&self, item_id: &str, name: &str) -> Result<Vec<u8>>;

    /// Mark an item handled so it stops appearing in `list_unread`.
    async fn mark_processed(&self, item_id: &str) -> Result<()>;
}
