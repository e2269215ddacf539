//! Error types for the ingestion pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("database error: {0}")]
    Db(#[from] revsnap_db::DbError),

    #[error("mail error: {0}")]
    Mail(#[from] revsnap_mail::MailError),

    #[error("storage error: {0}")]
    Storage(#[from] revsnap_storage::StorageError),

    #[error("hotel not found: {0}")]
    HotelNotFound(i64),

    #[error("hotel {0} already has a seed snapshot")]
    SeedExists(i64),

    #[error("content already ingested: {0}")]
    DuplicateContent(String),

    /// The snapshot was registered but could not be committed; it has been
    /// marked FAILED with this reason.
    #[error("snapshot {id} failed: {reason}")]
    SnapshotFailed { id: i64, reason: String },
}
