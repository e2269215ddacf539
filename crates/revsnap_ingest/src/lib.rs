//! Mail-to-snapshot ingestion pipeline.
//!
//! One cycle drains a mailbox: every unread item is routed to its hotel,
//! each attachment passes the dedup gate, gets stored as an immutable blob
//! and becomes a snapshot via two-phase registration. Items are processed
//! strictly one after another; a failing item is logged and counted but
//! never stops the rest of the batch.

mod attachment;
mod cycle;
mod error;
mod seed;
#[cfg(test)]
mod testkit;

pub use attachment::{ingest_attachment, IngestOutcome};
pub use cycle::Orchestrator;
pub use error::{IngestError, Result};
pub use seed::{apply_seed_overlay, register_seed, SEED_OVERLAY_DAYS};
