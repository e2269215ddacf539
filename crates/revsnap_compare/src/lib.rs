//! Read-side comparison engine.
//!
//! A comparison resolves its mode to a baseline/current snapshot pair, then
//! reduces both row sets to daily, monthly and month-to-date pickup tables.
//! Everything here is read-only and only COMPLETED snapshots are eligible
//! sources; ingestion never waits on a comparison.

mod engine;
mod error;
mod modes;

pub use error::{CompareError, Result};
pub use modes::{compare, CompareRequest};
