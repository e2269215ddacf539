//! CLI module for revsnap
//!
//! One module per command, plus shared table formatting and the
//! helpful-error type every command maps failures into.

pub mod error;
pub mod output;

// Commands
pub mod compare;
pub mod cycle;
pub mod hotel;
pub mod mail;
pub mod seed;
pub mod snapshot;
pub mod status;

// Configuration and paths
pub mod config;
