//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    // === Common error constructors ===

    /// Registry database has not been created yet
    pub fn database_missing(path: &Path) -> Self {
        Self::new(format!("Registry database not found: {}", path.display()))
            .with_context("Nothing has been ingested on this machine yet")
            .with_suggestion(
                "TRY: revsnap hotel add \"Name\" --email reports@hotel.example --rooms 120",
            )
            .with_suggestion("TRY: revsnap cycle run   # The first run creates the database")
    }

    /// Input file does not exist
    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The specified file does not exist")
            .with_suggestion(format!(
                "TRY: Check that the file exists: ls -la {}",
                path.display()
            ))
    }

    /// Comparison mode string is not recognized
    pub fn unknown_mode(mode: &str) -> Self {
        Self::new(format!("Unknown comparison mode: '{}'", mode))
            .with_context("Valid modes are pickup, actuals, and stly")
            .with_suggestion("TRY: revsnap compare pickup --hotel 1")
    }

    /// Hotel id does not exist
    pub fn hotel_not_found(id: i64) -> Self {
        Self::new(format!("Hotel not found: {}", id))
            .with_suggestion("TRY: revsnap hotel list   # Show known hotel ids")
    }

    /// Snapshot id does not exist
    pub fn snapshot_not_found(id: i64) -> Self {
        Self::new(format!("Snapshot not found: {}", id))
            .with_suggestion("TRY: revsnap snapshot list   # Show registered snapshots")
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Emit an error as JSON on stdout for --json invocations
pub fn print_json_error(err: &anyhow::Error) {
    let causes: Vec<String> = err.chain().skip(1).map(|cause| cause.to_string()).collect();
    let payload = serde_json::json!({
        "error": err.to_string(),
        "causes": causes,
    });
    match serde_json::to_string_pretty(&payload) {
        Ok(body) => println!("{}", body),
        Err(_) => println!("{{\"error\": {:?}}}", err.to_string()),
    }
}
