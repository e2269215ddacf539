//! Result payload of one ingestion cycle.

use serde::Serialize;

/// Counters an ingestion cycle hands back to its caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub run_id: String,
    pub items_seen: usize,
    pub processed: usize,
    pub skipped: usize,
    pub snapshots_created: usize,
    pub error_count: usize,
    pub error_messages: Vec<String>,
}

impl CycleSummary {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            items_seen: 0,
            processed: 0,
            skipped: 0,
            snapshots_created: 0,
            error_count: 0,
            error_messages: Vec::new(),
        }
    }

    /// Count a failure without aborting the cycle that hit it.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_count += 1;
        self.error_messages.push(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_counts_and_keeps_messages() {
        let mut summary = CycleSummary::new("run-1");
        summary.record_error("first");
        summary.record_error("second");
        assert_eq!(summary.error_count, 2);
        assert_eq!(summary.error_messages, vec!["first", "second"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let summary = CycleSummary::new("run-1");
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("itemsSeen").is_some());
        assert!(json.get("snapshotsCreated").is_some());
        assert!(json.get("errorMessages").is_some());
    }
}
