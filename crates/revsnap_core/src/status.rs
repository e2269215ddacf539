//! Lifecycle and row classification enums.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a snapshot.
///
/// Transitions only move forward: PENDING -> PROCESSING -> COMPLETED, with
/// FAILED reachable from either non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SnapshotStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl SnapshotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PROCESSING" => Some(Self::Processing),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether the snapshot can still change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a report line carries settled or projected figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RowKind {
    History,
    Forecast,
}

impl RowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::History => "HISTORY",
            Self::Forecast => "FORECAST",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "HISTORY" => Some(Self::History),
            "FORECAST" => Some(Self::Forecast),
            _ => None,
        }
    }
}

impl std::fmt::Display for RowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_status_roundtrip() {
        for status in [
            SnapshotStatus::Pending,
            SnapshotStatus::Processing,
            SnapshotStatus::Completed,
            SnapshotStatus::Failed,
        ] {
            let s = status.as_str();
            let parsed = SnapshotStatus::parse(s).unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_snapshot_status_parse_is_case_insensitive() {
        assert_eq!(
            SnapshotStatus::parse("completed"),
            Some(SnapshotStatus::Completed)
        );
        assert_eq!(SnapshotStatus::parse("bogus"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SnapshotStatus::Pending.is_terminal());
        assert!(!SnapshotStatus::Processing.is_terminal());
        assert!(SnapshotStatus::Completed.is_terminal());
        assert!(SnapshotStatus::Failed.is_terminal());
    }

    #[test]
    fn test_row_kind_roundtrip() {
        for kind in [RowKind::History, RowKind::Forecast] {
            let s = kind.as_str();
            let parsed = RowKind::parse(s).unwrap();
            assert_eq!(kind, parsed);
        }
        assert_eq!(RowKind::parse("history"), Some(RowKind::History));
        assert_eq!(RowKind::parse("TOTAL"), None);
    }
}
