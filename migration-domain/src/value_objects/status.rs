//! Folder kinds and test-execution status mapping (§4.8).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderKind {
    TestCase,
    TestPlan,
    TestCycle,
}

/// Target's test-execution status, per §4.8's status-mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Passed,
    Failed,
    InProgress,
    Blocked,
    NotRun,
}

impl ExecutionStatus {
    /// Maps a Source execution status string (case-insensitive) to a Target
    /// status. Unrecognized values default to `NotRun`, never fail.
    pub fn from_source_value(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "pass" => ExecutionStatus::Passed,
            "fail" => ExecutionStatus::Failed,
            "wip" | "in_progress" | "executing" | "incomplete" => ExecutionStatus::InProgress,
            "blocked" => ExecutionStatus::Blocked,
            "unexecuted" | "not_executed" | "not_tested" => ExecutionStatus::NotRun,
            _ => ExecutionStatus::NotRun,
        }
    }
}

impl Default for ExecutionStatus {
    fn default() -> Self {
        ExecutionStatus::NotRun
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_source_statuses() {
        assert_eq!(ExecutionStatus::from_source_value("pass"), ExecutionStatus::Passed);
        assert_eq!(ExecutionStatus::from_source_value("FAIL"), ExecutionStatus::Failed);
        assert_eq!(ExecutionStatus::from_source_value("wip"), ExecutionStatus::InProgress);
        assert_eq!(ExecutionStatus::from_source_value("executing"), ExecutionStatus::InProgress);
        assert_eq!(ExecutionStatus::from_source_value("blocked"), ExecutionStatus::Blocked);
        assert_eq!(ExecutionStatus::from_source_value("not_tested"), ExecutionStatus::NotRun);
    }

    #[test]
    fn defaults_to_not_run_for_unknown() {
        assert_eq!(ExecutionStatus::from_source_value("mystery"), ExecutionStatus::NotRun);
    }
}
