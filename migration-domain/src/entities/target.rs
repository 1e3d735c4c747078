//! Target-shaped entities produced by Transform and consumed by Load (§4.8).

use crate::value_objects::{CustomFields, ExecutionStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetProject {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Target's grouping container, the image of a Source `Folder` (§GLOSSARY:
/// Folder <-> Module).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub source_folder_id: String,
    pub name: String,
    pub parent_source_folder_id: Option<String>,
    /// BFS level from the forest roots (0 = root); Load processes modules in
    /// ascending level order so parent ids exist before children are created.
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRun {
    pub source_execution_id: String,
    pub test_case_id: String,
    pub test_cycle_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestStepLog {
    pub step_order: u32,
    pub status: ExecutionStatus,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestLog {
    pub overall_status: ExecutionStatus,
    pub step_logs: Vec<TestStepLog>,
    pub executed_by: Option<String>,
    pub environment: Option<String>,
    pub comment: Option<String>,
    pub properties: CustomFields,
}
