use crate::entities::AttachmentRef;
use crate::value_objects::CustomFields;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-step result recorded against a `TestExecution` (§3.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_order: u32,
    pub status: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExecution {
    pub id: Uuid,
    pub source_id: String,
    pub project_key: String,
    pub test_cycle_source_id: String,
    pub test_case_source_id: String,
    pub status: String,
    pub executed_by: Option<String>,
    pub environment: Option<String>,
    pub comment: Option<String>,
    pub step_results: Vec<StepResult>,
    pub custom_fields: CustomFields,
    /// Attachment refs the Source side reports for this execution; see
    /// `TestCase::attachments`.
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

impl super::HasSize for TestExecution {}
