use crate::entities::AttachmentRef;
use crate::value_objects::{CustomFields, Priority};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One (1-based) ordered step of a test case (§3.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestStep {
    pub id: Uuid,
    pub test_case_id: Uuid,
    pub order: u32,
    pub description: String,
    pub expected_result: String,
    /// Source's free-form test-data field, folded into the Target step
    /// description during Transform (§4.8).
    pub test_data: Option<String>,
}

impl super::HasSize for TestStep {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: Uuid,
    pub source_id: String,
    pub key: String,
    pub project_key: String,
    pub folder_source_id: Option<String>,
    pub name: String,
    pub objective: Option<String>,
    pub precondition: Option<String>,
    pub priority: Priority,
    pub status: Option<String>,
    pub steps: Vec<TestStep>,
    pub custom_fields: CustomFields,
    /// Attachment refs the Source side reports for this case; Extraction
    /// downloads each one via `EtlExecutor::extract_attachment` (§4.8).
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

impl super::HasSize for TestCase {}

/// Target-shaped test case produced by Transform (§4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetTestCase {
    pub source_id: String,
    pub name: String,
    pub objective: Option<String>,
    pub precondition: Option<String>,
    pub priority_id: i32,
    pub module_id: String,
    pub steps: Vec<TargetTestStep>,
    pub properties: CustomFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetTestStep {
    pub description: String,
    pub expected_result: String,
}

impl TargetTestStep {
    /// §4.8: combine `testData` into the description when present.
    pub fn from_source(step: &TestStep) -> Self {
        let description = match &step.test_data {
            Some(data) if !data.is_empty() => format!("{}\n\nTest Data: {}", step.description, data),
            _ => step.description.clone(),
        };
        Self {
            description,
            expected_result: step.expected_result.clone(),
        }
    }
}
