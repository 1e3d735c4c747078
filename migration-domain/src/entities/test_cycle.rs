use crate::value_objects::CustomFields;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCycle {
    pub id: Uuid,
    pub source_id: String,
    pub key: String,
    pub project_key: String,
    pub folder_source_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub planned_start: Option<DateTime<Utc>>,
    pub planned_end: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub custom_fields: CustomFields,
}

impl super::HasSize for TestCycle {}

/// Target-shaped cycle produced by Transform (§4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetTestCycle {
    pub source_id: String,
    pub name: String,
    pub description: Option<String>,
    pub module_id: String,
    pub planned_start: Option<DateTime<Utc>>,
    pub planned_end: Option<DateTime<Utc>>,
    pub properties: CustomFields,
}
