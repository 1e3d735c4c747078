//! Entity Mapping (§3.2, §6.3): the durable Source-id -> Target-id table
//! that makes re-runs idempotent and rollback possible.

use serde::{Deserialize, Serialize};

use crate::value_objects::MappingType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMapping {
    pub project_key: String,
    pub mapping_type: MappingType,
    pub source_id: String,
    pub target_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl EntityMapping {
    pub fn new(
        project_key: impl Into<String>,
        mapping_type: MappingType,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            project_key: project_key.into(),
            mapping_type,
            source_id: source_id.into(),
            target_id: target_id.into(),
            created_at,
        }
    }

    /// The natural key a `MigrationStore` upserts on (§6.3): a given
    /// `(project_key, mapping_type, source_id)` maps to exactly one
    /// `target_id`, last-write-wins on re-run.
    pub fn key(&self) -> (String, MappingType, String) {
        (self.project_key.clone(), self.mapping_type, self.source_id.clone())
    }
}
