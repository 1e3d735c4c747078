use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedEntityType {
    TestCase,
    TestExecution,
    TestStep,
}

/// What the Source side reports is attached to a test case or execution
/// (§6.1: the Source port has no attachment-enumeration method of its own,
/// so this travels embedded on the owning entity's payload instead).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AttachmentRef {
    pub id: String,
    pub filename: String,
}

/// A binary artifact attached to a test case, step, or execution (§3.1).
/// Exactly one of `content_blob`/`url` is populated; the local copy is a
/// cache invalidated on rollback (§3.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub related_type: RelatedEntityType,
    pub related_source_id: String,
    pub filename: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_blob: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Attachment {
    /// §6.5: on-disk naming convention for cached attachment bytes.
    pub fn on_disk_name(&self) -> String {
        match self.related_type {
            RelatedEntityType::TestCase | RelatedEntityType::TestStep => {
                format!("tc_{}_{}", self.related_source_id, self.filename)
            }
            RelatedEntityType::TestExecution => {
                format!("exec_{}_{}", self.related_source_id, self.filename)
            }
        }
    }
}

impl super::HasSize for Attachment {
    fn size(&self) -> f64 {
        self.size as f64
    }
}
