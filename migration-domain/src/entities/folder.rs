use crate::value_objects::FolderKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node in the per-project folder forest (§3.1). `parent_source_id` and
/// `source_id` refer to Source's own identifiers, preserved so the
/// Transform phase can rebuild the tree without recursion (§9 "arena/indices
/// rather than pointer graphs").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub source_id: String,
    pub project_key: String,
    pub parent_source_id: Option<String>,
    pub name: String,
    pub kind: FolderKind,
}

impl super::HasSize for Folder {}
