use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Root anchor for all state; one active migration per `key` (§3.1, §3.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(key: impl Into<String>, name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            name: name.into(),
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

impl super::HasSize for Project {}
