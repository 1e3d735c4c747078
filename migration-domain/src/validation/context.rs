//! Per-evaluation context (§4.6): pre-fetched lookups a rule needs but
//! cannot fetch itself, since rule evaluation is synchronous while the
//! store port is async. The application layer resolves whatever a rule
//! needs before calling `evaluate`.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::value_objects::CustomFieldValue;

#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// For `Relationship`/`ReferentialIntegrity`: source ids known to exist
    /// in the store (or to have an `EntityMapping`), pre-fetched.
    pub known_ids: HashSet<String>,

    /// For `UniqueValue`: other entities' values for the field(s) under
    /// check, excluding the entity currently being evaluated.
    pub other_values: Vec<String>,

    /// For `DataIntegrity`: the paired source/target entity views.
    pub source_entity: Option<Value>,
    pub target_entity: Option<Value>,

    /// For `TestStatusMapping`: the configured status mapping table.
    pub status_mappings: HashMap<String, String>,

    /// For `CustomFieldTransformation`: pre-computed `(field, transformed)`
    /// pairs, since the field mapper itself lives in the application layer.
    pub transformed_custom_fields: HashMap<String, CustomFieldValue>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_known_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.known_ids = ids.into_iter().collect();
        self
    }

    pub fn with_other_values(mut self, values: impl IntoIterator<Item = String>) -> Self {
        self.other_values = values.into_iter().collect();
        self
    }

    pub fn with_source_target(mut self, source: Value, target: Value) -> Self {
        self.source_entity = Some(source);
        self.target_entity = Some(target);
        self
    }
}
