//! Extension-map value type for custom fields (§9 design note: "model
//! entities as strongly typed records ... plus an extension map for custom
//! fields, value = tagged variant").

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CustomFieldValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Date(String),
    List(Vec<String>),
}

impl CustomFieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            CustomFieldValue::String(_) => "string",
            CustomFieldValue::Number(_) => "number",
            CustomFieldValue::Boolean(_) => "boolean",
            CustomFieldValue::Date(_) => "date",
            CustomFieldValue::List(_) => "list",
        }
    }

    /// Normalized string form used by the DataIntegrity rule (§4.6):
    /// none -> "", bool -> lowercase str, number -> str, else trim+lower.
    pub fn normalized(&self) -> String {
        match self {
            CustomFieldValue::Boolean(b) => b.to_string(),
            CustomFieldValue::Number(n) => n.to_string(),
            CustomFieldValue::String(s) => s.trim().to_lowercase(),
            CustomFieldValue::Date(s) => s.trim().to_lowercase(),
            CustomFieldValue::List(items) => items.join(",").trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CustomFieldValue::String(s) => s.is_empty(),
            CustomFieldValue::Date(s) => s.is_empty(),
            CustomFieldValue::List(items) => items.is_empty(),
            CustomFieldValue::Number(_) | CustomFieldValue::Boolean(_) => false,
        }
    }
}

/// Field-sparse custom-field extension map, keyed by field name.
pub type CustomFields = BTreeMap<String, CustomFieldValue>;
