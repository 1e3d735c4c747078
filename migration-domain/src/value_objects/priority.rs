//! Test-case priority and its mapping to Target's numeric priority ids (§4.8).

use serde::{Deserialize, Serialize};

/// Target's priority identifier (1 = highest .. 5 = lowest), per §4.8's
/// mapping table. Default is `Medium` (3) for unrecognized Source values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Highest = 1,
    High = 2,
    Medium = 3,
    Low = 4,
    Lowest = 5,
}

impl Priority {
    pub fn target_id(&self) -> i32 {
        *self as i32
    }

    /// Maps a Source priority string (case-insensitive) to a Target priority.
    /// Unrecognized values default to `Medium`, never fail (§8.1 round-trip).
    pub fn from_source_value(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "highest" | "critical" | "blocker" => Priority::Highest,
            "high" | "major" => Priority::High,
            "low" | "minor" => Priority::Low,
            "lowest" | "trivial" => Priority::Lowest,
            _ => Priority::Medium,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_source_values() {
        assert_eq!(Priority::from_source_value("Critical").target_id(), 1);
        assert_eq!(Priority::from_source_value("major").target_id(), 2);
        assert_eq!(Priority::from_source_value("Medium").target_id(), 3);
        assert_eq!(Priority::from_source_value("minor").target_id(), 4);
        assert_eq!(Priority::from_source_value("TRIVIAL").target_id(), 5);
    }

    #[test]
    fn defaults_to_medium_for_unknown() {
        assert_eq!(Priority::from_source_value("unheard-of").target_id(), 3);
    }
}
