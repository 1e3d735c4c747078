//! Rule registry (§4.5): indexes rules by id/scope/phase.

use std::collections::HashMap;

use crate::value_objects::{ValidationPhase, ValidationScope};

use super::rule::ValidationRule;

#[derive(Default)]
pub struct ValidationRegistry {
    rules: HashMap<String, Box<dyn ValidationRule>>,
}

impl ValidationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering a rule whose id already exists replaces it; callers
    /// should log a warning at the call site (the registry itself has no
    /// logging dependency).
    pub fn register(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.insert(rule.id().to_string(), rule);
    }

    pub fn get(&self, id: &str) -> Option<&dyn ValidationRule> {
        self.rules.get(id).map(AsRef::as_ref)
    }

    pub fn for_scope_and_phase(&self, scope: ValidationScope, phase: ValidationPhase) -> Vec<&dyn ValidationRule> {
        self.rules
            .values()
            .filter(|rule| rule.scope() == scope && rule.phase() == phase)
            .map(AsRef::as_ref)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
