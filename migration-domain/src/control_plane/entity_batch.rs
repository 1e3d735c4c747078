//! Entity Batch tracking (C2/§3.2, Scenario A): batch-count bookkeeping for
//! bounded-concurrency processing of one entity type within one project.

use serde::{Deserialize, Serialize};

use crate::value_objects::EntityType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityBatch {
    pub project_key: String,
    pub entity_type: EntityType,
    pub batch_number: u32,
    pub total_batches: u32,
    pub items_count: u32,
    pub processed_count: u32,
    pub status: BatchStatus,
    pub error_message: Option<String>,
    pub is_incremental: bool,
}

impl EntityBatch {
    pub fn mark_in_progress(&mut self) {
        self.status = BatchStatus::InProgress;
    }

    pub fn mark_completed(&mut self) {
        self.status = BatchStatus::Completed;
        self.processed_count = self.items_count;
        self.error_message = None;
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = BatchStatus::Failed;
        self.error_message = Some(message.into());
    }
}

/// Pure batch-count math, split out of `EntityBatch` so it can be reused by
/// the batch strategies without constructing full rows.
pub struct BatchTrackerMath;

impl BatchTrackerMath {
    /// §3.2 Scenario A: `initialize_batches(25, 10)` -> `[(0,3,10),(1,3,10),(2,3,5)]`.
    /// `batch_size` of 0 is treated as 1 to avoid division by zero.
    pub fn plan_batches(total_items: u32, batch_size: u32) -> Vec<(u32, u32, u32)> {
        if total_items == 0 {
            return Vec::new();
        }
        let batch_size = batch_size.max(1);
        let total_batches = total_items.div_ceil(batch_size);
        (0..total_batches)
            .map(|batch_number| {
                let remaining = total_items - batch_number * batch_size;
                let items_count = remaining.min(batch_size);
                (batch_number, total_batches, items_count)
            })
            .collect()
    }

    pub fn initialize_batches(
        project_key: &str,
        entity_type: EntityType,
        total_items: u32,
        batch_size: u32,
        is_incremental: bool,
    ) -> Vec<EntityBatch> {
        Self::plan_batches(total_items, batch_size)
            .into_iter()
            .map(|(batch_number, total_batches, items_count)| EntityBatch {
                project_key: project_key.to_string(),
                entity_type,
                batch_number,
                total_batches,
                items_count,
                processed_count: 0,
                status: BatchStatus::Pending,
                error_message: None,
                is_incremental,
            })
            .collect()
    }

    pub fn pending<'a>(batches: &'a [EntityBatch]) -> impl Iterator<Item = &'a EntityBatch> {
        batches.iter().filter(|b| b.status == BatchStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_batches_matches_scenario_a() {
        let plan = BatchTrackerMath::plan_batches(25, 10);
        assert_eq!(plan, vec![(0, 3, 10), (1, 3, 10), (2, 3, 5)]);
    }

    #[test]
    fn plan_batches_handles_exact_division() {
        let plan = BatchTrackerMath::plan_batches(20, 10);
        assert_eq!(plan, vec![(0, 2, 10), (1, 2, 10)]);
    }

    #[test]
    fn plan_batches_empty_for_zero_items() {
        assert!(BatchTrackerMath::plan_batches(0, 10).is_empty());
    }

    #[test]
    fn initialize_batches_builds_rows() {
        let batches =
            BatchTrackerMath::initialize_batches("PROJ", EntityType::TestCase, 25, 10, false);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].items_count, 5);
        assert_eq!(BatchTrackerMath::pending(&batches).count(), 3);
    }
}
