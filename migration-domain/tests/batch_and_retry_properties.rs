//! Property tests (§16/§8.1) for the universal invariants the batch
//! strategies, retry policy, and migration-state machine must hold for any
//! input, not just the hand-picked cases in the unit tests colocated with
//! each module.

use migration_domain::batch_strategies::{BatchStrategy, EntityTypeBatchStrategy, SizeBatchStrategy};
use migration_domain::control_plane::BatchTrackerMath;
use migration_domain::control_plane::migration_state::MigrationState;
use migration_domain::retry::RetryPolicy;
use migration_domain::value_objects::{EntityType, PhaseStatus};
use proptest::prelude::*;

// ---------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------

fn arb_phase_status() -> impl Strategy<Value = PhaseStatus> {
    prop_oneof![
        Just(PhaseStatus::NotStarted),
        Just(PhaseStatus::InProgress),
        Just(PhaseStatus::Completed),
        Just(PhaseStatus::Partial),
        Just(PhaseStatus::Failed),
        Just(PhaseStatus::RolledBack),
    ]
}

// ---------------------------------------------------------------------
// Batch strategies: partition/permutation laws (§4.1)
// ---------------------------------------------------------------------

proptest! {
    /// Every `BatchStrategy` returns only non-empty batches whose
    /// concatenation is exactly the input, in order - batching reorders
    /// nothing and drops nothing.
    #[test]
    fn size_strategy_batches_are_a_partition(sizes in prop::collection::vec(1u32..50, 0..200), max in 1u32..60) {
        let mut strategy = SizeBatchStrategy::new(max as f64, |n: &u32| *n as f64);
        let batches = strategy.batch(sizes.clone());

        prop_assert!(batches.iter().all(|b| !b.is_empty()));
        let flattened: Vec<u32> = batches.into_iter().flatten().collect();
        prop_assert_eq!(flattened, sizes);
    }

    /// No batch exceeds `max_batch_size` unless it is a lone oversized item.
    #[test]
    fn size_strategy_respects_the_cap_or_isolates_the_offender(sizes in prop::collection::vec(1u32..50, 0..200), max in 1u32..60) {
        let mut strategy = SizeBatchStrategy::new(max as f64, |n: &u32| *n as f64);
        let batches = strategy.batch(sizes);

        for batch in &batches {
            let total: u32 = batch.iter().sum();
            if batch.len() == 1 {
                continue; // a singleton may itself exceed the cap (§4.1).
            }
            prop_assert!(total <= max);
        }
    }

    /// `EntityTypeBatchStrategy` is also a partition of its input, grouped by
    /// type key with each group capped at `max_batch_size`.
    #[test]
    fn entity_type_strategy_is_a_partition_capped_per_group(
        items in prop::collection::vec((0u8..4, 1u32..20), 0..200),
        max in 1usize..10,
    ) {
        let mut strategy = EntityTypeBatchStrategy::new(max, |(ty, _): &(u8, u32)| ty.to_string());
        let batches = strategy.batch(items.clone());

        prop_assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= max));
        let flattened: Vec<(u8, u32)> = batches.into_iter().flatten().collect();
        prop_assert_eq!(flattened.len(), items.len());
    }
}

// ---------------------------------------------------------------------
// BatchTrackerMath: plan_batches invariants (§3.2 Scenario A)
// ---------------------------------------------------------------------

proptest! {
    /// The planned batch sizes always sum to the total item count, and no
    /// batch (besides possibly being smaller on the last one) exceeds the
    /// requested batch size.
    #[test]
    fn plan_batches_sums_to_total_and_respects_size(total in 0u32..10_000, batch_size in 0u32..500) {
        let plan = BatchTrackerMath::plan_batches(total, batch_size);
        let sum: u32 = plan.iter().map(|(_, _, count)| *count).sum();
        prop_assert_eq!(sum, total);

        let effective = batch_size.max(1);
        for (_, _, count) in &plan {
            prop_assert!(*count <= effective);
            prop_assert!(*count > 0);
        }

        if let Some((_, total_batches, _)) = plan.first() {
            prop_assert_eq!(plan.len() as u32, *total_batches);
        } else {
            prop_assert_eq!(total, 0);
        }
    }

    /// `initialize_batches` rows mirror `plan_batches` one-for-one and start
    /// `Pending`.
    #[test]
    fn initialize_batches_mirrors_plan(total in 0u32..2_000, batch_size in 1u32..200, is_incremental in any::<bool>()) {
        let plan = BatchTrackerMath::plan_batches(total, batch_size);
        let rows = BatchTrackerMath::initialize_batches("PROJ", EntityType::TestCase, total, batch_size, is_incremental);

        prop_assert_eq!(rows.len(), plan.len());
        for (row, (batch_number, total_batches, items_count)) in rows.iter().zip(plan.iter()) {
            prop_assert_eq!(row.batch_number, *batch_number);
            prop_assert_eq!(row.total_batches, *total_batches);
            prop_assert_eq!(row.items_count, *items_count);
            prop_assert_eq!(row.is_incremental, is_incremental);
        }
        prop_assert_eq!(BatchTrackerMath::pending(&rows).count(), rows.len());
    }
}

// ---------------------------------------------------------------------
// RetryPolicy: classification and backoff invariants (§4.7)
// ---------------------------------------------------------------------

proptest! {
    /// Once `attempt >= max_retries`, nothing is ever retryable, regardless
    /// of status code or kind.
    #[test]
    fn should_retry_never_exceeds_the_attempt_ceiling(attempt in 0u32..20, status_code in any::<u16>()) {
        let policy = RetryPolicy::default();
        if attempt >= policy.max_retries {
            prop_assert!(!policy.should_retry(attempt, None, Some(status_code)));
        }
    }

    /// A status code outside the configured retryable set never triggers a
    /// retry on its own.
    #[test]
    fn non_retryable_status_codes_never_retry(status_code in any::<u16>(), attempt in 0u32..3) {
        let policy = RetryPolicy::default();
        prop_assume!(!policy.retry_status_codes.contains(&status_code));
        prop_assert!(!policy.should_retry(attempt, None, Some(status_code)));
    }

    /// Backoff delay is strictly increasing and always positive.
    #[test]
    fn delay_is_monotonically_increasing(attempt in 0u32..20) {
        let policy = RetryPolicy::default();
        let this_delay = policy.delay(attempt);
        let next_delay = policy.delay(attempt + 1);
        prop_assert!(this_delay > 0.0);
        prop_assert!(next_delay > this_delay);
    }
}

// ---------------------------------------------------------------------
// MigrationState: transition guards (§3.3, §4.4)
// ---------------------------------------------------------------------

proptest! {
    /// `can_transform`/`can_load` never return true unless the phase they
    /// depend on has actually reached `Completed` - no combination of the
    /// other statuses can substitute for it.
    #[test]
    fn transform_and_load_gates_require_their_prerequisite_completed(
        extraction in arb_phase_status(),
        transformation in arb_phase_status(),
    ) {
        let mut state = MigrationState::new("PROJ");
        state.extraction_status = extraction;
        state.transformation_status = transformation;

        if state.can_transform() {
            prop_assert_eq!(extraction, PhaseStatus::Completed);
        }
        if state.can_load() {
            prop_assert_eq!(transformation, PhaseStatus::Completed);
        }
    }

    /// `can_rollback` is true iff at least one of the three phases reached
    /// `Completed` or `Partial`.
    #[test]
    fn can_rollback_matches_its_definition(
        extraction in arb_phase_status(),
        transformation in arb_phase_status(),
        loading in arb_phase_status(),
    ) {
        let mut state = MigrationState::new("PROJ");
        state.extraction_status = extraction;
        state.transformation_status = transformation;
        state.loading_status = loading;

        let expected = [extraction, transformation, loading]
            .iter()
            .any(|s| matches!(s, PhaseStatus::Completed | PhaseStatus::Partial));
        prop_assert_eq!(state.can_rollback(), expected);
    }

    /// `update_extraction_status` to `Completed` always fails when an error
    /// message is supplied, for any starting status.
    #[test]
    fn completed_with_error_is_always_rejected(start in arb_phase_status()) {
        let mut state = MigrationState::new("PROJ");
        state.extraction_status = start;
        prop_assert!(state.update_extraction_status(PhaseStatus::Completed, Some("boom".to_string())).is_err());
    }
}
