//! Scenario F (SPEC_FULL §16): Loading crashes partway through (one test
//! case's Target create fails), leaving `loading_status = partial`; a
//! second `run_workflow` call for the same project must finish the
//! remaining work without re-creating what already succeeded.

mod support;

use std::collections::HashMap;
use std::sync::Arc;

use migration_domain::repositories::{MigrationStore, SourceClient, TargetClient};
use migration_domain::retry::RetryPolicy;
use migration_domain::value_objects::{MappingType, PhaseStatus};
use migration_engine::{EtlExecutor, MetricsService, ObservabilityService, Orchestrator, StoreEventEmitter, ValidationHooks};

use support::{folder, test_case, FakeSourceClient, FakeTargetClient, InMemoryStore};

fn build_source() -> FakeSourceClient {
    let folders = vec![folder("F-1", None, "Regression")];
    let test_cases = vec![
        test_case("TC-1", "DEMO-T1", "F-1", "Case one", Vec::new()),
        test_case("TC-2", "DEMO-T2", "F-1", "Case two", Vec::new()),
        test_case("TC-3", "DEMO-T3", "F-1", "Case three", Vec::new()),
    ];

    FakeSourceClient {
        project: migration_domain::entities::Project::new("DEMO", "Demo Project", None),
        folders,
        test_cases,
        test_steps: HashMap::new(),
        test_cycles: Vec::new(),
        test_executions: Vec::new(),
        attachment_bytes: HashMap::new(),
    }
}

fn build_orchestrator(store: Arc<InMemoryStore>, target: Arc<FakeTargetClient>) -> Orchestrator {
    let source: Arc<dyn SourceClient> = Arc::new(build_source());
    let target_dyn: Arc<dyn TargetClient> = target;
    let metrics = Arc::new(MetricsService::new());
    let etl = EtlExecutor::new(source, target_dyn.clone(), store.clone() as Arc<dyn MigrationStore>, metrics.clone(), RetryPolicy::default(), 10, 4, None);
    let events = Arc::new(StoreEventEmitter::new(store.clone() as Arc<dyn MigrationStore>));
    let validation = ValidationHooks::new(Some(metrics));
    Orchestrator::new(
        store as Arc<dyn MigrationStore>,
        target_dyn,
        etl,
        events,
        Arc::new(ObservabilityService::new(Arc::new(MetricsService::new()))),
        validation,
        "TARGET-1",
        true,
        true,
        std::time::Duration::from_secs(30),
    )
}

#[tokio::test]
async fn resume_after_partial_load_completes_without_double_creating() {
    let store = Arc::new(InMemoryStore::new());
    let target = Arc::new(FakeTargetClient::new());

    // Simulate a crash creating TC-2 and TC-3 on Target; TC-1 succeeds.
    target.fail_test_cases(["TC-2".to_string(), "TC-3".to_string()]);

    let orchestrator = build_orchestrator(store.clone(), target.clone());
    let state = orchestrator.run_workflow("DEMO", false, &migration_engine::ALL_PHASES).await.expect("run_workflow should not itself error");

    assert_eq!(state.extraction_status, PhaseStatus::Completed);
    assert_eq!(state.transformation_status, PhaseStatus::Completed);
    assert_eq!(state.loading_status, PhaseStatus::Partial, "2 of 3 cases failed to load");

    assert_eq!(store.count_entity_mappings("DEMO", MappingType::TestcaseToTestcase).await.unwrap(), 1);
    assert_eq!(target.case_create_calls(), vec!["TC-1".to_string()]);

    // The crash clears up; resuming must only create the 2 still-missing cases.
    target.clear_failures();
    let state = orchestrator.resume_workflow("DEMO", &migration_engine::ALL_PHASES).await.expect("resume_workflow should succeed");

    assert_eq!(state.extraction_status, PhaseStatus::Completed);
    assert_eq!(state.transformation_status, PhaseStatus::Completed);
    assert_eq!(state.loading_status, PhaseStatus::Completed);

    assert_eq!(store.count_entity_mappings("DEMO", MappingType::TestcaseToTestcase).await.unwrap(), 3);

    let mut calls = target.case_create_calls();
    calls.sort();
    assert_eq!(calls, vec!["TC-1".to_string(), "TC-2".to_string(), "TC-3".to_string()], "TC-1 must not be created a second time");
}

#[tokio::test]
async fn resume_is_a_no_op_once_everything_already_completed() {
    let store = Arc::new(InMemoryStore::new());
    let target = Arc::new(FakeTargetClient::new());
    let orchestrator = build_orchestrator(store.clone(), target.clone());

    orchestrator.run_workflow("DEMO", false, &migration_engine::ALL_PHASES).await.expect("first run should succeed");
    assert_eq!(target.case_create_calls().len(), 3);

    let state = orchestrator.resume_workflow("DEMO", &migration_engine::ALL_PHASES).await.expect("resume of a completed workflow should succeed");
    assert_eq!(state.loading_status, PhaseStatus::Completed);
    assert_eq!(target.case_create_calls().len(), 3, "no case should be created twice on a fully-completed resume");
}
