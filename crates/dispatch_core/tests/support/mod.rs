#![allow(dead_code)]

use dispatch_core::backlog::EngineState;
use dispatch_core::dispatcher::{merge_candidates, CycleReport, Dispatcher};
use dispatch_core::model::{Emergency, EmergencyId, Resource};
use dispatch_core::test_helpers::{assert_cycle_invariants, TEST_NOW_MS};

pub const BOTH_STRATEGIES: [dispatch_core::StrategyKind; 2] = [
    dispatch_core::StrategyKind::Greedy,
    dispatch_core::StrategyKind::Optimal,
];

/// Runs a cycle at [`TEST_NOW_MS`] and checks the per-cycle guarantees.
pub fn run_checked(
    dispatcher: &Dispatcher,
    state: &mut EngineState,
    new_emergencies: &[Emergency],
    resources: &mut [Resource],
) -> CycleReport {
    run_checked_at(dispatcher, state, new_emergencies, resources, TEST_NOW_MS)
}

pub fn run_checked_at(
    dispatcher: &Dispatcher,
    state: &mut EngineState,
    new_emergencies: &[Emergency],
    resources: &mut [Resource],
    now_ms: u64,
) -> CycleReport {
    let candidates = merge_candidates(state.backlog.iter().cloned().collect(), new_emergencies);
    let before = resources.to_vec();
    let report = dispatcher
        .run_cycle(state, new_emergencies, resources, now_ms)
        .expect("cycle should not hit an engine invariant");
    assert_cycle_invariants(
        &report,
        &candidates,
        dispatcher.requirements(),
        &before,
        resources,
    );
    report
}

pub fn served_ids(report: &CycleReport) -> Vec<u64> {
    report.served.iter().map(|id| id.0).collect()
}

pub fn backlog_ids(state: &EngineState) -> Vec<u64> {
    state.backlog.ids().into_iter().map(|EmergencyId(id)| id).collect()
}

pub fn first_emergency(report: &CycleReport) -> Option<u64> {
    report.assignments.first().map(|a| a.emergency_id.0)
}
