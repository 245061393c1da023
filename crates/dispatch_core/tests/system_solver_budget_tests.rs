mod support;

use dispatch_core::config::{DispatchConfig, SolverConfig, StrategyKind};
use dispatch_core::model::ResourceStatus;
use dispatch_core::scenario::{build_cycle, ScenarioParams};
use dispatch_core::test_helpers::dispatcher_with;
use dispatch_core::EngineState;

use support::run_checked_at;

#[test]
fn large_cycle_under_tight_time_budget_is_abandoned() {
    let dispatcher = dispatcher_with(
        DispatchConfig::default()
            .with_strategy(StrategyKind::Optimal)
            .with_solver(SolverConfig {
                time_budget_ms: 1,
                ..SolverConfig::default()
            }),
    );
    let mut generated = build_cycle(
        &ScenarioParams::default()
            .with_seed(2024)
            .with_counts(40, 80)
            .with_now_ms(10_000_000),
    );
    let mut state = EngineState::new();

    let report = run_checked_at(
        &dispatcher,
        &mut state,
        &generated.emergencies,
        &mut generated.resources,
        generated.now_ms,
    );

    assert!(report.solver_abandoned);
    assert!(report.assignments.is_empty());
    assert_eq!(state.backlog.len(), 40);
    assert!(generated
        .resources
        .iter()
        .all(|r| r.status == ResourceStatus::Available));
}

#[test]
fn default_budget_solves_a_small_cycle() {
    let dispatcher = dispatcher_with(DispatchConfig::default());
    let mut generated = build_cycle(
        &ScenarioParams::default()
            .with_seed(2024)
            .with_counts(6, 14)
            .with_now_ms(10_000_000),
    );
    let mut state = EngineState::new();

    let report = run_checked_at(
        &dispatcher,
        &mut state,
        &generated.emergencies,
        &mut generated.resources,
        generated.now_ms,
    );

    assert!(!report.solver_abandoned);
}
