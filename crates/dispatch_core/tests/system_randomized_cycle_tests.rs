mod support;

use std::collections::{HashMap, HashSet};

use dispatch_core::dispatcher::merge_candidates;
use dispatch_core::matching::{OptimalMatching, ServiceRequest};
use dispatch_core::model::{Resource, ResourceStatus};
use dispatch_core::pool::ResourcePool;
use dispatch_core::scenario::{build_cycle, ScenarioParams};
use dispatch_core::test_helpers::dispatcher;
use dispatch_core::{EmergencyId, EngineState, PriorityPolicy, RequirementTable, StrategyKind};

use support::{run_checked_at, BOTH_STRATEGIES};

const CYCLES: u64 = 6;
const SEEDS: [u64; 5] = [1, 7, 42, 1234, 98765];

#[test]
fn random_cycles_keep_every_guarantee() {
    for strategy in BOTH_STRATEGIES {
        for seed in SEEDS {
            let dispatcher = dispatcher(strategy);
            let mut state = EngineState::new();
            let mut resolved: HashSet<EmergencyId> = HashSet::new();

            for cycle in 0..CYCLES {
                let params = ScenarioParams::default()
                    .with_seed(seed * 100 + cycle)
                    .with_counts(6, 8)
                    .with_first_id(1 + cycle * 1000)
                    .with_now_ms(10_000_000 + cycle * 60_000);
                let mut generated = build_cycle(&params);

                let candidates: HashSet<EmergencyId> =
                    merge_candidates(state.backlog.iter().cloned().collect(), &generated.emergencies)
                        .iter()
                        .map(|e| e.id)
                        .collect();

                let report = run_checked_at(
                    &dispatcher,
                    &mut state,
                    &generated.emergencies,
                    &mut generated.resources,
                    generated.now_ms,
                );

                // Nothing served or dropped before may come back.
                for id in report.served.iter().chain(&report.dropped) {
                    assert!(resolved.insert(*id), "{strategy} seed {seed}: {id} resolved twice");
                }
                let backlog: HashSet<EmergencyId> = state.backlog.ids().into_iter().collect();
                let expected: HashSet<EmergencyId> = candidates
                    .iter()
                    .filter(|id| !resolved.contains(id))
                    .copied()
                    .collect();
                assert_eq!(backlog, expected, "{strategy} seed {seed} cycle {cycle}");
                assert!(generated
                    .resources
                    .iter()
                    .all(|r| r.status != ResourceStatus::Reserved));
            }
            assert_eq!(state.cycles_completed, CYCLES);
        }
    }
}

fn objective(
    report: &dispatch_core::CycleReport,
    rewards: &HashMap<EmergencyId, i64>,
    resources: &[Resource],
) -> i64 {
    let reward: i64 = report.served.iter().map(|id| rewards[id]).sum();
    let travel: i64 = report
        .assignments
        .iter()
        .map(|a| {
            let resource = resources
                .iter()
                .find(|r| r.id == a.resource_id)
                .expect("assigned resource exists");
            (resource.location.distance_to(a.emergency_location) * 1000.0) as i64
        })
        .sum();
    reward - travel
}

#[test]
fn optimal_objective_is_never_below_greedy() {
    let table = RequirementTable::builtin();
    let policy = PriorityPolicy::default();

    for seed in SEEDS {
        let params = ScenarioParams::default()
            .with_seed(seed)
            .with_counts(5, 9)
            .with_now_ms(10_000_000);
        let generated = build_cycle(&params);

        let requests: Vec<ServiceRequest<'_>> = generated
            .emergencies
            .iter()
            .filter_map(|emergency| {
                table.resolve(&emergency.kind).map(|requirements| ServiceRequest {
                    emergency,
                    requirements,
                    score: policy.score(emergency, generated.now_ms),
                })
            })
            .collect();
        let mut scratch = generated.resources.clone();
        let formulation = OptimalMatching::default().formulate(&requests, &ResourcePool::new(&mut scratch));
        let rewards: HashMap<EmergencyId, i64> = requests
            .iter()
            .map(|request| request.emergency.id)
            .zip(formulation.problem.serve_rewards)
            .collect();

        let mut greedy_pool = generated.resources.clone();
        let greedy = run_checked_at(
            &dispatcher(StrategyKind::Greedy),
            &mut EngineState::new(),
            &generated.emergencies,
            &mut greedy_pool,
            generated.now_ms,
        );
        let mut optimal_pool = generated.resources.clone();
        let optimal = run_checked_at(
            &dispatcher(StrategyKind::Optimal),
            &mut EngineState::new(),
            &generated.emergencies,
            &mut optimal_pool,
            generated.now_ms,
        );

        assert!(!optimal.solver_abandoned, "seed {seed}");
        let greedy_value = objective(&greedy, &rewards, &generated.resources);
        let optimal_value = objective(&optimal, &rewards, &generated.resources);
        assert!(
            optimal_value >= greedy_value,
            "seed {seed}: optimal {optimal_value} < greedy {greedy_value}"
        );
    }
}
