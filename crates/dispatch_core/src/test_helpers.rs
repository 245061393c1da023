//! Test helpers for common test setup and invariant checks.
//!
//! Shared by unit tests, the integration tests under `tests/` and benchmarks.

use std::collections::{HashMap, HashSet};

use crate::config::{DispatchConfig, StrategyKind};
use crate::dispatcher::{CycleReport, Dispatcher};
use crate::model::{Emergency, EmergencyId, Resource, ResourceId, ResourceStatus};
use crate::priority::PriorityPolicy;
use crate::requirements::RequirementTable;
use crate::spatial::Location;

/// Clock reading used by fixtures: 2023-11-14T22:13:20Z.
pub const TEST_NOW_MS: u64 = 1_700_000_000_000;

/// An emergency created `age_secs` before [`TEST_NOW_MS`].
pub fn emergency_aged(id: u64, kind: &str, at: (f64, f64), severity: f64, age_secs: u64) -> Emergency {
    Emergency::new(
        id,
        kind,
        Location::from(at),
        severity,
        TEST_NOW_MS - age_secs * 1000,
    )
}

/// An available resource.
pub fn unit(id: u64, kind: &str, at: (f64, f64)) -> Resource {
    Resource::new(id, kind, Location::from(at))
}

/// Dispatcher over the builtin requirement table with default weights.
pub fn dispatcher(strategy: StrategyKind) -> Dispatcher {
    dispatcher_with(DispatchConfig::default().with_strategy(strategy))
}

/// Dispatcher using the linear policy with the given weights.
pub fn linear_dispatcher(strategy: StrategyKind, severity_weight: f64, time_weight: f64) -> Dispatcher {
    dispatcher_with(
        DispatchConfig::default()
            .with_strategy(strategy)
            .with_priority(PriorityPolicy::linear(severity_weight, time_weight, 10.0)),
    )
}

pub fn dispatcher_with(config: DispatchConfig) -> Dispatcher {
    Dispatcher::new(config, RequirementTable::builtin()).expect("test config should be valid")
}

/// Resource ids in the report's assignments, as a set.
pub fn assigned_ids(report: &CycleReport) -> HashSet<ResourceId> {
    report.assignments.iter().map(|a| a.resource_id).collect()
}

/// Checks the per-cycle guarantees of a report against the inputs it ran on.
///
/// - every served emergency has exactly its required units, by type
/// - no resource is used twice
/// - used resources are `assigned`, resources that were available and unused stay `available`
/// - nothing is left `reserved` that was not reserved before
/// - served, backlogged and dropped partition the candidates
///
/// # Panics
///
/// Panics with a description of the first violated guarantee.
pub fn assert_cycle_invariants(
    report: &CycleReport,
    candidates: &[Emergency],
    table: &RequirementTable,
    before: &[Resource],
    after: &[Resource],
) {
    let kind_of: HashMap<ResourceId, &str> =
        before.iter().map(|r| (r.id, r.kind.as_str())).collect();
    let emergency_kind: HashMap<EmergencyId, &str> =
        candidates.iter().map(|e| (e.id, e.kind.as_str())).collect();

    let mut used = HashSet::new();
    let mut per_emergency: HashMap<EmergencyId, HashMap<&str, u32>> = HashMap::new();
    for assignment in &report.assignments {
        assert!(
            used.insert(assignment.resource_id),
            "resource {} assigned twice",
            assignment.resource_id
        );
        let kind = *kind_of
            .get(&assignment.resource_id)
            .unwrap_or_else(|| panic!("unknown resource {}", assignment.resource_id));
        *per_emergency
            .entry(assignment.emergency_id)
            .or_default()
            .entry(kind)
            .or_default() += 1;
    }

    let served: HashSet<EmergencyId> = report.served.iter().copied().collect();
    assert_eq!(
        served,
        per_emergency.keys().copied().collect::<HashSet<_>>(),
        "served set must match emergencies with assignments"
    );
    for id in &served {
        let kind = *emergency_kind
            .get(id)
            .unwrap_or_else(|| panic!("served unknown emergency {id}"));
        let needs = table.resolve(kind).expect("served emergency must be serviceable");
        let got = &per_emergency[id];
        for need in needs {
            assert_eq!(
                got.get(need.resource_type.as_str()).copied().unwrap_or(0),
                need.quantity,
                "emergency {id} partially served for {}",
                need.resource_type
            );
        }
        let total: u32 = got.values().sum();
        let required: u32 = needs.iter().map(|n| n.quantity).sum();
        assert_eq!(total, required, "emergency {id} received extra units");
    }

    for (old, new) in before.iter().zip(after) {
        assert_eq!(old.id, new.id);
        if used.contains(&new.id) {
            assert_eq!(old.status, ResourceStatus::Available, "{} was not available", new.id);
            assert_eq!(new.status, ResourceStatus::Assigned, "{} not marked assigned", new.id);
        } else {
            assert_eq!(old.status, new.status, "{} changed status without assignment", new.id);
        }
    }

    let mut seen = HashSet::new();
    for id in report
        .served
        .iter()
        .chain(&report.backlogged)
        .chain(&report.dropped)
    {
        assert!(seen.insert(*id), "emergency {id} reported twice");
    }
    let expected: HashSet<EmergencyId> = candidates.iter().map(|e| e.id).collect();
    assert_eq!(seen, expected, "every candidate must be served, backlogged or dropped");
}
