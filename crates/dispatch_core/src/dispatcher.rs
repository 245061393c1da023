//! Dispatch cycle orchestration.
//!
//! One cycle: merge backlog and new emergencies, sort by priority, resolve
//! requirements (dropping unserviceable types), match against the resource pool,
//! and rebuild the backlog from whatever was not fully served.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::backlog::EngineState;
use crate::config::DispatchConfig;
use crate::error::{ConfigError, DispatchError};
use crate::matching::{create_strategy, MatchingStrategy, ServiceRequest};
use crate::model::{Assignment, Emergency, EmergencyId, Resource, ResourceStatus};
use crate::pool::ResourcePool;
use crate::requirements::RequirementTable;

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle number within the engine state.
    pub cycle: u64,
    pub strategy: &'static str,
    /// Committed assignments in priority order, requirement order within an emergency.
    pub assignments: Vec<Assignment>,
    pub served: Vec<EmergencyId>,
    /// Emergencies carried into the next cycle.
    pub backlogged: Vec<EmergencyId>,
    /// Emergencies whose type has no requirements; never retried.
    pub dropped: Vec<EmergencyId>,
    /// The optimal solver gave up and every resolvable emergency was backlogged.
    pub solver_abandoned: bool,
}

/// Backlog first, then new emergencies. A repeated identity keeps the latest
/// copy at the position of its first occurrence.
pub fn merge_candidates(backlog: Vec<Emergency>, new_emergencies: &[Emergency]) -> Vec<Emergency> {
    let mut merged: Vec<Emergency> = Vec::with_capacity(backlog.len() + new_emergencies.len());
    let mut position: HashMap<EmergencyId, usize> = HashMap::new();
    for emergency in backlog.into_iter().chain(new_emergencies.iter().cloned()) {
        match position.get(&emergency.id) {
            Some(&index) => merged[index] = emergency,
            None => {
                position.insert(emergency.id, merged.len());
                merged.push(emergency);
            }
        }
    }
    merged
}

/// Runs dispatch cycles with one configuration, requirement table and strategy.
pub struct Dispatcher {
    config: DispatchConfig,
    requirements: RequirementTable,
    strategy: Box<dyn MatchingStrategy>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("requirements", &self.requirements)
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

impl Dispatcher {
    /// Validates `config` and builds the strategy it selects.
    pub fn new(config: DispatchConfig, requirements: RequirementTable) -> Result<Self, ConfigError> {
        config.validate()?;
        let strategy = create_strategy(config.strategy, &config.solver);
        Ok(Self {
            config,
            requirements,
            strategy,
        })
    }

    /// Uses a caller-provided strategy instead of the configured one.
    pub fn with_strategy(
        config: DispatchConfig,
        requirements: RequirementTable,
        strategy: Box<dyn MatchingStrategy>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            requirements,
            strategy,
        })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn requirements(&self) -> &RequirementTable {
        &self.requirements
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Runs one cycle.
    ///
    /// `resources` is the authoritative resource set for this cycle; statuses are
    /// updated in place. Resources not `available` on entry are left alone.
    /// Calling with no new emergencies and no resources leaves `state` untouched
    /// apart from the cycle counter.
    ///
    /// On `Err` every resource is back at its entry status and every resolvable
    /// candidate is in the backlog.
    pub fn run_cycle(
        &self,
        state: &mut EngineState,
        new_emergencies: &[Emergency],
        resources: &mut [Resource],
        now_ms: u64,
    ) -> Result<CycleReport, DispatchError> {
        let cycle = state.cycles_completed + 1;
        let mut report = CycleReport {
            cycle,
            strategy: self.strategy.name(),
            ..CycleReport::default()
        };
        info!(
            cycle,
            new = new_emergencies.len(),
            backlog = state.backlog.len(),
            resources = resources.len(),
            strategy = self.strategy.name(),
            policy = self.config.priority.name(),
            "dispatch cycle started"
        );

        if new_emergencies.is_empty() && resources.is_empty() {
            report.backlogged = state.backlog.ids();
            state.cycles_completed = cycle;
            info!(cycle, backlog = state.backlog.len(), "nothing to dispatch");
            return Ok(report);
        }

        let mut candidates = merge_candidates(state.backlog.take(), new_emergencies);
        self.config.priority.sort(&mut candidates, now_ms);

        let mut requests = Vec::with_capacity(candidates.len());
        for emergency in &candidates {
            match self.requirements.resolve(&emergency.kind) {
                Some(requirements) => requests.push(ServiceRequest {
                    emergency,
                    requirements,
                    score: self.config.priority.score(emergency, now_ms),
                }),
                None => {
                    warn!(
                        emergency = %emergency.id,
                        kind = %emergency.kind,
                        "no requirements for emergency type; dropping"
                    );
                    report.dropped.push(emergency.id);
                }
            }
        }

        let entry_statuses: Vec<ResourceStatus> = resources.iter().map(|r| r.status).collect();
        let matched = self
            .strategy
            .match_requests(&requests, &mut ResourcePool::new(resources));
        let outcome = match matched {
            Ok(outcome) => outcome,
            Err(err) => {
                // Undo partial commits so no backlogged emergency keeps units.
                for (resource, status) in resources.iter_mut().zip(entry_statuses) {
                    resource.status = status;
                }
                state
                    .backlog
                    .extend(requests.iter().map(|request| request.emergency.clone()));
                warn!(cycle, error = %err, "matching failed; cycle rolled back");
                return Err(err);
            }
        };

        for &index in &outcome.served {
            let emergency = requests[index].emergency;
            debug!(emergency = %emergency.id, kind = %emergency.kind, "emergency served");
            report.served.push(emergency.id);
        }
        for &index in &outcome.unserved {
            let emergency = requests[index].emergency;
            debug!(emergency = %emergency.id, kind = %emergency.kind, "emergency backlogged");
            if state.backlog.push(emergency.clone()) {
                report.backlogged.push(emergency.id);
            }
        }
        report.assignments = outcome.assignments;
        report.solver_abandoned = outcome.abandoned;
        state.cycles_completed = cycle;

        info!(
            cycle,
            assignments = report.assignments.len(),
            served = report.served.len(),
            backlogged = report.backlogged.len(),
            dropped = report.dropped.len(),
            "dispatch cycle finished"
        );
        Ok(report)
    }
}
