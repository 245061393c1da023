//! Whole-cycle mutual exclusion for services that accept concurrent requests.
//!
//! Two interleaved cycles would race on reservations and on the backlog, so the
//! engine state sits behind one lock that is held for an entire cycle.

use parking_lot::Mutex;

use crate::backlog::EngineState;
use crate::dispatcher::{CycleReport, Dispatcher};
use crate::error::DispatchError;
use crate::model::{Emergency, Resource};

#[derive(Debug)]
pub struct SharedDispatcher {
    dispatcher: Dispatcher,
    state: Mutex<EngineState>,
}

impl SharedDispatcher {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_state(dispatcher, EngineState::new())
    }

    pub fn with_state(dispatcher: Dispatcher, state: EngineState) -> Self {
        Self {
            dispatcher,
            state: Mutex::new(state),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Runs one cycle while holding the state lock.
    pub fn run_cycle(
        &self,
        new_emergencies: &[Emergency],
        resources: &mut [Resource],
        now_ms: u64,
    ) -> Result<CycleReport, DispatchError> {
        let mut state = self.state.lock();
        self.dispatcher
            .run_cycle(&mut state, new_emergencies, resources, now_ms)
    }

    /// Copy of the current backlog, in queue order.
    pub fn backlog(&self) -> Vec<Emergency> {
        self.state.lock().backlog.iter().cloned().collect()
    }

    pub fn cycles_completed(&self) -> u64 {
        self.state.lock().cycles_completed
    }

    pub fn into_state(self) -> EngineState {
        self.state.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::config::{DispatchConfig, StrategyKind};
    use crate::model::ResourceId;
    use crate::requirements::RequirementTable;
    use crate::spatial::Location;

    #[test]
    fn concurrent_cycles_never_double_book() {
        let dispatcher = Dispatcher::new(
            DispatchConfig::default().with_strategy(StrategyKind::Greedy),
            RequirementTable::builtin(),
        )
        .expect("dispatcher");
        let shared = Arc::new(SharedDispatcher::new(dispatcher));

        let handles: Vec<_> = (0..8u64)
            .map(|worker| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let emergencies = vec![Emergency::new(
                        worker,
                        "police",
                        Location::new(worker as f64, 0.0),
                        3.0,
                        0,
                    )];
                    let mut resources: Vec<Resource> = (0..2)
                        .map(|i| Resource::new(worker * 10 + i, "police_unit", Location::default()))
                        .collect();
                    let report = shared
                        .run_cycle(&emergencies, &mut resources, 1_000)
                        .expect("cycle");
                    report
                        .assignments
                        .iter()
                        .map(|a| a.resource_id)
                        .collect::<Vec<ResourceId>>()
                })
            })
            .collect();

        let mut all: Vec<ResourceId> = handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("worker"))
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
        assert_eq!(shared.cycles_completed(), 8);
    }
}
