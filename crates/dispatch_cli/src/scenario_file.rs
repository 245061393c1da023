use anyhow::{bail, Context, Result};
use dispatch_core::validation::{validate_emergencies, validate_resources};
use dispatch_core::{Assignment, Dispatcher, Emergency, EmergencyId, EngineState, Resource};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A recorded sequence of dispatch cycles.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub cycles: Vec<ScenarioCycle>,
}

/// Inputs of one cycle. `resources` is the full resource set for that cycle.
#[derive(Debug, Deserialize)]
pub struct ScenarioCycle {
    pub now_ms: u64,
    #[serde(default)]
    pub emergencies: Vec<Emergency>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// One output line.
#[derive(Debug, Serialize, PartialEq)]
pub struct CycleLine {
    pub cycle: u64,
    pub strategy: &'static str,
    pub assignments: Vec<Assignment>,
    pub dropped: Vec<EmergencyId>,
    /// Backlog after the cycle, in queue order.
    pub backlog: Vec<EmergencyId>,
    pub solver_abandoned: bool,
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario file: {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&json)
        .with_context(|| format!("parsing scenario file: {}", path.display()))?;
    if scenario.cycles.is_empty() {
        bail!("scenario 'cycles' must not be empty");
    }
    for (index, cycle) in scenario.cycles.iter().enumerate() {
        validate_emergencies(&cycle.emergencies)
            .with_context(|| format!("cycle {index}: invalid emergencies"))?;
        validate_resources(&cycle.resources)
            .with_context(|| format!("cycle {index}: invalid resources"))?;
    }
    Ok(scenario)
}

/// Runs every cycle against one engine state, in file order.
pub fn run_scenario(dispatcher: &Dispatcher, scenario: Scenario) -> Result<Vec<CycleLine>> {
    let mut state = EngineState::new();
    let mut lines = Vec::with_capacity(scenario.cycles.len());
    for mut cycle in scenario.cycles {
        let report = dispatcher
            .run_cycle(&mut state, &cycle.emergencies, &mut cycle.resources, cycle.now_ms)
            .with_context(|| format!("dispatch cycle {}", state.cycles_completed + 1))?;
        lines.push(CycleLine {
            cycle: report.cycle,
            strategy: report.strategy,
            assignments: report.assignments,
            dropped: report.dropped,
            backlog: state.backlog.ids(),
            solver_abandoned: report.solver_abandoned,
        });
    }
    Ok(lines)
}
