use anyhow::{bail, Context, Result};
use dispatch_core::scenario::{build_cycle, ScenarioParams};
use dispatch_core::{
    CycleReport, DispatchConfig, Dispatcher, EngineState, RequirementTable, Resource, ResourceId,
    StrategyKind,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

const STRATEGIES: [StrategyKind; 2] = [StrategyKind::Greedy, StrategyKind::Optimal];

#[derive(Debug, Clone)]
pub struct CompareParams {
    pub seed: u64,
    pub runs: u64,
    pub emergencies: usize,
    pub resources: usize,
}

/// Outcome of one strategy on one generated cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RunOutcome {
    served: usize,
    backlogged: usize,
    distance: f64,
    abandoned: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StrategySummary {
    pub strategy: StrategyKind,
    pub runs: u64,
    pub served: usize,
    pub backlogged: usize,
    pub total_distance: f64,
    pub abandoned: u64,
}

impl StrategySummary {
    fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            runs: 0,
            served: 0,
            backlogged: 0,
            total_distance: 0.0,
            abandoned: 0,
        }
    }

    fn add(&mut self, outcome: RunOutcome) {
        self.runs += 1;
        self.served += outcome.served;
        self.backlogged += outcome.backlogged;
        self.total_distance += outcome.distance;
        self.abandoned += u64::from(outcome.abandoned);
    }

    pub fn mean_distance_per_served(&self) -> f64 {
        if self.served == 0 {
            0.0
        } else {
            self.total_distance / self.served as f64
        }
    }
}

fn travel_distance(report: &CycleReport, resources: &[Resource]) -> f64 {
    let location_of: HashMap<ResourceId, _> =
        resources.iter().map(|r| (r.id, r.location)).collect();
    report
        .assignments
        .iter()
        .filter_map(|a| {
            location_of
                .get(&a.resource_id)
                .map(|at| at.distance_to(a.emergency_location))
        })
        .sum()
}

fn run_once(dispatcher: &Dispatcher, run_seed: u64, params: &CompareParams) -> Result<RunOutcome> {
    let generated = build_cycle(
        &ScenarioParams::default()
            .with_seed(run_seed)
            .with_counts(params.emergencies, params.resources),
    );
    let mut resources = generated.resources.clone();
    let mut state = EngineState::new();
    let report = dispatcher
        .run_cycle(&mut state, &generated.emergencies, &mut resources, generated.now_ms)
        .with_context(|| format!("{} run with seed {run_seed}", dispatcher.strategy_name()))?;
    Ok(RunOutcome {
        served: report.served.len(),
        backlogged: report.backlogged.len(),
        distance: travel_distance(&report, &generated.resources),
        abandoned: report.solver_abandoned,
    })
}

/// Runs both strategies on `runs` seeded cycles, in parallel across seeds.
pub fn run_comparison(params: &CompareParams) -> Result<Vec<StrategySummary>> {
    if params.runs == 0 {
        bail!("--runs must be > 0");
    }
    let dispatchers = STRATEGIES
        .iter()
        .map(|&strategy| {
            Dispatcher::new(
                DispatchConfig::default().with_strategy(strategy),
                RequirementTable::builtin(),
            )
            .context("building dispatcher")
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rng = StdRng::seed_from_u64(params.seed);
    let run_seeds: Vec<u64> = (0..params.runs).map(|_| rng.gen()).collect();

    let outcomes: Vec<Vec<RunOutcome>> = run_seeds
        .par_iter()
        .map(|&run_seed| {
            dispatchers
                .iter()
                .map(|dispatcher| run_once(dispatcher, run_seed, params))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let mut summaries: Vec<StrategySummary> =
        STRATEGIES.iter().map(|&s| StrategySummary::new(s)).collect();
    for per_strategy in outcomes {
        for (summary, outcome) in summaries.iter_mut().zip(per_strategy) {
            summary.add(outcome);
        }
    }
    tracing::info!(runs = params.runs, seed = params.seed, "comparison finished");
    Ok(summaries)
}

pub fn print_summary(summaries: &[StrategySummary]) {
    println!(
        "{:<10} {:>6} {:>8} {:>10} {:>14} {:>12} {:>10}",
        "Strategy", "Runs", "Served", "Backlogged", "TotalDistance", "PerServed", "Abandoned"
    );
    println!("{}", "-".repeat(76));
    for summary in summaries {
        println!(
            "{:<10} {:>6} {:>8} {:>10} {:>14.2} {:>12.2} {:>10}",
            summary.strategy.to_string(),
            summary.runs,
            summary.served,
            summary.backlogged,
            summary.total_distance,
            summary.mean_distance_per_served(),
            summary.abandoned
        );
    }
}
