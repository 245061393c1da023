//! Optimal matching: one global 0/1 assignment problem per cycle.
//!
//! Variables are `serve[e]` per request and `assign[t, r]` per (required unit,
//! eligible resource). Every unit of a served request gets exactly one resource,
//! units of unserved requests get none, and a resource backs at most one unit.
//! The objective maximizes the scaled priority reward of served requests minus
//! the scaled travel distance of the chosen pairs.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::SolverConfig;
use crate::error::DispatchError;
use crate::model::Assignment;
use crate::pool::ResourcePool;

use super::algorithm::MatchingStrategy;
use super::solver::{
    AssignmentProblem, AssignmentSolver, BranchAndBoundSolver, Candidate, ProblemTask, Solution,
    SolveStatus,
};
use super::types::{MatchOutcome, ServiceRequest};

/// A formulated cycle: the integer problem plus the pool slot behind each column.
#[derive(Debug, Clone, Default)]
pub struct Formulation {
    pub problem: AssignmentProblem,
    pub column_slots: Vec<usize>,
}

pub struct OptimalMatching {
    config: SolverConfig,
    solver: Box<dyn AssignmentSolver>,
}

impl std::fmt::Debug for OptimalMatching {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimalMatching")
            .field("config", &self.config)
            .field("solver", &self.solver.name())
            .finish()
    }
}

impl Default for OptimalMatching {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl OptimalMatching {
    /// Optimal matching backed by [`BranchAndBoundSolver`].
    pub fn new(config: SolverConfig) -> Self {
        let solver = BranchAndBoundSolver::new(config.node_budget)
            .with_time_budget(Duration::from_millis(config.time_budget_ms));
        Self::with_solver(config, Box::new(solver))
    }

    pub fn with_solver(config: SolverConfig, solver: Box<dyn AssignmentSolver>) -> Self {
        Self { config, solver }
    }

    /// Convert a real value to an integer coefficient (scale and clamp to avoid overflow).
    fn to_coefficient(value: f64) -> i64 {
        if value.is_nan() {
            0
        } else if value >= i64::MAX as f64 {
            i64::MAX
        } else if value <= i64::MIN as f64 {
            i64::MIN
        } else {
            value as i64
        }
    }

    /// Serve reward per request.
    ///
    /// Every reward starts at `travel_bound`, which exceeds the travel cost of any
    /// feasible plan, so an emergency that can be covered is always worth serving.
    /// Non-critical requests add `priority_weight * scale * (offset - score)`, where
    /// `offset` is zero unless some finite score is positive (linear policy), in
    /// which case it is the largest finite score. Critical requests add
    /// `priority_weight * scale * critical_score` plus one more `travel_bound` for
    /// each critical request behind them, so arrival order decides between them.
    pub fn serve_rewards(&self, requests: &[ServiceRequest<'_>], travel_bound: i64) -> Vec<i64> {
        let offset = requests
            .iter()
            .map(|request| request.score.value())
            .filter(|score| score.is_finite())
            .fold(0.0, f64::max);
        let factor = self.config.priority_weight * self.config.scale;
        let critical_base = Self::to_coefficient(self.config.critical_score * factor);
        let mut criticals_behind = requests.iter().filter(|r| r.score.is_critical()).count() as i64;

        requests
            .iter()
            .map(|request| {
                if request.score.is_critical() {
                    criticals_behind -= 1;
                    let order_bonus = travel_bound.saturating_mul(criticals_behind);
                    travel_bound
                        .saturating_add(critical_base)
                        .saturating_add(order_bonus)
                } else {
                    let priority = Self::to_coefficient((offset - request.score.value()) * factor);
                    travel_bound.saturating_add(priority)
                }
            })
            .collect()
    }

    /// Builds the integer problem for `requests` against the available resources in `pool`.
    pub fn formulate(&self, requests: &[ServiceRequest<'_>], pool: &ResourcePool<'_>) -> Formulation {
        let mut column_of_slot = vec![None; pool.len()];
        let mut column_slots = Vec::new();
        let mut tasks = Vec::new();

        for (owner, request) in requests.iter().enumerate() {
            let at = request.emergency.location;
            for requirement in request.requirements {
                let candidates: Vec<Candidate> = pool
                    .available_of_type(&requirement.resource_type)
                    .map(|(slot, resource)| {
                        let column = *column_of_slot[slot].get_or_insert_with(|| {
                            column_slots.push(slot);
                            column_slots.len() - 1
                        });
                        let distance = resource.location.distance_to(at);
                        Candidate {
                            column,
                            cost: Self::to_coefficient(distance * self.config.scale),
                        }
                    })
                    .collect();
                for _ in 0..requirement.quantity {
                    tasks.push(ProblemTask {
                        owner,
                        candidates: candidates.clone(),
                    });
                }
            }
        }

        // One more than the most any plan can spend on travel.
        let travel_bound = tasks
            .iter()
            .map(|task: &ProblemTask| task.candidates.iter().map(|c| c.cost).max().unwrap_or(0))
            .fold(1i64, i64::saturating_add);

        Formulation {
            problem: AssignmentProblem {
                serve_rewards: self.serve_rewards(requests, travel_bound),
                tasks,
                columns: column_slots.len(),
            },
            column_slots,
        }
    }

    /// Every served task has a column, no column is used twice, and each chosen
    /// column is one of the task's candidates.
    fn is_consistent(problem: &AssignmentProblem, solution: &Solution) -> bool {
        if solution.serve.len() != problem.serve_rewards.len()
            || solution.task_columns.len() != problem.tasks.len()
        {
            return false;
        }
        let mut used = vec![false; problem.columns];
        for (task, column) in problem.tasks.iter().zip(&solution.task_columns) {
            match (solution.serve[task.owner], column) {
                (true, Some(column)) => {
                    let eligible = task.candidates.iter().any(|c| c.column == *column);
                    if !eligible || std::mem::replace(&mut used[*column], true) {
                        return false;
                    }
                }
                (false, None) => {}
                _ => return false,
            }
        }
        true
    }

    fn abandon(requests: &[ServiceRequest<'_>]) -> MatchOutcome {
        MatchOutcome {
            unserved: (0..requests.len()).collect(),
            abandoned: true,
            ..MatchOutcome::default()
        }
    }
}

impl MatchingStrategy for OptimalMatching {
    fn name(&self) -> &'static str {
        "optimal"
    }

    fn match_requests(
        &self,
        requests: &[ServiceRequest<'_>],
        pool: &mut ResourcePool<'_>,
    ) -> Result<MatchOutcome, DispatchError> {
        if requests.is_empty() {
            return Ok(MatchOutcome::default());
        }

        let Formulation {
            problem,
            column_slots,
        } = self.formulate(requests, pool);

        let solution = match self.solver.solve(&problem) {
            SolveStatus::Optimal(solution) if Self::is_consistent(&problem, &solution) => solution,
            SolveStatus::Optimal(_) => {
                warn!(
                    solver = self.solver.name(),
                    "solver returned an inconsistent solution; backlogging every request"
                );
                return Ok(Self::abandon(requests));
            }
            SolveStatus::Infeasible => {
                warn!(
                    solver = self.solver.name(),
                    "no feasible assignment; backlogging every request"
                );
                return Ok(Self::abandon(requests));
            }
            SolveStatus::BudgetExhausted { nodes } => {
                warn!(
                    solver = self.solver.name(),
                    nodes, "solver budget exhausted; backlogging every request"
                );
                return Ok(Self::abandon(requests));
            }
            SolveStatus::TimedOut { nodes, elapsed } => {
                warn!(
                    solver = self.solver.name(),
                    nodes,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "solver time budget exhausted; backlogging every request"
                );
                return Ok(Self::abandon(requests));
            }
        };
        debug!(
            solver = self.solver.name(),
            tasks = problem.tasks.len(),
            columns = problem.columns,
            nodes = solution.nodes,
            objective = solution.objective,
            "assignment problem solved"
        );

        let tasks_by_owner = problem.tasks_by_owner();
        let mut outcome = MatchOutcome::default();
        for (owner, request) in requests.iter().enumerate() {
            if !solution.serve[owner] {
                outcome.unserved.push(owner);
                continue;
            }
            for &task in &tasks_by_owner[owner] {
                let Some(column) = solution.task_columns[task] else {
                    continue;
                };
                let slot = column_slots[column];
                pool.reserve(slot)?;
                pool.commit(slot)?;
                let resource_id = pool
                    .get(slot)
                    .ok_or(DispatchError::UnknownSlot(slot))?
                    .id;
                outcome.assignments.push(Assignment {
                    emergency_id: request.emergency.id,
                    resource_id,
                    emergency_location: request.emergency.location,
                });
            }
            outcome.served.push(owner);
        }
        Ok(outcome)
    }
}
