//! Solver side of the optimal strategy: a narrow 0/1 assignment contract.
//!
//! An [`AssignmentProblem`] lists owners (emergencies) with a serve reward and
//! tasks (required units) with their candidate columns (resources) and costs.
//! A solution serves an owner only if every one of its tasks gets a distinct
//! column, and maximizes `sum(reward of served) - sum(cost of used pairs)`.
//!
//! [`BranchAndBoundSolver`] branches on serve decisions and prices each serve
//! set with Kuhn-Munkres (minimum-cost perfect matching of its tasks).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use pathfinding::kuhn_munkres::{kuhn_munkres, Weights};

/// One eligible (resource column, cost) pair of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub column: usize,
    pub cost: i64,
}

/// One required unit of an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemTask {
    pub owner: usize,
    pub candidates: Vec<Candidate>,
}

/// Integer 0/1 assignment problem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentProblem {
    /// Reward for serving each owner, already scaled to integers.
    pub serve_rewards: Vec<i64>,
    pub tasks: Vec<ProblemTask>,
    /// Number of resource columns; candidate columns are below this.
    pub columns: usize,
}

impl AssignmentProblem {
    /// Task indices grouped per owner, in task order.
    pub fn tasks_by_owner(&self) -> Vec<Vec<usize>> {
        let mut grouped = vec![Vec::new(); self.serve_rewards.len()];
        for (index, task) in self.tasks.iter().enumerate() {
            if let Some(group) = grouped.get_mut(task.owner) {
                group.push(index);
            }
        }
        grouped
    }

    fn is_well_formed(&self) -> bool {
        self.tasks.iter().all(|task| {
            task.owner < self.serve_rewards.len()
                && task
                    .candidates
                    .iter()
                    .all(|c| c.column < self.columns && c.cost >= 0)
        })
    }
}

/// Values of the decision variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    /// `serve[owner]`
    pub serve: Vec<bool>,
    /// Column chosen for each task; `None` for tasks of unserved owners.
    pub task_columns: Vec<Option<usize>>,
    pub objective: i64,
    /// Search nodes visited.
    pub nodes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal(Solution),
    /// The problem has no solution this solver can produce.
    Infeasible,
    /// The search budget ran out before optimality was proven.
    BudgetExhausted { nodes: u64 },
    /// The wall-clock budget ran out before optimality was proven.
    TimedOut { nodes: u64, elapsed: Duration },
}

/// Pluggable solver for [`AssignmentProblem`].
pub trait AssignmentSolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, problem: &AssignmentProblem) -> SolveStatus;
}

/// Dense weight matrix for pathfinding's Kuhn-Munkres.
struct I64Weights(Vec<Vec<i64>>);

impl Weights<i64> for I64Weights {
    fn rows(&self) -> usize {
        self.0.len()
    }

    fn columns(&self) -> usize {
        self.0.first().map_or(0, |r| r.len())
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.0[row][col]
    }

    fn neg(&self) -> Self {
        I64Weights(
            self.0
                .iter()
                .map(|r| r.iter().map(|&x| x.saturating_neg()).collect())
                .collect(),
        )
    }
}

/// Cheapest way to give every listed task its own column.
#[derive(Debug, Clone, Default)]
struct Priced {
    cost: i64,
    /// Column per task, aligned with the task list that was priced.
    columns: Vec<usize>,
}

/// Minimum-cost perfect matching of `tasks` onto distinct columns, or `None`
/// when some task cannot be covered.
fn price_tasks(problem: &AssignmentProblem, tasks: &[usize]) -> Option<Priced> {
    if tasks.is_empty() {
        return Some(Priced::default());
    }

    let mut columns: Vec<usize> = tasks
        .iter()
        .flat_map(|&t| problem.tasks[t].candidates.iter().map(|c| c.column))
        .collect();
    columns.sort_unstable();
    columns.dedup();
    if tasks.len() > columns.len() {
        return None;
    }
    let position: HashMap<usize, usize> = columns
        .iter()
        .enumerate()
        .map(|(pos, &column)| (column, pos))
        .collect();

    // Worse than any assignment that only uses eligible pairs.
    let mut worst_total: i64 = 0;
    for &t in tasks {
        let max_cost = problem.tasks[t].candidates.iter().map(|c| c.cost).max()?;
        worst_total = worst_total.saturating_add(max_cost);
    }
    let ineligible = worst_total.saturating_add(1).saturating_neg();

    let mut matrix = vec![vec![ineligible; columns.len()]; tasks.len()];
    for (row, &t) in tasks.iter().enumerate() {
        for candidate in &problem.tasks[t].candidates {
            matrix[row][position[&candidate.column]] = -candidate.cost;
        }
    }

    let weights = I64Weights(matrix);
    let (_total, assigned) = kuhn_munkres(&weights);

    let mut priced = Priced {
        cost: 0,
        columns: Vec::with_capacity(tasks.len()),
    };
    for (row, &col) in assigned.iter().enumerate() {
        let weight = weights.at(row, col);
        if weight == ineligible {
            return None;
        }
        priced.cost = priced.cost.saturating_add(-weight);
        priced.columns.push(columns[col]);
    }
    Some(priced)
}

/// Exact branch and bound over owner serve decisions.
///
/// Owners are branched in descending reward order, serve-first. Each node prices
/// its serve set with Kuhn-Munkres; infeasible sets are cut immediately. The
/// bound adds, for every undecided owner, its reward minus its cheapest
/// stand-alone cost, which never underestimates what the subtree can reach.
/// Exceeding `node_budget` or `time_budget` abandons the search.
#[derive(Debug, Clone, Copy)]
pub struct BranchAndBoundSolver {
    pub node_budget: u64,
    /// `None` means no wall-clock limit.
    pub time_budget: Option<Duration>,
}

impl BranchAndBoundSolver {
    pub fn new(node_budget: u64) -> Self {
        Self {
            node_budget,
            time_budget: None,
        }
    }

    pub fn with_time_budget(mut self, time_budget: Duration) -> Self {
        self.time_budget = Some(time_budget);
        self
    }
}

impl Default for BranchAndBoundSolver {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_NODE_BUDGET)
            .with_time_budget(Duration::from_millis(crate::config::DEFAULT_TIME_BUDGET_MS))
    }
}

enum Stop {
    Nodes,
    Deadline,
}

fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

struct Search<'p> {
    problem: &'p AssignmentProblem,
    tasks_by_owner: Vec<Vec<usize>>,
    order: Vec<usize>,
    /// `optimistic[d]` = best extra value obtainable from owners `order[d..]`.
    optimistic: Vec<i64>,
    nodes: u64,
    budget: u64,
    deadline: Option<Instant>,
    best_value: i64,
    best_owners: Vec<usize>,
    best_columns: Vec<usize>,
}

impl Search<'_> {
    fn tasks_of(&self, owners: &[usize]) -> Vec<usize> {
        owners
            .iter()
            .flat_map(|&owner| self.tasks_by_owner[owner].iter().copied())
            .collect()
    }

    fn visit(
        &mut self,
        depth: usize,
        owners: &mut Vec<usize>,
        reward: i64,
        priced: &Priced,
    ) -> Result<(), Stop> {
        self.nodes += 1;
        if self.nodes > self.budget {
            return Err(Stop::Nodes);
        }
        if past(self.deadline) {
            return Err(Stop::Deadline);
        }

        let value = reward.saturating_sub(priced.cost);
        if value > self.best_value {
            self.best_value = value;
            self.best_owners = owners.clone();
            self.best_columns = priced.columns.clone();
        }
        if depth == self.order.len() {
            return Ok(());
        }
        if value.saturating_add(self.optimistic[depth]) <= self.best_value {
            return Ok(());
        }

        let owner = self.order[depth];
        owners.push(owner);
        let tasks = self.tasks_of(owners);
        if let Some(next) = price_tasks(self.problem, &tasks) {
            let next_reward = reward.saturating_add(self.problem.serve_rewards[owner]);
            self.visit(depth + 1, owners, next_reward, &next)?;
        }
        owners.pop();

        self.visit(depth + 1, owners, reward, priced)
    }
}

impl AssignmentSolver for BranchAndBoundSolver {
    fn name(&self) -> &'static str {
        "branch_and_bound"
    }

    fn solve(&self, problem: &AssignmentProblem) -> SolveStatus {
        if !problem.is_well_formed() {
            return SolveStatus::Infeasible;
        }
        let started = Instant::now();
        let deadline = self.time_budget.map(|budget| started + budget);
        let tasks_by_owner = problem.tasks_by_owner();

        // Owners worth branching on: positive reward and servable on their own.
        let mut standalone = Vec::new();
        for (owner, tasks) in tasks_by_owner.iter().enumerate() {
            let reward = problem.serve_rewards[owner];
            if reward <= 0 {
                continue;
            }
            if past(deadline) {
                return SolveStatus::TimedOut {
                    nodes: 0,
                    elapsed: started.elapsed(),
                };
            }
            if let Some(priced) = price_tasks(problem, tasks) {
                let gain = reward.saturating_sub(priced.cost);
                if gain > 0 {
                    standalone.push((owner, gain));
                }
            }
        }
        standalone.sort_by_key(|&(owner, _)| std::cmp::Reverse(problem.serve_rewards[owner]));

        let order: Vec<usize> = standalone.iter().map(|&(owner, _)| owner).collect();
        let mut optimistic = vec![0i64; order.len() + 1];
        for depth in (0..order.len()).rev() {
            optimistic[depth] = optimistic[depth + 1].saturating_add(standalone[depth].1);
        }

        let mut search = Search {
            problem,
            tasks_by_owner,
            order,
            optimistic,
            nodes: 0,
            budget: self.node_budget,
            deadline,
            best_value: 0,
            best_owners: Vec::new(),
            best_columns: Vec::new(),
        };
        let mut owners = Vec::new();
        match search.visit(0, &mut owners, 0, &Priced::default()) {
            Ok(()) => {}
            Err(Stop::Nodes) => {
                return SolveStatus::BudgetExhausted {
                    nodes: search.nodes,
                }
            }
            Err(Stop::Deadline) => {
                return SolveStatus::TimedOut {
                    nodes: search.nodes,
                    elapsed: started.elapsed(),
                }
            }
        }

        let mut solution = Solution {
            serve: vec![false; problem.serve_rewards.len()],
            task_columns: vec![None; problem.tasks.len()],
            objective: search.best_value,
            nodes: search.nodes,
        };
        let tasks = search.tasks_of(&search.best_owners);
        for &owner in &search.best_owners {
            solution.serve[owner] = true;
        }
        for (task, column) in tasks.into_iter().zip(search.best_columns) {
            solution.task_columns[task] = Some(column);
        }
        SolveStatus::Optimal(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(owner: usize, candidates: &[(usize, i64)]) -> ProblemTask {
        ProblemTask {
            owner,
            candidates: candidates
                .iter()
                .map(|&(column, cost)| Candidate { column, cost })
                .collect(),
        }
    }

    fn solve(problem: &AssignmentProblem) -> Solution {
        match BranchAndBoundSolver::new(10_000).solve(problem) {
            SolveStatus::Optimal(solution) => solution,
            other => panic!("expected optimal solution, got {other:?}"),
        }
    }

    #[test]
    fn empty_problem_serves_nothing() {
        let solution = solve(&AssignmentProblem::default());
        assert!(solution.serve.is_empty());
        assert_eq!(solution.objective, 0);
    }

    #[test]
    fn minimizes_cost_within_a_served_owner() {
        // Two tasks, two columns; the crossed pairing is cheaper.
        let problem = AssignmentProblem {
            serve_rewards: vec![1_000],
            tasks: vec![task(0, &[(0, 10), (1, 1)]), task(0, &[(0, 1), (1, 10)])],
            columns: 2,
        };
        let solution = solve(&problem);
        assert_eq!(solution.serve, vec![true]);
        assert_eq!(solution.task_columns, vec![Some(1), Some(0)]);
        assert_eq!(solution.objective, 998);
    }

    #[test]
    fn owner_is_all_or_nothing() {
        // Owner 0 needs two units but only one column fits either task.
        let problem = AssignmentProblem {
            serve_rewards: vec![1_000, 10],
            tasks: vec![task(0, &[(0, 1)]), task(0, &[(0, 1)]), task(1, &[(0, 5)])],
            columns: 1,
        };
        let solution = solve(&problem);
        assert_eq!(solution.serve, vec![false, true]);
        assert_eq!(solution.task_columns, vec![None, None, Some(0)]);
    }

    #[test]
    fn reward_dominates_travel_cost() {
        // One shared column: the higher reward wins even though it is farther.
        let problem = AssignmentProblem {
            serve_rewards: vec![100_000, 200_000],
            tasks: vec![task(0, &[(0, 1)]), task(1, &[(0, 90_000)])],
            columns: 1,
        };
        let solution = solve(&problem);
        assert_eq!(solution.serve, vec![false, true]);
    }

    #[test]
    fn prefers_serving_two_when_rewards_allow() {
        // Greedy on the top reward would take column 0 and starve owner 1.
        let problem = AssignmentProblem {
            serve_rewards: vec![1_000, 900],
            tasks: vec![task(0, &[(0, 1), (1, 2)]), task(1, &[(0, 1)])],
            columns: 2,
        };
        let solution = solve(&problem);
        assert_eq!(solution.serve, vec![true, true]);
        assert_eq!(solution.task_columns, vec![Some(1), Some(0)]);
    }

    #[test]
    fn exhausted_budget_is_reported() {
        let problem = AssignmentProblem {
            serve_rewards: vec![10, 10, 10],
            tasks: vec![task(0, &[(0, 1)]), task(1, &[(0, 1)]), task(2, &[(0, 1)])],
            columns: 1,
        };
        assert!(matches!(
            BranchAndBoundSolver::new(1).solve(&problem),
            SolveStatus::BudgetExhausted { .. }
        ));
    }

    #[test]
    fn spent_time_budget_stops_the_search() {
        let problem = AssignmentProblem {
            serve_rewards: vec![10, 10],
            tasks: vec![task(0, &[(0, 1)]), task(1, &[(0, 1)])],
            columns: 1,
        };
        let solver = BranchAndBoundSolver::new(10_000).with_time_budget(Duration::ZERO);
        assert!(matches!(
            solver.solve(&problem),
            SolveStatus::TimedOut { .. }
        ));
    }

    #[test]
    fn malformed_problem_is_infeasible() {
        let problem = AssignmentProblem {
            serve_rewards: vec![10],
            tasks: vec![task(3, &[(0, 1)])],
            columns: 1,
        };
        assert_eq!(
            BranchAndBoundSolver::default().solve(&problem),
            SolveStatus::Infeasible
        );
    }
}
