//! Matching strategies: turning priority-ordered emergencies into assignments.
//!
//! - [`GreedyMatching`]: per required unit, the nearest available resource of the
//!   right type, with rollback when an emergency cannot be completed.
//! - [`OptimalMatching`]: one global 0/1 assignment problem per cycle, solved by an
//!   [`AssignmentSolver`] (branch and bound over Kuhn-Munkres by default).

pub mod algorithm;
pub mod greedy;
pub mod optimal;
pub mod solver;
pub mod types;

pub use algorithm::MatchingStrategy;
pub use greedy::GreedyMatching;
pub use optimal::OptimalMatching;
pub use solver::{AssignmentProblem, AssignmentSolver, BranchAndBoundSolver, SolveStatus};
pub use types::{MatchOutcome, ServiceRequest};

use crate::config::{SolverConfig, StrategyKind};

/// Builds the strategy selected by configuration.
pub fn create_strategy(kind: StrategyKind, solver: &SolverConfig) -> Box<dyn MatchingStrategy> {
    match kind {
        StrategyKind::Greedy => Box::new(GreedyMatching),
        StrategyKind::Optimal => Box::new(OptimalMatching::new(*solver)),
    }
}
