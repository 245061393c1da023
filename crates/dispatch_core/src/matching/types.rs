use crate::model::{Assignment, Emergency};
use crate::priority::PriorityScore;
use crate::requirements::Requirement;

/// An emergency with resolved requirements, ready to be matched.
#[derive(Debug, Clone, Copy)]
pub struct ServiceRequest<'a> {
    pub emergency: &'a Emergency,
    pub requirements: &'a [Requirement],
    pub score: PriorityScore,
}

impl ServiceRequest<'_> {
    /// Number of resource units this request consumes when served.
    pub fn unit_count(&self) -> usize {
        self.requirements
            .iter()
            .map(|requirement| requirement.quantity as usize)
            .sum()
    }
}

/// Result of matching one priority-ordered request list.
///
/// Indices refer to positions in the request slice handed to the strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// Committed assignments: priority order of their emergencies, requirement order within one.
    pub assignments: Vec<Assignment>,
    /// Fully served requests, in commit order.
    pub served: Vec<usize>,
    /// Requests that were not served, in request order.
    pub unserved: Vec<usize>,
    /// Set when the strategy gave up on the whole cycle (solver budget exhausted).
    pub abandoned: bool,
}
