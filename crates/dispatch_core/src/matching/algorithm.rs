use crate::error::DispatchError;
use crate::pool::ResourcePool;

use super::types::{MatchOutcome, ServiceRequest};

/// Strategy that pairs priority-ordered requests with resources from the pool.
///
/// Implementations must uphold two guarantees:
///
/// 1. **All or nothing**: a request is either served with every required unit or
///    contributes nothing to the outcome and leaves no resource reserved.
/// 2. **At most one use**: a resource appears in at most one assignment.
///
/// Served resources end the call in the `assigned` state; every other resource
/// keeps the status it had on entry.
pub trait MatchingStrategy: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Matches `requests` (already in priority order) against `pool`.
    ///
    /// Every request index ends up in exactly one of `served` or `unserved`.
    fn match_requests(
        &self,
        requests: &[ServiceRequest<'_>],
        pool: &mut ResourcePool<'_>,
    ) -> Result<MatchOutcome, DispatchError>;
}
