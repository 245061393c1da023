use crate::error::DispatchError;
use crate::model::Assignment;
use crate::pool::ResourcePool;

use super::algorithm::MatchingStrategy;
use super::types::{MatchOutcome, ServiceRequest};

/// Greedy nearest-neighbor matching.
///
/// Requests are handled one at a time in priority order. For each required unit
/// the closest available resource of the right type is reserved (ties go to the
/// first one in the pool). If any unit cannot be found, every reservation made
/// for that request is rolled back and the request is reported unserved;
/// otherwise all reservations are committed together.
///
/// Time complexity: O(u * r) for u required units and r resources.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyMatching;

impl GreedyMatching {
    /// Reserves one resource per required unit. On failure, releases everything
    /// reserved so far and returns `None`.
    fn reserve_all(
        request: &ServiceRequest<'_>,
        pool: &mut ResourcePool<'_>,
    ) -> Result<Option<Vec<usize>>, DispatchError> {
        let emergency = request.emergency;
        let mut reserved = Vec::with_capacity(request.unit_count());

        for requirement in request.requirements {
            for _ in 0..requirement.quantity {
                match pool.nearest_available(&requirement.resource_type, emergency.location) {
                    Some(slot) => {
                        pool.reserve(slot)?;
                        reserved.push(slot);
                    }
                    None => {
                        for slot in reserved {
                            pool.release(slot)?;
                        }
                        return Ok(None);
                    }
                }
            }
        }
        Ok(Some(reserved))
    }
}

impl MatchingStrategy for GreedyMatching {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn match_requests(
        &self,
        requests: &[ServiceRequest<'_>],
        pool: &mut ResourcePool<'_>,
    ) -> Result<MatchOutcome, DispatchError> {
        let mut outcome = MatchOutcome::default();

        for (index, request) in requests.iter().enumerate() {
            let Some(reserved) = Self::reserve_all(request, pool)? else {
                outcome.unserved.push(index);
                continue;
            };

            for slot in reserved {
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
            outcome.served.push(index);
        }

        Ok(outcome)
    }
}
