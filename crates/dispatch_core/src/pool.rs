//! Mutable view over the resources supplied for one cycle.
//!
//! The pool borrows the caller's slice so status changes land in place. Slots
//! are positions in that slice; identities are only used for lookups and output.

use std::collections::HashMap;

use crate::error::DispatchError;
use crate::model::{Resource, ResourceId, ResourceStatus};
use crate::spatial::Location;

/// Number of resources in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub available: usize,
    pub reserved: usize,
    pub assigned: usize,
}

pub struct ResourcePool<'a> {
    resources: &'a mut [Resource],
    by_id: HashMap<ResourceId, usize>,
}

impl<'a> ResourcePool<'a> {
    pub fn new(resources: &'a mut [Resource]) -> Self {
        let mut by_id = HashMap::with_capacity(resources.len());
        for (slot, resource) in resources.iter().enumerate() {
            by_id.entry(resource.id).or_insert(slot);
        }
        Self { resources, by_id }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Resource> {
        self.resources.get(slot)
    }

    pub fn slot_of(&self, id: ResourceId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn by_id(&self, id: ResourceId) -> Option<&Resource> {
        self.slot_of(id).and_then(|slot| self.resources.get(slot))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Resource)> {
        self.resources.iter().enumerate()
    }

    /// Available resources of `kind`, in input order.
    pub fn available_of_type<'s>(
        &'s self,
        kind: &'s str,
    ) -> impl Iterator<Item = (usize, &'s Resource)> + 's {
        self.resources
            .iter()
            .enumerate()
            .filter(move |(_, resource)| resource.is_available() && resource.kind == kind)
    }

    /// Closest available resource of `kind` to `at`. Ties go to the first one seen.
    pub fn nearest_available(&self, kind: &str, at: Location) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (slot, resource) in self.available_of_type(kind) {
            let distance = resource.location.distance_to(at);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((slot, distance)),
            }
        }
        best.map(|(slot, _)| slot)
    }

    /// `available -> reserved`
    pub fn reserve(&mut self, slot: usize) -> Result<(), DispatchError> {
        self.transition(slot, ResourceStatus::Available, ResourceStatus::Reserved)
    }

    /// `reserved -> available` (rollback)
    pub fn release(&mut self, slot: usize) -> Result<(), DispatchError> {
        self.transition(slot, ResourceStatus::Reserved, ResourceStatus::Available)
    }

    /// `reserved -> assigned`
    pub fn commit(&mut self, slot: usize) -> Result<(), DispatchError> {
        self.transition(slot, ResourceStatus::Reserved, ResourceStatus::Assigned)
    }

    /// Returns an assigned resource to service. Callers do this between cycles;
    /// the matching strategies never do.
    pub fn release_assigned(&mut self, slot: usize) -> Result<(), DispatchError> {
        self.transition(slot, ResourceStatus::Assigned, ResourceStatus::Available)
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for resource in self.resources.iter() {
            match resource.status {
                ResourceStatus::Available => counts.available += 1,
                ResourceStatus::Reserved => counts.reserved += 1,
                ResourceStatus::Assigned => counts.assigned += 1,
            }
        }
        counts
    }

    fn transition(
        &mut self,
        slot: usize,
        from: ResourceStatus,
        to: ResourceStatus,
    ) -> Result<(), DispatchError> {
        let resource = self
            .resources
            .get_mut(slot)
            .ok_or(DispatchError::UnknownSlot(slot))?;
        if resource.status != from {
            return Err(DispatchError::IllegalTransition {
                id: resource.id,
                from: resource.status,
                to,
            });
        }
        resource.status = to;
        Ok(())
    }
}

/// Marks the listed resources `available` again if they are currently `assigned`.
/// Returns how many were released.
pub fn release_assigned(resources: &mut [Resource], ids: &[ResourceId]) -> usize {
    let mut released = 0;
    for resource in resources.iter_mut() {
        if resource.status == ResourceStatus::Assigned && ids.contains(&resource.id) {
            resource.status = ResourceStatus::Available;
            released += 1;
        }
    }
    released
}
