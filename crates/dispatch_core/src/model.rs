//! Value types exchanged with the dispatch engine.
//!
//! Emergencies are immutable once created. Resources carry a mutable
//! [`ResourceStatus`] that only the matching strategies change during a cycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spatial::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmergencyId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl fmt::Display for EmergencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// An incident waiting for typed resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emergency {
    pub id: EmergencyId,
    pub location: Location,
    /// Higher is more urgent.
    pub severity: f64,
    /// Category tag looked up in the requirement table.
    #[serde(rename = "type")]
    pub kind: String,
    /// Creation time (epoch milliseconds).
    pub timestamp_ms: u64,
}

impl Emergency {
    pub fn new(
        id: u64,
        kind: impl Into<String>,
        location: Location,
        severity: f64,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            id: EmergencyId(id),
            location,
            severity,
            kind: kind.into(),
            timestamp_ms,
        }
    }

    /// Seconds elapsed since creation. Clamped at zero for timestamps in the future.
    pub fn age_secs(&self, now_ms: u64) -> f64 {
        now_ms.saturating_sub(self.timestamp_ms) as f64 / 1000.0
    }
}

/// Availability of a dispatchable unit.
///
/// `Available -> Reserved -> Assigned` is the commit path; `Reserved -> Available`
/// is the rollback path. The engine never leaves `Assigned` on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    #[default]
    Available,
    Reserved,
    Assigned,
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceStatus::Available => "available",
            ResourceStatus::Reserved => "reserved",
            ResourceStatus::Assigned => "assigned",
        };
        f.write_str(label)
    }
}

/// A dispatchable unit (fire engine, patrol car, ambulance, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub location: Location,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: ResourceStatus,
}

impl Resource {
    /// A new resource in the `available` state.
    pub fn new(id: u64, kind: impl Into<String>, location: Location) -> Self {
        Self {
            id: ResourceId(id),
            location,
            kind: kind.into(),
            status: ResourceStatus::Available,
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_available(&self) -> bool {
        self.status == ResourceStatus::Available
    }
}

/// One committed pairing of a resource to an emergency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub emergency_id: EmergencyId,
    pub resource_id: ResourceId,
    pub emergency_location: Location,
}
