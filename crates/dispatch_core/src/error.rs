use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::{EmergencyId, ResourceId, ResourceStatus};

/// Failures loading a requirement table. Always fatal at load time.
#[derive(Debug, Error)]
pub enum RequirementTableError {
    #[error("failed to parse requirement table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read requirement table from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("emergency type {emergency_type:?} requires {quantity} x {resource_type:?}; quantities must be positive")]
    NonPositiveQuantity {
        emergency_type: String,
        resource_type: String,
        quantity: i64,
    },
    #[error("emergency type {emergency_type:?} requires {quantity} x {resource_type:?}, which exceeds the supported maximum")]
    QuantityTooLarge {
        emergency_type: String,
        resource_type: String,
        quantity: i64,
    },
    #[error("emergency type {0:?} has an empty requirement list")]
    EmptyRequirements(String),
    #[error("emergency type {emergency_type:?} lists resource type {resource_type:?} more than once")]
    DuplicateResourceType {
        emergency_type: String,
        resource_type: String,
    },
    #[error("requirement table contains an empty type tag")]
    EmptyTypeTag,
}

/// Resource pool invariant violations. These indicate an engine bug, not bad input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("resource {id} cannot move from {from} to {to}")]
    IllegalTransition {
        id: ResourceId,
        from: ResourceStatus,
        to: ResourceStatus,
    },
    #[error("resource slot {0} is out of range for this pool")]
    UnknownSlot(usize),
}

/// Engine configuration rejected before any cycle runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse dispatch config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown matching strategy {0:?} (expected \"greedy\" or \"optimal\")")]
    UnknownStrategy(String),
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("solver node budget must be at least 1")]
    ZeroNodeBudget,
    #[error("solver time budget must be at least 1 ms")]
    ZeroTimeBudget,
}

/// Shape problems in caller-supplied emergencies or resources.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("emergency id {0} appears more than once")]
    DuplicateEmergency(EmergencyId),
    #[error("resource id {0} appears more than once")]
    DuplicateResource(ResourceId),
    #[error("emergency {0} has a non-finite location")]
    EmergencyLocation(EmergencyId),
    #[error("emergency {0} has a non-finite severity")]
    EmergencySeverity(EmergencyId),
    #[error("emergency {0} has an empty type tag")]
    EmergencyType(EmergencyId),
    #[error("resource {0} has a non-finite location")]
    ResourceLocation(ResourceId),
    #[error("resource {0} has an empty type tag")]
    ResourceType(ResourceId),
}
