//! Input checks for the adapter boundary.
//!
//! The engine trusts its inputs. Adapters call these before handing caller data
//! to a cycle.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::model::{Emergency, Resource};

pub fn validate_emergencies(emergencies: &[Emergency]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(emergencies.len());
    for emergency in emergencies {
        if !seen.insert(emergency.id) {
            return Err(ValidationError::DuplicateEmergency(emergency.id));
        }
        if !emergency.location.is_finite() {
            return Err(ValidationError::EmergencyLocation(emergency.id));
        }
        if !emergency.severity.is_finite() {
            return Err(ValidationError::EmergencySeverity(emergency.id));
        }
        if emergency.kind.trim().is_empty() {
            return Err(ValidationError::EmergencyType(emergency.id));
        }
    }
    Ok(())
}

pub fn validate_resources(resources: &[Resource]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(resources.len());
    for resource in resources {
        if !seen.insert(resource.id) {
            return Err(ValidationError::DuplicateResource(resource.id));
        }
        if !resource.location.is_finite() {
            return Err(ValidationError::ResourceLocation(resource.id));
        }
        if resource.kind.trim().is_empty() {
            return Err(ValidationError::ResourceType(resource.id));
        }
    }
    Ok(())
}
