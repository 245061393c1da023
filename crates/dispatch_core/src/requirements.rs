//! Requirement resolution: emergency type -> ordered (resource type, quantity) needs.
//!
//! The table is static configuration. It is validated once when loaded and is
//! read-only for every cycle afterwards. Lookups are exact string matches.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RequirementTableError;

/// Table shipped with the engine: fire, police and ems incidents.
pub const BUILTIN_REQUIREMENTS: &str = include_str!("data/requirements.json");

/// Upper bound on units of one type per emergency type.
pub const MAX_QUANTITY: i64 = 1_000;

/// One (resource type, quantity) need of an emergency type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub resource_type: String,
    pub quantity: u32,
}

impl Requirement {
    pub fn new(resource_type: impl Into<String>, quantity: u32) -> Self {
        Self {
            resource_type: resource_type.into(),
            quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRequirement {
    resource_type: String,
    quantity: i64,
}

/// Static mapping from emergency type to its ordered requirement list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementTable {
    entries: BTreeMap<String, Vec<Requirement>>,
}

impl RequirementTable {
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_REQUIREMENTS).expect("builtin requirement table should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, RequirementTableError> {
        let raw: BTreeMap<String, Vec<RawRequirement>> = serde_json::from_str(json)?;
        let entries = raw.into_iter().map(|(emergency_type, needs)| {
            let needs = needs
                .into_iter()
                .map(|need| (need.resource_type, need.quantity))
                .collect::<Vec<_>>();
            (emergency_type, needs)
        });
        Self::from_entries(entries)
    }

    pub fn from_file(path: &Path) -> Result<Self, RequirementTableError> {
        let contents = fs::read_to_string(path).map_err(|source| RequirementTableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Builds a table from `(emergency type, [(resource type, quantity)])` pairs.
    ///
    /// Quantities are taken as signed integers so that zero and negative counts
    /// are reported as configuration errors rather than silently clamped.
    pub fn from_entries<E, R>(entries: E) -> Result<Self, RequirementTableError>
    where
        E: IntoIterator<Item = (String, R)>,
        R: IntoIterator<Item = (String, i64)>,
    {
        let mut table = BTreeMap::new();
        for (emergency_type, needs) in entries {
            if emergency_type.trim().is_empty() {
                return Err(RequirementTableError::EmptyTypeTag);
            }
            let mut seen = HashSet::new();
            let mut resolved = Vec::new();
            for (resource_type, quantity) in needs {
                if resource_type.trim().is_empty() {
                    return Err(RequirementTableError::EmptyTypeTag);
                }
                if quantity <= 0 {
                    return Err(RequirementTableError::NonPositiveQuantity {
                        emergency_type,
                        resource_type,
                        quantity,
                    });
                }
                if quantity > MAX_QUANTITY {
                    return Err(RequirementTableError::QuantityTooLarge {
                        emergency_type,
                        resource_type,
                        quantity,
                    });
                }
                if !seen.insert(resource_type.clone()) {
                    return Err(RequirementTableError::DuplicateResourceType {
                        emergency_type,
                        resource_type,
                    });
                }
                // Bounded by MAX_QUANTITY above.
                resolved.push(Requirement::new(resource_type, quantity as u32));
            }
            if resolved.is_empty() {
                return Err(RequirementTableError::EmptyRequirements(emergency_type));
            }
            table.insert(emergency_type, resolved);
        }
        Ok(Self { entries: table })
    }

    /// Ordered needs for `emergency_type`, or `None` when the type is unserviceable.
    pub fn resolve(&self, emergency_type: &str) -> Option<&[Requirement]> {
        self.entries.get(emergency_type).map(Vec::as_slice)
    }

    /// Whether a resource of `resource_type` contributes to `emergency_type`.
    pub fn can_handle(&self, resource_type: &str, emergency_type: &str) -> bool {
        self.resolve(emergency_type)
            .is_some_and(|needs| needs.iter().any(|need| need.resource_type == resource_type))
    }

    /// Total number of units an emergency of this type consumes.
    pub fn unit_count(&self, emergency_type: &str) -> Option<usize> {
        self.resolve(emergency_type)
            .map(|needs| needs.iter().map(|need| need.quantity as usize).sum())
    }

    pub fn emergency_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
