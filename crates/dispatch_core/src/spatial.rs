//! Planar geometry for dispatch: locations and straight-line travel cost.
//!
//! Emergencies and resources share one flat coordinate system supplied by the
//! caller. Distance is Euclidean; no road network or projection is involved.

use serde::{Deserialize, Serialize};

/// A 2D coordinate.
///
/// Serialized as a two-element array `[x, y]` so payloads can carry plain
/// coordinate pairs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: Location) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Location {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Location> for (f64, f64) {
    fn from(location: Location) -> Self {
        (location.x, location.y)
    }
}
