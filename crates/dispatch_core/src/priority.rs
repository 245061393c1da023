//! Priority scoring for emergencies.
//!
//! Scores follow the dispatching convention: **lower score = dispatched first**.
//! Two policies exist and they are not interchangeable, so a deployment picks
//! one explicitly through [`PriorityPolicy`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::Emergency;

/// Default severity weight of the threshold policy.
pub const DEFAULT_SEVERITY_WEIGHT: f64 = 1000.0;
/// Default weight per second of age for the threshold policy.
pub const DEFAULT_TIME_WEIGHT: f64 = 0.1;
/// Severity at or above which an emergency is always dispatched first.
pub const DEFAULT_CRITICAL_SEVERITY: f64 = 6.0;
/// Top of the severity scale assumed by the linear policy.
pub const DEFAULT_MAX_SEVERITY: f64 = 10.0;

/// Totally ordered priority key. Lower sorts first.
#[derive(Debug, Clone, Copy)]
pub struct PriorityScore(pub f64);

impl PriorityScore {
    /// Score given to critical emergencies under the threshold policy.
    pub const CRITICAL: PriorityScore = PriorityScore(f64::NEG_INFINITY);

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_critical(self) -> bool {
        self.0 == f64::NEG_INFINITY
    }
}

impl PartialEq for PriorityScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityScore {}

impl PartialOrd for PriorityScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// How emergencies are ranked within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PriorityPolicy {
    /// `severity_weight * (max_severity - severity) + time_weight * age_secs`.
    Linear {
        severity_weight: f64,
        time_weight: f64,
        max_severity: f64,
    },
    /// Severity at or above `critical_severity` scores [`PriorityScore::CRITICAL`];
    /// everything else scores `-(severity_weight * severity + time_weight * age_secs)`.
    Threshold {
        severity_weight: f64,
        time_weight: f64,
        critical_severity: f64,
    },
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self::threshold(
            DEFAULT_SEVERITY_WEIGHT,
            DEFAULT_TIME_WEIGHT,
            DEFAULT_CRITICAL_SEVERITY,
        )
    }
}

impl PriorityPolicy {
    pub fn linear(severity_weight: f64, time_weight: f64, max_severity: f64) -> Self {
        Self::Linear {
            severity_weight,
            time_weight,
            max_severity,
        }
    }

    pub fn threshold(severity_weight: f64, time_weight: f64, critical_severity: f64) -> Self {
        Self::Threshold {
            severity_weight,
            time_weight,
            critical_severity,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "linear",
            Self::Threshold { .. } => "threshold",
        }
    }

    /// Scores one emergency at `now_ms`.
    pub fn score(&self, emergency: &Emergency, now_ms: u64) -> PriorityScore {
        let age = emergency.age_secs(now_ms);
        match *self {
            Self::Linear {
                severity_weight,
                time_weight,
                max_severity,
            } => PriorityScore(
                severity_weight * (max_severity - emergency.severity) + time_weight * age,
            ),
            Self::Threshold {
                severity_weight,
                time_weight,
                critical_severity,
            } => {
                if emergency.severity >= critical_severity {
                    PriorityScore::CRITICAL
                } else {
                    PriorityScore(-(severity_weight * emergency.severity + time_weight * age))
                }
            }
        }
    }

    /// Whether the emergency bypasses normal ranking. Only the threshold policy has one.
    pub fn is_critical(&self, emergency: &Emergency) -> bool {
        match *self {
            Self::Linear { .. } => false,
            Self::Threshold {
                critical_severity, ..
            } => emergency.severity >= critical_severity,
        }
    }

    /// Stable sort by score; equal scores keep their input order.
    pub fn sort(&self, emergencies: &mut [Emergency], now_ms: u64) {
        emergencies.sort_by_cached_key(|emergency| self.score(emergency, now_ms));
    }

    pub(crate) fn weights(&self) -> [(&'static str, f64); 3] {
        match *self {
            Self::Linear {
                severity_weight,
                time_weight,
                max_severity,
            } => [
                ("priority.severity_weight", severity_weight),
                ("priority.time_weight", time_weight),
                ("priority.max_severity", max_severity),
            ],
            Self::Threshold {
                severity_weight,
                time_weight,
                critical_severity,
            } => [
                ("priority.severity_weight", severity_weight),
                ("priority.time_weight", time_weight),
                ("priority.critical_severity", critical_severity),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Location;

    const NOW_MS: u64 = 1_000_000;

    fn emergency(id: u64, severity: f64, age_secs: u64) -> Emergency {
        Emergency::new(id, "fire", Location::default(), severity, NOW_MS - age_secs * 1000)
    }

    #[test]
    fn linear_policy_matches_formula() {
        let policy = PriorityPolicy::linear(10.0, 1.0, 10.0);
        let a = policy.score(&emergency(1, 5.0, 10), NOW_MS);
        let b = policy.score(&emergency(2, 3.0, 100), NOW_MS);
        assert!((a.value() - 60.0).abs() < 1e-9);
        assert!((b.value() - 170.0).abs() < 1e-9);
        assert!(a < b);
    }

    #[test]
    fn threshold_policy_puts_critical_first() {
        let policy = PriorityPolicy::default();
        let critical = policy.score(&emergency(1, 6.0, 0), NOW_MS);
        let severe_and_old = policy.score(&emergency(2, 5.9, 100_000), NOW_MS);
        assert!(critical.is_critical());
        assert!(critical < severe_and_old);
        assert!(policy.is_critical(&emergency(3, 7.5, 0)));
        assert!(!PriorityPolicy::linear(1.0, 1.0, 10.0).is_critical(&emergency(3, 7.5, 0)));
    }

    #[test]
    fn threshold_policy_prefers_higher_severity_then_age() {
        let policy = PriorityPolicy::default();
        let mut list = vec![
            emergency(3, 3.0, 30),
            emergency(4, 5.0, 10),
            emergency(5, 3.0, 100),
        ];
        policy.sort(&mut list, NOW_MS);
        let order: Vec<u64> = list.iter().map(|e| e.id.0).collect();
        assert_eq!(order, vec![4, 5, 3]);
    }

    #[test]
    fn sort_is_stable_for_equal_scores() {
        let policy = PriorityPolicy::default();
        let mut list = vec![
            emergency(9, 8.0, 5),
            emergency(2, 2.0, 5),
            emergency(7, 9.0, 50),
            emergency(1, 2.0, 5),
        ];
        policy.sort(&mut list, NOW_MS);
        let order: Vec<u64> = list.iter().map(|e| e.id.0).collect();
        // Critical ones keep arrival order among themselves.
        assert_eq!(order, vec![9, 7, 2, 1]);
    }

    #[test]
    fn policy_deserializes_from_tagged_json() {
        let policy: PriorityPolicy = serde_json::from_str(
            r#"{"policy": "linear", "severity_weight": 10.0, "time_weight": 1.0, "max_severity": 10.0}"#,
        )
        .expect("linear policy json");
        assert_eq!(policy, PriorityPolicy::linear(10.0, 1.0, 10.0));
        assert_eq!(policy.name(), "linear");
    }
}
