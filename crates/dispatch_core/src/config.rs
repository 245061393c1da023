//! Engine configuration: strategy selection, priority policy and solver constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::priority::PriorityPolicy;

/// Multiplier turning distances and scores into integer coefficients.
pub const DEFAULT_SCALE: f64 = 1000.0;
/// Priority reward multiplier relative to distance cost.
pub const DEFAULT_PRIORITY_WEIGHT: f64 = 1000.0;
/// Reward value of a critical emergency before scaling.
pub const DEFAULT_CRITICAL_SCORE: f64 = 1e8;
/// Search nodes the optimal solver may visit per cycle.
pub const DEFAULT_NODE_BUDGET: u64 = 200_000;
/// Wall-clock milliseconds the optimal solver may spend per cycle.
pub const DEFAULT_TIME_BUDGET_MS: u64 = 2_000;

/// Which matching strategy a deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Greedy,
    #[default]
    Optimal,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Greedy => f.write_str("greedy"),
            StrategyKind::Optimal => f.write_str("optimal"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(StrategyKind::Greedy),
            "optimal" => Ok(StrategyKind::Optimal),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Constants of the optimal assignment formulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub scale: f64,
    pub priority_weight: f64,
    pub critical_score: f64,
    pub node_budget: u64,
    /// The solver gives up once this much wall-clock time has passed.
    pub time_budget_ms: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            priority_weight: DEFAULT_PRIORITY_WEIGHT,
            critical_score: DEFAULT_CRITICAL_SCORE,
            node_budget: DEFAULT_NODE_BUDGET,
            time_budget_ms: DEFAULT_TIME_BUDGET_MS,
        }
    }
}

/// Full engine configuration.
///
/// ```
/// use dispatch_core::config::{DispatchConfig, StrategyKind};
///
/// let config = DispatchConfig::from_json_str(r#"{"strategy": "greedy"}"#).unwrap();
/// assert_eq!(config.strategy, StrategyKind::Greedy);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub strategy: StrategyKind,
    pub priority: PriorityPolicy,
    pub solver: SolverConfig,
}

impl DispatchConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DispatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_priority(mut self, priority: PriorityPolicy) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.priority.weights() {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }
        let positive = [
            ("solver.scale", self.solver.scale),
            ("solver.priority_weight", self.solver.priority_weight),
            ("solver.critical_score", self.solver.critical_score),
        ];
        for (name, value) in positive {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.solver.node_budget == 0 {
            return Err(ConfigError::ZeroNodeBudget);
        }
        if self.solver.time_budget_ms == 0 {
            return Err(ConfigError::ZeroTimeBudget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DispatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategy, StrategyKind::Optimal);
        assert_eq!(config.priority.name(), "threshold");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = DispatchConfig::from_json_str(
            r#"{
                "priority": {"policy": "linear", "severity_weight": 10.0, "time_weight": 1.0, "max_severity": 10.0},
                "solver": {"node_budget": 50}
            }"#,
        )
        .expect("config");
        assert_eq!(config.priority, PriorityPolicy::linear(10.0, 1.0, 10.0));
        assert_eq!(config.solver.node_budget, 50);
        assert_eq!(config.solver.scale, DEFAULT_SCALE);
        assert_eq!(config.solver.time_budget_ms, DEFAULT_TIME_BUDGET_MS);
    }

    #[test]
    fn rejects_bad_solver_constants() {
        let zero_budget = DispatchConfig::default().with_solver(SolverConfig {
            node_budget: 0,
            ..SolverConfig::default()
        });
        assert!(matches!(zero_budget.validate(), Err(ConfigError::ZeroNodeBudget)));

        let zero_time = DispatchConfig::default().with_solver(SolverConfig {
            time_budget_ms: 0,
            ..SolverConfig::default()
        });
        assert!(matches!(zero_time.validate(), Err(ConfigError::ZeroTimeBudget)));

        let negative_scale = DispatchConfig::default().with_solver(SolverConfig {
            scale: -1.0,
            ..SolverConfig::default()
        });
        assert!(matches!(
            negative_scale.validate(),
            Err(ConfigError::NonPositive {
                name: "solver.scale",
                ..
            })
        ));

        let nan_weight =
            DispatchConfig::default().with_priority(PriorityPolicy::linear(f64::NAN, 1.0, 10.0));
        assert!(matches!(nan_weight.validate(), Err(ConfigError::NonFinite { .. })));
    }

    #[test]
    fn strategy_parses_from_str() {
        assert_eq!("Greedy".parse::<StrategyKind>().ok(), Some(StrategyKind::Greedy));
        assert!("hungarian".parse::<StrategyKind>().is_err());
    }
}
