//! Emergency dispatch engine.
//!
//! Assigns typed field resources (fire, police, medical units, ...) to
//! emergencies under per-type quantity requirements, distance cost and a
//! severity/wait-time priority. Emergencies that cannot be fully served in a
//! cycle are carried over in a backlog and retried in the next one.
//!
//! # Quick Start
//!
//! ```
//! use dispatch_core::{
//!     DispatchConfig, Dispatcher, EngineState, Emergency, Location, RequirementTable, Resource,
//! };
//!
//! let dispatcher = Dispatcher::new(DispatchConfig::default(), RequirementTable::builtin()).unwrap();
//! let mut state = EngineState::new();
//!
//! let emergencies = vec![Emergency::new(1, "fire", Location::new(10.0, 5.0), 2.0, 0)];
//! let mut resources = vec![
//!     Resource::new(100, "fire_unit", Location::new(0.0, 0.0)),
//!     Resource::new(101, "fire_unit", Location::new(5.0, 5.0)),
//!     Resource::new(102, "police_unit", Location::new(5.0, 5.0)),
//! ];
//!
//! let report = dispatcher.run_cycle(&mut state, &emergencies, &mut resources, 1_000).unwrap();
//! assert_eq!(report.assignments.len(), 3);
//! assert!(state.backlog.is_empty());
//! ```
//!
//! # Architecture
//!
//! - [`priority`]: linear and threshold scoring policies (lower score first)
//! - [`requirements`]: emergency type -> ordered resource needs
//! - [`pool`]: resource status transitions for one cycle
//! - [`matching`]: greedy nearest-neighbor and optimal assignment strategies
//! - [`backlog`]: carry-over queue and [`EngineState`]
//! - [`dispatcher`]: the cycle orchestrator; [`shared`] adds whole-cycle locking

pub mod backlog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod matching;
pub mod model;
pub mod pool;
pub mod priority;
pub mod requirements;
pub mod scenario;
pub mod shared;
pub mod spatial;
pub mod validation;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use backlog::{Backlog, EngineState};
pub use config::{DispatchConfig, SolverConfig, StrategyKind};
pub use dispatcher::{CycleReport, Dispatcher};
pub use error::{ConfigError, DispatchError, RequirementTableError, ValidationError};
pub use model::{Assignment, Emergency, EmergencyId, Resource, ResourceId, ResourceStatus};
pub use pool::{release_assigned, ResourcePool};
pub use priority::{PriorityPolicy, PriorityScore};
pub use requirements::{Requirement, RequirementTable};
pub use shared::SharedDispatcher;
pub use spatial::Location;
