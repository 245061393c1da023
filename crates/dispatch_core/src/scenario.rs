//! Seeded scenario generation: random emergencies and resources for one cycle.
//!
//! Used by the CLI comparison sweep, the benchmarks and randomized tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{Emergency, Resource};
use crate::spatial::Location;

/// Default side length of the square service area.
const DEFAULT_EXTENT: f64 = 100.0;

/// Default oldest emergency age: 30 minutes.
const DEFAULT_MAX_AGE_MS: u64 = 30 * 60 * 1000;

/// Parameters for generating one cycle's input.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub num_emergencies: usize,
    pub num_resources: usize,
    /// Locations are uniform in `[0, extent) x [0, extent)`.
    pub extent: f64,
    /// Severities are uniform in `[0, max_severity)`, rounded to one decimal.
    pub max_severity: f64,
    pub max_age_ms: u64,
    /// Clock reading the cycle runs at; timestamps fall in `[now - max_age, now]`.
    pub now_ms: u64,
    pub seed: Option<u64>,
    /// First emergency id; resources are numbered from `first_id + num_emergencies`.
    pub first_id: u64,
    pub emergency_types: Vec<String>,
    pub resource_types: Vec<String>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            num_emergencies: 10,
            num_resources: 20,
            extent: DEFAULT_EXTENT,
            max_severity: 8.0,
            max_age_ms: DEFAULT_MAX_AGE_MS,
            now_ms: DEFAULT_MAX_AGE_MS,
            seed: None,
            first_id: 1,
            emergency_types: vec!["fire".into(), "police".into(), "ems".into()],
            resource_types: vec!["fire_unit".into(), "police_unit".into(), "ems_unit".into()],
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_counts(mut self, emergencies: usize, resources: usize) -> Self {
        self.num_emergencies = emergencies;
        self.num_resources = resources;
        self
    }

    pub fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_now_ms(mut self, now_ms: u64) -> Self {
        self.now_ms = now_ms;
        self
    }

    pub fn with_first_id(mut self, first_id: u64) -> Self {
        self.first_id = first_id;
        self
    }
}

/// Inputs of one generated cycle.
#[derive(Debug, Clone, Default)]
pub struct GeneratedCycle {
    pub now_ms: u64,
    pub emergencies: Vec<Emergency>,
    pub resources: Vec<Resource>,
}

fn random_location(rng: &mut StdRng, extent: f64) -> Location {
    if extent <= 0.0 {
        return Location::default();
    }
    Location::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent))
}

fn pick<'a>(rng: &mut StdRng, choices: &'a [String]) -> &'a str {
    if choices.is_empty() {
        return "";
    }
    &choices[rng.gen_range(0..choices.len())]
}

/// Builds one cycle's emergencies and resources from `params`.
pub fn build_cycle(params: &ScenarioParams) -> GeneratedCycle {
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let emergencies = (0..params.num_emergencies)
        .map(|i| {
            let severity = if params.max_severity > 0.0 {
                (rng.gen_range(0.0..params.max_severity) * 10.0).round() / 10.0
            } else {
                0.0
            };
            let age_ms = rng.gen_range(0..=params.max_age_ms);
            Emergency::new(
                params.first_id + i as u64,
                pick(&mut rng, &params.emergency_types),
                random_location(&mut rng, params.extent),
                severity,
                params.now_ms.saturating_sub(age_ms),
            )
        })
        .collect();

    let resource_base = params.first_id + params.num_emergencies as u64;
    let resources = (0..params.num_resources)
        .map(|i| {
            Resource::new(
                resource_base + i as u64,
                pick(&mut rng, &params.resource_types),
                random_location(&mut rng, params.extent),
            )
        })
        .collect();

    GeneratedCycle {
        now_ms: params.now_ms,
        emergencies,
        resources,
    }
}
