//! Solver configuration.
//!
//! Every knob has a default tuned for weekly personal schedules, so a
//! call with only a budget uses [`SolverConfig::default`]. Configurations
//! are plain data and can be loaded from JSON or MessagePack.
//!
//! # Defaults
//!
//! | Parameter | Default |
//! |-----------|---------|
//! | population_size | 160 |
//! | selection | tournament of 4 |
//! | crossover_rate | 0.8 |
//! | mutation_probability | 0.28 |
//! | elite_count | 2 |
//! | seed | `0x5EED_5107` |
//! | max_stale_generations | none |

use serde::{Deserialize, Serialize};

use super::operators::GeneticOperators;
use super::selection::SelectionStrategy;
use crate::error::ConfigError;

/// Default RNG seed; a fixed seed makes solves reproducible.
pub const DEFAULT_SEED: u64 = 0x5EED_5107;

/// Generational solver configuration.
///
/// # Example
/// ```
/// use u_slot_evolve::ga::{SelectionStrategy, SolverConfig};
///
/// let config = SolverConfig::default()
///     .with_population_size(64)
///     .with_selection(SelectionStrategy::Tournament { size: 3 })
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Individuals per generation (constant for the whole solve).
    pub population_size: usize,
    pub selection: SelectionStrategy,
    /// Probability that a parent pair is recombined rather than copied.
    pub crossover_rate: f64,
    /// Probability that an offspring is mutated.
    pub mutation_probability: f64,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    pub seed: u64,
    /// Stop after this many generations without improvement.
    pub max_stale_generations: Option<u64>,
    pub operators: GeneticOperators,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            population_size: 160,
            selection: SelectionStrategy::default(),
            crossover_rate: 0.8,
            mutation_probability: 0.28,
            elite_count: 2,
            seed: DEFAULT_SEED,
            max_stale_generations: None,
            operators: GeneticOperators::default(),
        }
    }
}

impl SolverConfig {
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_selection(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_mutation_probability(mut self, probability: f64) -> Self {
        self.mutation_probability = probability;
        self
    }

    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_stale_generations(mut self, limit: u64) -> Self {
        self.max_stale_generations = Some(limit);
        self
    }

    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Checks sizes and probabilities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if matches!(self.selection, SelectionStrategy::Tournament { size: 0 }) {
            return Err(ConfigError::EmptyTournament);
        }
        if self.elite_count >= self.population_size && self.population_size > 1 {
            return Err(ConfigError::TooManyElites {
                elite_count: self.elite_count,
                population_size: self.population_size,
            });
        }
        for (name, value) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_probability", self.mutation_probability),
            ("idle_bias", self.operators.idle_bias),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        Ok(())
    }
}
