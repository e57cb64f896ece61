//! Evolutionary slot scheduling.
//!
//! A generic generational engine ([`GaRunner`] over [`GaProblem`]) and
//! the slot-indexed encoding that plugs into it ([`SlotGaProblem`]).
//!
//! # Encoding
//!
//! One gene per candidate start slot; the allele names the floating
//! activity that starts there, or idle. See [`candidate_slots`] for how
//! candidate slots are derived.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable crossover and mutation strategies
//! - [`fitness`]: Two-tier fitness and the schedule evaluator
//! - [`termination`]: Generation/time/stagnation budget
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Deb (2000), "An efficient constraint handling method for genetic algorithms"

pub mod candidate_slots;
mod chromosome;
mod config;
pub mod fitness;
pub mod operators;
mod population;
mod problem;
mod runner;
mod selection;
pub mod termination;
mod tracker;
mod types;

pub use candidate_slots::{FloatingInfo, SlotLayout};
pub use chromosome::{
    SlotChromosome, reset_mutation, shift_mutation, single_point_crossover, swap_mutation,
    two_point_crossover, uniform_crossover,
};
pub use config::{DEFAULT_SEED, SolverConfig};
pub use fitness::{Fitness, SlotFitnessEvaluator};
pub use operators::{CrossoverType, GeneticOperators, MutationType};
pub use population::Population;
pub use problem::SlotGaProblem;
pub use runner::{GaResult, GaRunner, GenerationReport};
pub use selection::{ParentPool, SelectionStrategy};
pub use termination::{Budget, TerminationController, TerminationState};
pub use tracker::BestSolutionTracker;
pub use types::{GaProblem, Individual};
