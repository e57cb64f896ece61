//! Core trait definitions for the generational engine.
//!
//! The two central traits, [`Individual`] and [`GaProblem`], define the
//! contract between the generic engine (population, selection,
//! termination, best tracking) and a domain-specific encoding. The slot
//! scheduler in [`super::problem`] is one implementation; other domains
//! plug in by implementing the same pair.

use rand::Rng;

use super::fitness::Fitness;

/// A candidate solution in the population.
///
/// Individuals cache their own fitness. The engine calls
/// [`GaProblem::evaluate`] for every individual whose cache is empty and
/// stores the result via [`set_fitness`](Individual::set_fitness).
pub trait Individual: Clone + Send + Sync {
    /// Cached fitness, `None` when not yet evaluated or invalidated.
    fn fitness(&self) -> Option<Fitness>;

    /// Stores the evaluated fitness.
    fn set_fitness(&mut self, fitness: Fitness);

    /// Drops the cached fitness after a structural change.
    fn invalidate(&mut self);
}

/// Defines an optimization problem for the generational engine.
///
/// It covers:
///
/// 1. **Initialization**: how to seed individuals
/// 2. **Evaluation**: how to score an individual (must be deterministic)
/// 3. **Crossover**: how to recombine two parents
/// 4. **Mutation**: how to perturb an individual
///
/// All randomness comes from the `rng` argument; implementations must not
/// reach for thread-local or global generators.
pub trait GaProblem: Send + Sync {
    /// The individual (solution) type for this problem.
    type Individual: Individual;

    /// Creates the `index`-th seed individual.
    ///
    /// The result must be structurally valid but need not be feasible.
    fn create_individual<R: Rng>(&self, index: usize, rng: &mut R) -> Self::Individual;

    /// Evaluates an individual.
    ///
    /// Must not depend on wall-clock time, randomness, or hash ordering.
    fn evaluate(&self, individual: &Self::Individual) -> Fitness;

    /// Whether the individual satisfies the encoding's structural invariants.
    fn is_valid(&self, individual: &Self::Individual) -> bool;

    /// Produces one or two offspring by recombining two parents.
    ///
    /// The default implementation clones parent1 (no crossover).
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        _parent2: &Self::Individual,
        _rng: &mut R,
    ) -> Vec<Self::Individual> {
        vec![parent1.clone()]
    }

    /// Mutates an individual in place.
    ///
    /// The default implementation is a no-op.
    fn mutate<R: Rng>(&self, _individual: &mut Self::Individual, _rng: &mut R) {}

    /// Called at the end of each generation with the best fitness so far.
    fn on_generation(&self, _generation: u64, _best_fitness: Fitness) {}
}
