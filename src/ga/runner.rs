//! Generational loop.
//!
//! # Algorithm
//!
//! 1. Seed and evaluate `population_size` individuals (generation 0).
//! 2. On entry to each generation, ask the [`TerminationController`]
//!    whether the budget allows another one.
//! 3. Breed: copy the elites, then fill the rest with (optionally
//!    recombined, optionally mutated) copies of selected parents.
//!    Offspring with an invalidated fitness cache are re-evaluated.
//! 4. Replace the population and offer every member to the
//!    [`BestSolutionTracker`].
//!
//! All randomness comes from one ChaCha stream seeded by
//! [`SolverConfig::seed`], so the same problem, configuration and
//! generation count always produce the same best individual.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, trace};

use super::config::SolverConfig;
use super::fitness::Fitness;
use super::population::{Population, fitness_of};
use super::termination::{TerminationController, TerminationState};
use super::tracker::BestSolutionTracker;
use super::types::{GaProblem, Individual};
use crate::error::{SelectionError, SolveError};

/// Progress snapshot handed to the observer after every generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationReport {
    /// Completed generations (0 right after seeding).
    pub generation: u64,
    pub population_size: usize,
    /// Best fitness within the current population.
    pub population_best: Fitness,
    /// Best fitness seen across all generations.
    pub best_so_far: Fitness,
    /// Whether this generation improved the best so far.
    pub improved: bool,
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct GaResult<I> {
    /// Best individual seen, absent only when nothing was evaluated.
    pub best: Option<I>,
    pub best_fitness: Option<Fitness>,
    /// Completed generations.
    pub generations: u64,
    /// Why the loop stopped.
    pub termination: TerminationState,
    /// Number of best-so-far improvements.
    pub improvements: u64,
    pub elapsed: Duration,
}

/// Runs the generational loop for any [`GaProblem`].
pub struct GaRunner;

impl GaRunner {
    /// Runs until the controller reports a terminal state.
    pub fn run<P: GaProblem>(
        problem: &P,
        config: &SolverConfig,
        termination: TerminationController,
    ) -> Result<GaResult<P::Individual>, SolveError> {
        Self::run_with_observer(problem, config, termination, |_| {})
    }

    /// Like [`run`](Self::run), calling `observer` after seeding and after
    /// every generation.
    #[instrument(
        level = "debug",
        skip_all,
        fields(population = config.population_size, seed = config.seed)
    )]
    pub fn run_with_observer<P, F>(
        problem: &P,
        config: &SolverConfig,
        mut termination: TerminationController,
        mut observer: F,
    ) -> Result<GaResult<P::Individual>, SolveError>
    where
        P: GaProblem,
        F: FnMut(&GenerationReport),
    {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut population = Population::seed(problem, config.population_size, &mut rng);
        let mut tracker = BestSolutionTracker::new();

        let improved = offer_all(&mut tracker, &population);
        observer(&report(&population, &tracker, improved));

        let state = loop {
            let generation = population.generation();
            let state = termination.check(generation, tracker.stale_generations(generation));
            if state.is_terminal() {
                break state;
            }

            let offspring = breed(problem, &population, config, &mut rng)?;
            population.replace(offspring);

            let improved = offer_all(&mut tracker, &population);
            let snapshot = report(&population, &tracker, improved);
            if improved {
                debug!(
                    generation = snapshot.generation,
                    feasible = snapshot.best_so_far.feasible,
                    score = snapshot.best_so_far.score,
                    violation = snapshot.best_so_far.violation,
                    "best improved"
                );
            }
            trace!(
                generation = snapshot.generation,
                population_best = snapshot.population_best.score,
                "generation complete"
            );
            problem.on_generation(snapshot.generation, snapshot.best_so_far);
            observer(&snapshot);
        };

        let elapsed = termination.elapsed();
        debug!(
            generations = population.generation(),
            improvements = tracker.improvements(),
            termination = ?state,
            elapsed_ms = elapsed.as_millis() as u64,
            "run finished"
        );

        Ok(GaResult {
            best_fitness: tracker.best_fitness(),
            improvements: tracker.improvements(),
            best: tracker.into_best(),
            generations: population.generation(),
            termination: state,
            elapsed,
        })
    }
}

/// Builds the next generation: elites first, then offspring.
fn breed<P, R>(
    problem: &P,
    population: &Population<P::Individual>,
    config: &SolverConfig,
    rng: &mut R,
) -> Result<Vec<P::Individual>, SelectionError>
where
    P: GaProblem,
    R: Rng,
{
    let size = population.size();
    let mut next = population.elites(config.elite_count.min(size));
    let pool = config.selection.pool(population.members())?;

    while next.len() < size {
        let parents = pool.select(2, rng);
        let (a, b) = (parents[0], parents[1]);
        let children = if rng.random_bool(config.crossover_rate) {
            problem.crossover(a, b, rng)
        } else {
            vec![a.clone(), b.clone()]
        };

        for mut child in children {
            if next.len() == size {
                break;
            }
            if rng.random_bool(config.mutation_probability) {
                problem.mutate(&mut child, rng);
                child.invalidate();
            }
            if child.fitness().is_none() {
                let fitness = problem.evaluate(&child);
                child.set_fitness(fitness);
            }
            debug_assert!(problem.is_valid(&child));
            next.push(child);
        }
    }
    Ok(next)
}

fn offer_all<I: Individual>(tracker: &mut BestSolutionTracker<I>, population: &Population<I>) -> bool {
    let generation = population.generation();
    population
        .members()
        .iter()
        .fold(false, |improved, m| tracker.consider(m, generation) | improved)
}

fn report<I: Individual>(
    population: &Population<I>,
    tracker: &BestSolutionTracker<I>,
    improved: bool,
) -> GenerationReport {
    let population_best = population.best().map_or_else(Fitness::worst, fitness_of);
    GenerationReport {
        generation: population.generation(),
        population_size: population.len(),
        population_best,
        best_so_far: tracker.best_fitness().unwrap_or(population_best),
        improved,
    }
}
