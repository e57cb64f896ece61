//! Slot scheduling GA problem definition.
//!
//! Implements [`GaProblem`] for the slot-indexed encoding. Bridges the
//! domain [`Problem`] to the generic engine: seeding, evaluation,
//! operators, and decoding the winner into a [`Schedule`].
//!
//! # Seeding
//!
//! - Individual 0 is all-idle (the empty schedule, always hard-feasible
//!   unless fixed activities or frequency minimums already break a rule).
//! - Every other individual is, with equal odds, a greedy non-overlapping
//!   packing or a sparse random chromosome whose fill rate matches one
//!   placement per `mean duration + 1` slots.

use rand::Rng;

use super::candidate_slots::SlotLayout;
use super::chromosome::SlotChromosome;
use super::fitness::{Fitness, SlotFitnessEvaluator};
use super::operators::GeneticOperators;
use super::types::GaProblem;
use crate::error::SeedError;
use crate::models::{Placement, Problem, Schedule};

/// GA problem definition for slot scheduling.
///
/// # Example
/// ```
/// use u_slot_evolve::ga::{GaProblem, GeneticOperators, SlotGaProblem};
/// use u_slot_evolve::models::{Activity, Problem};
/// use rand::SeedableRng;
///
/// let problem = Problem::new(96).with_activity(Activity::floating(0, 4));
/// let ga = SlotGaProblem::new(&problem, GeneticOperators::default()).unwrap();
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
/// let seed = ga.create_individual(0, &mut rng);
/// assert!(ga.evaluate(&seed).feasible);
/// ```
#[derive(Debug, Clone)]
pub struct SlotGaProblem<'p> {
    layout: SlotLayout,
    evaluator: SlotFitnessEvaluator<'p>,
    operators: GeneticOperators,
}

impl<'p> SlotGaProblem<'p> {
    /// Prepares the layout and evaluator of `problem`.
    pub fn new(problem: &'p Problem, operators: GeneticOperators) -> Result<Self, SeedError> {
        let layout = SlotLayout::from_problem(problem)?;
        Ok(Self {
            layout,
            evaluator: SlotFitnessEvaluator::new(problem),
            operators,
        })
    }

    /// The gene layout.
    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    /// The domain problem.
    pub fn problem(&self) -> &'p Problem {
        self.evaluator.problem()
    }

    /// Fill rate of sparse random seeds.
    fn sparse_fill_rate(&self) -> f64 {
        1.0 / (self.layout.mean_duration() + 1.0)
    }

    /// Decodes a chromosome into a schedule with its breaches listed.
    pub fn to_schedule(&self, chromosome: &SlotChromosome) -> Schedule {
        let placements = chromosome.placements(&self.layout);
        let (fitness, violations) = self.evaluator.explain(&placements);
        let activities = &self.problem().activities;

        let mut schedule = Schedule::new();
        for (idx, start) in placements {
            let act = &activities[idx];
            schedule.add_placement(Placement::new(act.id, start, act.duration_slots));
        }
        schedule.normalize();
        schedule.feasible = fitness.feasible;
        schedule.score = fitness.score;
        schedule.violation = fitness.violation;
        schedule.breaches = fitness.breaches;
        schedule.violations = violations;
        schedule
    }
}

impl GaProblem for SlotGaProblem<'_> {
    type Individual = SlotChromosome;

    fn create_individual<R: Rng>(&self, index: usize, rng: &mut R) -> SlotChromosome {
        if index == 0 {
            return SlotChromosome::idle(&self.layout);
        }
        if rng.random_bool(0.5) {
            let fill = rng.random_range(0.2..=1.0);
            SlotChromosome::greedy(&self.layout, fill, rng)
        } else {
            SlotChromosome::random(&self.layout, self.sparse_fill_rate(), rng)
        }
    }

    fn evaluate(&self, individual: &SlotChromosome) -> Fitness {
        self.evaluator.evaluate(&individual.placements(&self.layout))
    }

    fn is_valid(&self, individual: &SlotChromosome) -> bool {
        individual.is_valid(&self.layout)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &SlotChromosome,
        parent2: &SlotChromosome,
        rng: &mut R,
    ) -> Vec<SlotChromosome> {
        let (c1, c2) = self.operators.crossover(parent1, parent2, rng);
        vec![c1, c2]
    }

    fn mutate<R: Rng>(&self, individual: &mut SlotChromosome, rng: &mut R) {
        self.operators.mutate(individual, &self.layout, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, GlobalConstraint, ViolationKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_problem() -> Problem {
        Problem::new(96)
            .with_activity(Activity::floating(0, 4).with_priority(2.0))
            .with_activity(Activity::fixed(0, 8, 40))
            .with_activity(Activity::floating(0, 2))
            .with_constraint(GlobalConstraint::forbidden(0, 28))
    }

    #[test]
    fn test_first_seed_is_idle() {
        let problem = sample_problem();
        let ga = SlotGaProblem::new(&problem, GeneticOperators::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let seed = ga.create_individual(0, &mut rng);
        assert_eq!(seed.placed_count(ga.layout()), 0);
        let f = ga.evaluate(&seed);
        assert!(f.feasible);
        assert_eq!(f.score, 0.0);
    }

    #[test]
    fn test_seeds_are_valid() {
        let problem = sample_problem();
        let ga = SlotGaProblem::new(&problem, GeneticOperators::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for i in 0..40 {
            let ind = ga.create_individual(i, &mut rng);
            assert!(ga.is_valid(&ind));
        }
    }

    #[test]
    fn test_crossover_and_mutation_keep_validity() {
        let problem = sample_problem();
        let ga = SlotGaProblem::new(&problem, GeneticOperators::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let p1 = ga.create_individual(1, &mut rng);
        let p2 = ga.create_individual(2, &mut rng);
        let mut children = ga.crossover(&p1, &p2, &mut rng);
        assert_eq!(children.len(), 2);
        for child in &mut children {
            ga.mutate(child, &mut rng);
            assert!(ga.is_valid(child));
        }
    }

    #[test]
    fn test_to_schedule() {
        let problem = sample_problem();
        let ga = SlotGaProblem::new(&problem, GeneticOperators::default()).unwrap();
        let layout = ga.layout();
        let idle = layout.idle_allele();

        // candidate_slots[0] = 28; place activity 2 at slot 30, activity 0 at 28.
        let mut genes = vec![idle; layout.gene_count()];
        genes[2] = 1;
        genes[0] = 0;
        let ch = SlotChromosome::from_genes(genes);
        let schedule = ga.to_schedule(&ch);

        assert_eq!(schedule.placement_count(), 2);
        assert_eq!(schedule.as_tuples(), vec![(0, 28), (2, 30)]);
        // Activity 0 occupies [28, 32), activity 2 [30, 32): overlap.
        assert!(!schedule.feasible);
        assert_eq!(schedule.violations[0].kind, ViolationKind::Overlap);
        assert_eq!(schedule.violations[0].activity_id, Some(2));
    }

    #[test]
    fn test_fully_blocked_horizon_still_seeds() {
        let problem = Problem::new(8)
            .with_activity(Activity::floating(0, 1))
            .with_constraint(GlobalConstraint::forbidden(0, 8));
        let ga = SlotGaProblem::new(&problem, GeneticOperators::default()).unwrap();
        assert_eq!(ga.layout().gene_count(), 0);

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for i in 0..4 {
            let mut ind = ga.create_individual(i, &mut rng);
            assert!(ga.is_valid(&ind));
            ga.mutate(&mut ind, &mut rng);
            assert!(ind.genes.is_empty());
        }
        let schedule = ga.to_schedule(&SlotChromosome::idle(ga.layout()));
        assert!(schedule.feasible);
        assert_eq!(schedule.placement_count(), 0);
    }

    #[test]
    fn test_overlapping_fixed_activities_are_reported() {
        let problem = Problem::new(4)
            .with_activity(Activity::fixed(0, 4, 0))
            .with_activity(Activity::fixed(0, 4, 0));
        let ga = SlotGaProblem::new(&problem, GeneticOperators::default()).unwrap();
        assert_eq!(ga.layout().gene_count(), 0);

        let schedule = ga.to_schedule(&SlotChromosome::idle(ga.layout()));
        assert!(!schedule.feasible);
        assert_eq!(schedule.breaches, 1);
        assert_eq!(schedule.violations[0].kind, ViolationKind::Overlap);
    }
}
