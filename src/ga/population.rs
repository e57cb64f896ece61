//! Fixed-size population.
//!
//! The population holds exactly `size` evaluated individuals for its
//! whole life. A generation advances only through [`Population::replace`],
//! which swaps in a complete offspring set of the same size.

use rand::Rng;

use super::fitness::Fitness;
use super::types::{GaProblem, Individual};

/// Population of evaluated individuals.
#[derive(Debug, Clone)]
pub struct Population<I> {
    members: Vec<I>,
    size: usize,
    generation: u64,
}

impl<I: Individual> Population<I> {
    /// Seeds `size` individuals from `problem` and evaluates them.
    pub fn seed<P, R>(problem: &P, size: usize, rng: &mut R) -> Self
    where
        P: GaProblem<Individual = I>,
        R: Rng,
    {
        let members = (0..size)
            .map(|i| {
                let mut ind = problem.create_individual(i, rng);
                debug_assert!(problem.is_valid(&ind), "seed {i} is structurally invalid");
                let fitness = problem.evaluate(&ind);
                ind.set_fitness(fitness);
                ind
            })
            .collect();
        Self {
            members,
            size,
            generation: 0,
        }
    }

    /// Swaps in the next generation.
    ///
    /// # Panics
    /// If `next` does not hold exactly `size` individuals.
    pub fn replace(&mut self, next: Vec<I>) {
        assert_eq!(
            next.len(),
            self.size,
            "offspring count must equal population size"
        );
        self.members = next;
        self.generation += 1;
    }

    /// Current members.
    pub fn members(&self) -> &[I] {
        &self.members
    }

    /// Configured size.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Completed generations.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The best member (first one on ties).
    pub fn best(&self) -> Option<&I> {
        self.members
            .iter()
            .reduce(|best, m| if fitness_of(m) > fitness_of(best) { m } else { best })
    }

    /// Copies of the `count` best members, best first.
    pub fn elites(&self, count: usize) -> Vec<I> {
        let mut order: Vec<usize> = (0..self.members.len()).collect();
        order.sort_by(|&a, &b| fitness_of(&self.members[b]).cmp(&fitness_of(&self.members[a])));
        order
            .into_iter()
            .take(count)
            .map(|i| self.members[i].clone())
            .collect()
    }
}

/// Cached fitness, treating unevaluated individuals as worst.
pub(crate) fn fitness_of<I: Individual>(individual: &I) -> Fitness {
    individual.fitness().unwrap_or_else(Fitness::worst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{GeneticOperators, SlotGaProblem};
    use crate::models::{Activity, Problem};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_problem() -> Problem {
        Problem::new(96)
            .with_activity(Activity::floating(0, 4).with_priority(2.0))
            .with_activity(Activity::floating(0, 2))
    }

    #[test]
    fn test_seed_size_and_evaluation() {
        let problem = sample_problem();
        let ga = SlotGaProblem::new(&problem, GeneticOperators::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let pop = Population::seed(&ga, 12, &mut rng);
        assert_eq!(pop.len(), 12);
        assert_eq!(pop.size(), 12);
        assert_eq!(pop.generation(), 0);
        assert!(pop.members().iter().all(|m| m.fitness.is_some()));
    }

    #[test]
    fn test_replace_advances_generation() {
        let problem = sample_problem();
        let ga = SlotGaProblem::new(&problem, GeneticOperators::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut pop = Population::seed(&ga, 4, &mut rng);
        let next = pop.members().to_vec();
        pop.replace(next);
        assert_eq!(pop.generation(), 1);
        assert_eq!(pop.len(), 4);
    }

    #[test]
    #[should_panic(expected = "offspring count")]
    fn test_replace_rejects_wrong_size() {
        let problem = sample_problem();
        let ga = SlotGaProblem::new(&problem, GeneticOperators::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut pop = Population::seed(&ga, 4, &mut rng);
        let mut next = pop.members().to_vec();
        next.pop();
        pop.replace(next);
    }

    #[test]
    fn test_elites_sorted_best_first() {
        let problem = sample_problem();
        let ga = SlotGaProblem::new(&problem, GeneticOperators::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let pop = Population::seed(&ga, 16, &mut rng);

        let elites = pop.elites(3);
        assert_eq!(elites.len(), 3);
        assert!(fitness_of(&elites[0]) >= fitness_of(&elites[1]));
        assert!(fitness_of(&elites[1]) >= fitness_of(&elites[2]));
        assert_eq!(fitness_of(&elites[0]), fitness_of(pop.best().unwrap()));
    }
}
