//! Best-so-far tracking.
//!
//! The tracker keeps a copy of the best individual seen across all
//! generations. It only moves on strict improvement, so its fitness never
//! decreases and ties keep the earlier individual.

use super::fitness::Fitness;
use super::types::Individual;

/// Best individual seen so far.
#[derive(Debug, Clone)]
pub struct BestSolutionTracker<I> {
    best: Option<I>,
    improvements: u64,
    last_improved_generation: u64,
}

impl<I: Individual> Default for BestSolutionTracker<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Individual> BestSolutionTracker<I> {
    /// Empty tracker: no best until the first candidate is considered.
    pub fn new() -> Self {
        Self {
            best: None,
            improvements: 0,
            last_improved_generation: 0,
        }
    }

    /// Offers a candidate; returns whether it became the new best.
    ///
    /// Unevaluated candidates are ignored.
    pub fn consider(&mut self, candidate: &I, generation: u64) -> bool {
        let Some(fitness) = candidate.fitness() else {
            return false;
        };
        let improved = self
            .best_fitness()
            .is_none_or(|best| fitness.is_better_than(&best));
        if improved {
            self.best = Some(candidate.clone());
            self.improvements += 1;
            self.last_improved_generation = generation;
        }
        improved
    }

    pub fn best(&self) -> Option<&I> {
        self.best.as_ref()
    }

    pub fn best_fitness(&self) -> Option<Fitness> {
        self.best.as_ref().and_then(|b| b.fitness())
    }

    pub fn into_best(self) -> Option<I> {
        self.best
    }

    /// Number of times the best changed.
    pub fn improvements(&self) -> u64 {
        self.improvements
    }

    /// Generations since the last improvement.
    pub fn stale_generations(&self, current_generation: u64) -> u64 {
        current_generation.saturating_sub(self.last_improved_generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::SlotChromosome;

    fn scored(genes: Vec<u16>, fitness: Fitness) -> SlotChromosome {
        let mut ch = SlotChromosome::from_genes(genes);
        ch.fitness = Some(fitness);
        ch
    }

    #[test]
    fn test_absent_until_first() {
        let t: BestSolutionTracker<SlotChromosome> = BestSolutionTracker::new();
        assert!(t.best().is_none());
        assert!(t.best_fitness().is_none());
    }

    #[test]
    fn test_strict_improvement_only() {
        let mut t = BestSolutionTracker::new();
        assert!(t.consider(&scored(vec![1], Fitness::feasible(5.0)), 0));
        // Tie keeps the earlier one.
        assert!(!t.consider(&scored(vec![2], Fitness::feasible(5.0)), 1));
        assert_eq!(t.best().unwrap().genes, vec![1]);
        // Worse is ignored.
        assert!(!t.consider(&scored(vec![3], Fitness::infeasible(99.0, 1.0, 1)), 2));
        assert!(t.consider(&scored(vec![4], Fitness::feasible(6.0)), 3));
        assert_eq!(t.best().unwrap().genes, vec![4]);
        assert_eq!(t.improvements(), 2);
        assert_eq!(t.stale_generations(10), 7);
    }

    #[test]
    fn test_unevaluated_is_ignored() {
        let mut t = BestSolutionTracker::new();
        assert!(!t.consider(&SlotChromosome::from_genes(vec![0]), 0));
        assert!(t.best().is_none());
    }

    #[test]
    fn test_best_is_a_copy() {
        let mut t = BestSolutionTracker::new();
        let mut ch = scored(vec![1, 2], Fitness::feasible(1.0));
        t.consider(&ch, 0);
        ch.genes[0] = 9;
        assert_eq!(t.into_best().unwrap().genes, vec![1, 2]);
    }
}
