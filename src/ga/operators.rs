//! Configurable genetic operators for slot chromosomes.
//!
//! Provides runtime-selectable crossover and mutation strategies
//! via [`GeneticOperators`].
//!
//! # Usage
//!
//! ```
//! use u_slot_evolve::ga::operators::{CrossoverType, GeneticOperators, MutationType};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::Uniform);
//! assert_eq!(ops.mutation_type, MutationType::Reset);
//! assert_eq!(ops.mutation_gene_count, 2);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::candidate_slots::SlotLayout;
use super::chromosome::{
    SlotChromosome, reset_mutation, shift_mutation, single_point_crossover, swap_mutation,
    two_point_crossover, uniform_crossover,
};

/// Crossover strategy for slot chromosomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverType {
    /// Per-gene coin flip.
    Uniform,
    /// Exchange tails after one cut.
    SinglePoint,
    /// Exchange the segment between two cuts.
    TwoPoint,
}

/// Mutation strategy for slot chromosomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationType {
    /// Reset random genes to a random allele.
    Reset,
    /// Swap two random genes.
    Swap,
    /// Move one placed allele to a neighbouring slot.
    Shift,
}

/// Runtime-selectable genetic operators.
///
/// # Example
///
/// ```
/// use u_slot_evolve::ga::operators::{CrossoverType, GeneticOperators, MutationType};
///
/// let ops = GeneticOperators::default()
///     .with_crossover(CrossoverType::TwoPoint)
///     .with_mutation(MutationType::Shift);
/// assert_eq!(ops.mutation_type, MutationType::Shift);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Primary mutation strategy.
    pub mutation_type: MutationType,
    /// Genes reset per reset mutation.
    pub mutation_gene_count: usize,
    /// Probability that a reset picks the idle allele.
    pub idle_bias: f64,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_type: CrossoverType::Uniform,
            mutation_type: MutationType::Reset,
            mutation_gene_count: 2,
            idle_bias: 0.5,
        }
    }
}

impl GeneticOperators {
    /// Sets the crossover strategy.
    pub fn with_crossover(mut self, crossover_type: CrossoverType) -> Self {
        self.crossover_type = crossover_type;
        self
    }

    /// Sets the mutation strategy.
    pub fn with_mutation(mut self, mutation_type: MutationType) -> Self {
        self.mutation_type = mutation_type;
        self
    }

    /// Sets the genes reset per reset mutation.
    pub fn with_mutation_gene_count(mut self, count: usize) -> Self {
        self.mutation_gene_count = count;
        self
    }

    /// Sets the idle bias of reset mutation.
    pub fn with_idle_bias(mut self, bias: f64) -> Self {
        self.idle_bias = bias;
        self
    }

    /// Performs crossover using the configured strategy.
    pub fn crossover<R: Rng>(
        &self,
        p1: &SlotChromosome,
        p2: &SlotChromosome,
        rng: &mut R,
    ) -> (SlotChromosome, SlotChromosome) {
        match self.crossover_type {
            CrossoverType::Uniform => uniform_crossover(p1, p2, rng),
            CrossoverType::SinglePoint => single_point_crossover(p1, p2, rng),
            CrossoverType::TwoPoint => two_point_crossover(p1, p2, rng),
        }
    }

    /// Performs mutation using the configured strategy.
    ///
    /// Swap and shift only move existing alleles, so they are followed by a
    /// single-gene reset to keep allele diversity.
    pub fn mutate<R: Rng>(&self, chromosome: &mut SlotChromosome, layout: &SlotLayout, rng: &mut R) {
        match self.mutation_type {
            MutationType::Reset => {
                reset_mutation(chromosome, layout, self.mutation_gene_count, self.idle_bias, rng);
            }
            MutationType::Swap => {
                swap_mutation(chromosome, rng);
                reset_mutation(chromosome, layout, 1, self.idle_bias, rng);
            }
            MutationType::Shift => {
                shift_mutation(chromosome, layout, rng);
                reset_mutation(chromosome, layout, 1, self.idle_bias, rng);
            }
        }
    }
}
