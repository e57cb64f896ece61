//! Parent selection.
//!
//! Selected parents are returned by reference; callers clone them before
//! recombination, so a parent is never aliased by its offspring.
//!
//! # Strategies
//! - **Tournament**: best of `size` uniform draws (with replacement).
//!   Larger tournaments mean stronger selection pressure.
//! - **Rank**: linear ranking, the `k`-th worst member is drawn with
//!   weight `k`.
//!
//! A [`ParentPool`] prepares one population for repeated draws; the rank
//! order is computed once per pool, not once per draw.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::population::fitness_of;
use super::types::Individual;
use crate::error::SelectionError;

/// Parent selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionStrategy {
    Tournament { size: usize },
    Rank,
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        Self::Tournament { size: 4 }
    }
}

impl SelectionStrategy {
    /// Prepares `population` for repeated parent draws.
    pub fn pool<'a, I: Individual>(
        &self,
        population: &'a [I],
    ) -> Result<ParentPool<'a, I>, SelectionError> {
        if population.is_empty() {
            return Err(SelectionError::EmptyPopulation);
        }
        let ranked = match self {
            Self::Tournament { .. } => Vec::new(),
            Self::Rank => rank_order(population),
        };
        Ok(ParentPool {
            strategy: *self,
            members: population,
            ranked,
        })
    }

    /// Draws `count` parents from `population`.
    pub fn select<'a, I, R>(
        &self,
        population: &'a [I],
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<&'a I>, SelectionError>
    where
        I: Individual,
        R: Rng,
    {
        Ok(self.pool(population)?.select(count, rng))
    }
}

/// A non-empty population prepared for parent selection.
#[derive(Debug, Clone)]
pub struct ParentPool<'a, I> {
    strategy: SelectionStrategy,
    members: &'a [I],
    /// Member indices, worst first (rank selection only).
    ranked: Vec<usize>,
}

impl<'a, I: Individual> ParentPool<'a, I> {
    /// Draws `count` parents.
    pub fn select<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<&'a I> {
        let members = self.members;
        match self.strategy {
            SelectionStrategy::Tournament { size } => (0..count)
                .map(|_| tournament(members, size.max(1), rng))
                .collect(),
            SelectionStrategy::Rank => (0..count)
                .map(|_| &members[rank_draw(&self.ranked, rng)])
                .collect(),
        }
    }

    /// Member indices from worst to best; empty for tournaments.
    pub fn ranking(&self) -> &[usize] {
        &self.ranked
    }
}

fn tournament<'a, I: Individual, R: Rng>(population: &'a [I], size: usize, rng: &mut R) -> &'a I {
    let mut best = &population[rng.random_range(0..population.len())];
    for _ in 1..size {
        let challenger = &population[rng.random_range(0..population.len())];
        if fitness_of(challenger) > fitness_of(best) {
            best = challenger;
        }
    }
    best
}

/// Member indices, worst first.
fn rank_order<I: Individual>(population: &[I]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| fitness_of(&population[a]).cmp(&fitness_of(&population[b])));
    order
}

fn rank_draw<R: Rng>(ranked: &[usize], rng: &mut R) -> usize {
    let n = ranked.len() as u64;
    let total = n * (n + 1) / 2;
    let mut ticket = rng.random_range(0..total);
    for (r, &idx) in ranked.iter().enumerate() {
        let weight = r as u64 + 1;
        if ticket < weight {
            return idx;
        }
        ticket -= weight;
    }
    ranked[ranked.len() - 1]
}
