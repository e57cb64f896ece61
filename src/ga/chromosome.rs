//! Slot-indexed chromosome.
//!
//! # Encoding
//!
//! One gene per candidate start slot (see [`SlotLayout`]). A gene holds
//! either the allele of the floating activity that starts at that slot,
//! or the idle allele. A floating activity may therefore appear any
//! number of times, including zero.
//!
//! Decoding is direct: every non-idle gene is one placement. Overlaps
//! between placements are legal in the encoding and penalized by the
//! evaluator.
//!
//! # Operators
//!
//! - Crossover: uniform, single-point, two-point (genes stay aligned to
//!   their slot, so any exchange yields a valid child)
//! - Mutation: reset (random allele, idle-biased), swap, shift

use rand::Rng;

use super::candidate_slots::SlotLayout;
use super::fitness::Fitness;
use super::types::Individual;
use crate::models::TimeSlot;

/// Maximum allele draws per slot when the greedy seeder looks for a fit.
const GREEDY_ATTEMPTS: usize = 3;

/// Slot-indexed chromosome.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotChromosome {
    /// One allele per candidate slot.
    pub genes: Vec<u16>,
    /// Cached fitness, cleared by every structural change.
    pub fitness: Option<Fitness>,
}

impl Individual for SlotChromosome {
    fn fitness(&self) -> Option<Fitness> {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: Fitness) {
        self.fitness = Some(fitness);
    }

    fn invalidate(&mut self) {
        self.fitness = None;
    }
}

impl SlotChromosome {
    /// Wraps raw genes.
    pub fn from_genes(genes: Vec<u16>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    /// Every gene idle: the empty schedule.
    pub fn idle(layout: &SlotLayout) -> Self {
        Self::from_genes(vec![layout.idle_allele(); layout.gene_count()])
    }

    /// Sparse random chromosome.
    ///
    /// Each gene is non-idle with probability `fill_rate`.
    pub fn random<R: Rng>(layout: &SlotLayout, fill_rate: f64, rng: &mut R) -> Self {
        let idle = layout.idle_allele();
        let fill_rate = fill_rate.clamp(0.0, 1.0);
        let genes = (0..layout.gene_count())
            .map(|_| {
                if idle > 0 && rng.random_bool(fill_rate) {
                    rng.random_range(0..idle)
                } else {
                    idle
                }
            })
            .collect();
        Self::from_genes(genes)
    }

    /// Greedy non-overlapping packing.
    ///
    /// Walks the candidate slots in order and, with probability
    /// `fill_rate`, starts a random floating activity that fits before the
    /// next blocked slot and does not overlap the previous pick. The result
    /// breaks no overlap, forbidden-zone or horizon constraint.
    pub fn greedy<R: Rng>(layout: &SlotLayout, fill_rate: f64, rng: &mut R) -> Self {
        let idle = layout.idle_allele();
        let mut genes = vec![idle; layout.gene_count()];
        if idle == 0 {
            return Self::from_genes(genes);
        }

        let fill_rate = fill_rate.clamp(0.0, 1.0);
        let mut busy_until = 0u32;
        for (gene, &slot) in genes.iter_mut().zip(&layout.candidate_slots) {
            let start = u32::from(slot);
            if start < busy_until || !rng.random_bool(fill_rate) {
                continue;
            }
            for _ in 0..GREEDY_ATTEMPTS {
                let allele = rng.random_range(0..idle);
                let duration = u32::from(layout.floating[usize::from(allele)].duration_slots);
                if layout.fits(start, duration) {
                    *gene = allele;
                    busy_until = start + duration;
                    break;
                }
            }
        }
        Self::from_genes(genes)
    }

    /// Decodes to `(activity index, start slot)` placements in slot order.
    pub fn placements(&self, layout: &SlotLayout) -> Vec<(usize, TimeSlot)> {
        self.genes
            .iter()
            .zip(&layout.candidate_slots)
            .filter_map(|(&gene, &slot)| {
                layout
                    .floating
                    .get(usize::from(gene))
                    .map(|f| (f.activity_index, slot))
            })
            .collect()
    }

    /// Number of non-idle genes.
    pub fn placed_count(&self, layout: &SlotLayout) -> usize {
        let idle = layout.idle_allele();
        self.genes.iter().filter(|&&g| g != idle).count()
    }

    /// Checks length and allele range against the layout.
    pub fn is_valid(&self, layout: &SlotLayout) -> bool {
        let idle = layout.idle_allele();
        self.genes.len() == layout.gene_count() && self.genes.iter().all(|&g| g <= idle)
    }
}

// ======================== Crossover Operators ========================

/// Uniform crossover: each gene position is swapped with probability 0.5.
pub fn uniform_crossover<R: Rng>(
    p1: &SlotChromosome,
    p2: &SlotChromosome,
    rng: &mut R,
) -> (SlotChromosome, SlotChromosome) {
    let mut c1 = p1.genes.clone();
    let mut c2 = p2.genes.clone();
    for (a, b) in c1.iter_mut().zip(c2.iter_mut()) {
        if rng.random_bool(0.5) {
            std::mem::swap(a, b);
        }
    }
    (SlotChromosome::from_genes(c1), SlotChromosome::from_genes(c2))
}

/// Single-point crossover: tails after a random cut are exchanged.
pub fn single_point_crossover<R: Rng>(
    p1: &SlotChromosome,
    p2: &SlotChromosome,
    rng: &mut R,
) -> (SlotChromosome, SlotChromosome) {
    let len = p1.genes.len().min(p2.genes.len());
    if len < 2 {
        return unchanged_pair(p1, p2);
    }
    let cut = rng.random_range(1..len);
    exchange_range(p1, p2, cut, len)
}

/// Two-point crossover: the segment between two random cuts is exchanged.
pub fn two_point_crossover<R: Rng>(
    p1: &SlotChromosome,
    p2: &SlotChromosome,
    rng: &mut R,
) -> (SlotChromosome, SlotChromosome) {
    let len = p1.genes.len().min(p2.genes.len());
    if len < 2 {
        return unchanged_pair(p1, p2);
    }
    let mut a = rng.random_range(0..len);
    let mut b = rng.random_range(0..len);
    if a > b {
        std::mem::swap(&mut a, &mut b);
    }
    exchange_range(p1, p2, a, b + 1)
}

fn exchange_range(
    p1: &SlotChromosome,
    p2: &SlotChromosome,
    from: usize,
    to: usize,
) -> (SlotChromosome, SlotChromosome) {
    let mut c1 = p1.genes.clone();
    let mut c2 = p2.genes.clone();
    c1[from..to].swap_with_slice(&mut c2[from..to]);
    (SlotChromosome::from_genes(c1), SlotChromosome::from_genes(c2))
}

fn unchanged_pair(p1: &SlotChromosome, p2: &SlotChromosome) -> (SlotChromosome, SlotChromosome) {
    (
        SlotChromosome::from_genes(p1.genes.clone()),
        SlotChromosome::from_genes(p2.genes.clone()),
    )
}

// ======================== Mutation Operators ========================

/// Reset mutation: `gene_count` random genes get a new allele.
///
/// Each reset picks idle with probability `idle_bias`, otherwise a random
/// floating activity.
pub fn reset_mutation<R: Rng>(
    chromosome: &mut SlotChromosome,
    layout: &SlotLayout,
    gene_count: usize,
    idle_bias: f64,
    rng: &mut R,
) {
    let len = chromosome.genes.len();
    if len == 0 {
        return;
    }
    let idle = layout.idle_allele();
    let idle_bias = idle_bias.clamp(0.0, 1.0);
    for _ in 0..gene_count {
        let idx = rng.random_range(0..len);
        chromosome.genes[idx] = if idle == 0 || rng.random_bool(idle_bias) {
            idle
        } else {
            rng.random_range(0..idle)
        };
    }
    chromosome.fitness = None;
}

/// Swap mutation: two random genes exchange alleles.
pub fn swap_mutation<R: Rng>(chromosome: &mut SlotChromosome, rng: &mut R) {
    let len = chromosome.genes.len();
    if len < 2 {
        return;
    }
    let i = rng.random_range(0..len);
    let j = rng.random_range(0..len);
    chromosome.genes.swap(i, j);
    chromosome.fitness = None;
}

/// Shift mutation: one placed allele moves to a neighbouring candidate slot.
pub fn shift_mutation<R: Rng>(chromosome: &mut SlotChromosome, layout: &SlotLayout, rng: &mut R) {
    let len = chromosome.genes.len();
    if len < 2 {
        return;
    }
    let idle = layout.idle_allele();
    let placed: Vec<usize> = (0..len).filter(|&i| chromosome.genes[i] != idle).collect();
    if placed.is_empty() {
        return;
    }
    let i = placed[rng.random_range(0..placed.len())];
    let j = if i == 0 {
        1
    } else if i == len - 1 || rng.random_bool(0.5) {
        i - 1
    } else {
        i + 1
    };
    chromosome.genes.swap(i, j);
    chromosome.fitness = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, GlobalConstraint, Problem};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_layout() -> SlotLayout {
        let p = Problem::new(48)
            .with_activity(Activity::floating(0, 2))
            .with_activity(Activity::fixed(0, 4, 20))
            .with_activity(Activity::floating(0, 5))
            .with_constraint(GlobalConstraint::forbidden(0, 8));
        SlotLayout::from_problem(&p).unwrap()
    }

    #[test]
    fn test_idle_chromosome() {
        let layout = sample_layout();
        let ch = SlotChromosome::idle(&layout);
        assert!(ch.is_valid(&layout));
        assert_eq!(ch.placed_count(&layout), 0);
        assert!(ch.placements(&layout).is_empty());
        assert!(ch.fitness.is_none());
    }

    #[test]
    fn test_random_chromosome() {
        let layout = sample_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let ch = SlotChromosome::random(&layout, 0.5, &mut rng);
        assert!(ch.is_valid(&layout));
        assert!(ch.placed_count(&layout) > 0);

        let full = SlotChromosome::random(&layout, 1.0, &mut rng);
        assert_eq!(full.placed_count(&layout), layout.gene_count());
        let empty = SlotChromosome::random(&layout, 0.0, &mut rng);
        assert_eq!(empty.placed_count(&layout), 0);
    }

    #[test]
    fn test_greedy_never_overlaps_or_blocks() {
        let layout = sample_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let ch = SlotChromosome::greedy(&layout, 1.0, &mut rng);
            assert!(ch.is_valid(&layout));

            let mut busy_until = 0u32;
            for (gene, &slot) in ch.genes.iter().zip(&layout.candidate_slots) {
                if *gene == layout.idle_allele() {
                    continue;
                }
                let start = u32::from(slot);
                let duration = u32::from(layout.floating[usize::from(*gene)].duration_slots);
                assert!(start >= busy_until);
                assert!(layout.fits(start, duration));
                busy_until = start + duration;
            }
        }
    }

    #[test]
    fn test_placements_map_to_activity_indices() {
        let layout = sample_layout();
        let mut genes = vec![layout.idle_allele(); layout.gene_count()];
        genes[0] = 1;
        genes[3] = 0;
        let ch = SlotChromosome::from_genes(genes);
        let placements = ch.placements(&layout);
        assert_eq!(placements, vec![(2, 8), (0, 11)]);
    }

    #[test]
    fn test_invalid_chromosomes() {
        let layout = sample_layout();
        let short = SlotChromosome::from_genes(vec![0; 3]);
        assert!(!short.is_valid(&layout));
        let out_of_range = SlotChromosome::from_genes(vec![9; layout.gene_count()]);
        assert!(!out_of_range.is_valid(&layout));
    }

    #[test]
    fn test_crossovers_preserve_alignment() {
        let layout = sample_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let p1 = SlotChromosome::random(&layout, 0.6, &mut rng);
        let p2 = SlotChromosome::idle(&layout);

        for (c1, c2) in [
            uniform_crossover(&p1, &p2, &mut rng),
            single_point_crossover(&p1, &p2, &mut rng),
            two_point_crossover(&p1, &p2, &mut rng),
        ] {
            assert!(c1.is_valid(&layout));
            assert!(c2.is_valid(&layout));
            assert!(c1.fitness.is_none());
            // Every position holds exactly the two parent alleles between the children.
            for i in 0..layout.gene_count() {
                let mut got = [c1.genes[i], c2.genes[i]];
                let mut want = [p1.genes[i], p2.genes[i]];
                got.sort_unstable();
                want.sort_unstable();
                assert_eq!(got, want);
            }
        }
    }

    #[test]
    fn test_reset_mutation() {
        let layout = sample_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut ch = SlotChromosome::idle(&layout);
        ch.fitness = Some(Fitness::feasible(1.0));

        reset_mutation(&mut ch, &layout, 5, 0.0, &mut rng);
        assert!(ch.is_valid(&layout));
        assert!(ch.fitness.is_none());
        assert!(ch.placed_count(&layout) > 0);
        assert!(ch.placed_count(&layout) <= 5);

        reset_mutation(&mut ch, &layout, layout.gene_count() * 20, 1.0, &mut rng);
        assert_eq!(ch.placed_count(&layout), 0);
    }

    #[test]
    fn test_swap_mutation() {
        let layout = sample_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut ch = SlotChromosome::random(&layout, 0.5, &mut rng);
        let before = ch.placed_count(&layout);
        swap_mutation(&mut ch, &mut rng);
        assert!(ch.is_valid(&layout));
        assert_eq!(ch.placed_count(&layout), before);
    }

    #[test]
    fn test_shift_mutation_moves_one_allele() {
        let layout = sample_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut genes = vec![layout.idle_allele(); layout.gene_count()];
        genes[5] = 0;
        let mut ch = SlotChromosome::from_genes(genes);
        shift_mutation(&mut ch, &layout, &mut rng);
        assert_eq!(ch.placed_count(&layout), 1);
        assert!(ch.genes[4] == 0 || ch.genes[6] == 0);
        assert!(ch.fitness.is_none());
    }
}
