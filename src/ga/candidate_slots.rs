//! Candidate start slots and the gene layout.
//!
//! A slot is a candidate start when it lies inside the horizon, outside
//! every forbidden zone, and outside every fixed activity's occupancy.
//! The chromosome carries one gene per candidate slot, so the layout is
//! fixed for the whole solve. A fully blocked horizon yields a layout
//! with no genes; its only chromosome is the empty one.
//!
//! # Alleles
//!
//! - `0..floating_count`: start that floating activity at this slot
//! - `floating_count`: idle (nothing starts here)

use crate::error::SeedError;
use crate::models::{ActivityId, Problem, SlotWindow, TimeSlot};

/// A floating activity as seen by the chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingInfo {
    /// Position in `problem.activities`.
    pub activity_index: usize,
    pub activity_id: ActivityId,
    pub duration_slots: u16,
}

/// Gene layout shared by every chromosome of one solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLayout {
    /// Gene `i` decides what starts at `candidate_slots[i]`.
    pub candidate_slots: Vec<TimeSlot>,
    /// Per-slot flag: forbidden or occupied by a fixed activity.
    pub blocked: Vec<bool>,
    /// Floating activities, indexed by allele.
    pub floating: Vec<FloatingInfo>,
    pub total_slots: u32,
}

impl SlotLayout {
    /// Derives the layout of `problem`.
    ///
    /// Fails when the floating activities do not fit the allele range.
    pub fn from_problem(problem: &Problem) -> Result<Self, SeedError> {
        let floating_count = problem.floating_indices.len();
        if floating_count >= usize::from(TimeSlot::MAX) {
            return Err(SeedError::TooManyFloating(floating_count));
        }

        let blocked = build_blocked_mask(problem);
        let candidate_slots = build_candidate_start_slots(&blocked);

        let floating = problem
            .floating_indices
            .iter()
            .filter_map(|&idx| {
                problem.activities.get(idx).map(|a| FloatingInfo {
                    activity_index: idx,
                    activity_id: a.id,
                    duration_slots: a.duration_slots,
                })
            })
            .collect();

        Ok(Self {
            candidate_slots,
            blocked,
            floating,
            total_slots: u32::from(problem.total_slots),
        })
    }

    /// Number of genes.
    #[inline]
    pub fn gene_count(&self) -> usize {
        self.candidate_slots.len()
    }

    /// The idle allele.
    #[inline]
    pub fn idle_allele(&self) -> u16 {
        self.floating.len() as u16
    }

    /// Whether `duration` slots from `start` stay in the horizon and avoid
    /// every blocked slot.
    pub fn fits(&self, start: u32, duration: u32) -> bool {
        let window = SlotWindow::starting_at(start, duration);
        window.end <= self.total_slots
            && self.blocked[window.start as usize..window.end as usize]
                .iter()
                .all(|&b| !b)
    }

    /// Mean floating duration in slots (0 when nothing floats).
    pub fn mean_duration(&self) -> f64 {
        if self.floating.is_empty() {
            return 0.0;
        }
        let sum: u64 = self
            .floating
            .iter()
            .map(|f| u64::from(f.duration_slots))
            .sum();
        sum as f64 / self.floating.len() as f64
    }
}

/// Marks slots covered by a forbidden zone or a fixed activity.
pub fn build_blocked_mask(problem: &Problem) -> Vec<bool> {
    let horizon = u32::from(problem.total_slots);
    let mut blocked = vec![false; horizon as usize];

    let mut mark = |window: SlotWindow| {
        let w = window.clamp_to(horizon);
        for slot in w.start..w.end {
            blocked[slot as usize] = true;
        }
    };

    for constraint in &problem.global_constraints {
        if let Some(window) = constraint.forbidden_window() {
            mark(window);
        }
    }
    for &idx in &problem.fixed_indices {
        if let Some(act) = problem.activities.get(idx) {
            if let Some(start) = act.assigned_start {
                mark(SlotWindow::starting_at(start.into(), act.duration_slots.into()));
            }
        }
    }
    blocked
}

/// Slots not blocked, in ascending order.
pub fn build_candidate_start_slots(blocked: &[bool]) -> Vec<TimeSlot> {
    blocked
        .iter()
        .enumerate()
        .filter(|&(_, &b)| !b)
        .filter_map(|(slot, _)| TimeSlot::try_from(slot).ok())
        .collect()
}
