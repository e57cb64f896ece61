//! Schedule (solution) model.
//!
//! A schedule is the solver's answer: where each floating activity was
//! placed, how the placement scored, and which hard constraints it still
//! breaks. Infeasible schedules are legitimate best-effort answers; the
//! `feasible` flag tells them apart.

use serde::{Deserialize, Serialize};

use super::{ActivityId, TimeSlot};

/// Current encoding version written by the result encoder.
pub const SCHEDULE_FORMAT_VERSION: u8 = 1;

/// A best-effort schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Encoding version.
    pub format_version: u8,
    /// Whether every hard constraint is satisfied.
    pub feasible: bool,
    /// Soft objective (higher = better).
    pub score: f64,
    /// Weighted hard-constraint violation (0 when feasible).
    pub violation: f64,
    /// Number of hard-constraint breaches.
    pub breaches: u32,
    /// Floating placements, ordered by `(start_slot, activity_id)`.
    pub placements: Vec<Placement>,
    /// Hard-constraint breaches in evaluation order.
    pub violations: Vec<Violation>,
}

/// One occurrence of a floating activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub activity_id: ActivityId,
    pub start_slot: TimeSlot,
    /// Exclusive end slot; may exceed the horizon on infeasible schedules.
    pub end_slot: u32,
}

/// A hard-constraint breach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Offending activity, when the breach belongs to one.
    pub activity_id: Option<ActivityId>,
    /// Start slot of the offending occurrence or bucket.
    pub slot: Option<u32>,
    /// Weighted amount added to the schedule's violation.
    pub amount: f64,
}

/// Classification of hard-constraint breaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Two occurrences share a slot.
    Overlap,
    /// An occurrence intersects a forbidden zone.
    ForbiddenZone,
    /// An occurrence ends past the horizon.
    HorizonOverrun,
    /// A category's cumulative time is outside its bounds in a period.
    CumulativeTime,
    /// A user frequency bound is missed in a scope bucket.
    FrequencyBounds,
}

impl Placement {
    /// Creates a placement.
    pub fn new(activity_id: ActivityId, start_slot: TimeSlot, duration_slots: u16) -> Self {
        Self {
            activity_id,
            start_slot,
            end_slot: u32::from(start_slot) + u32::from(duration_slots),
        }
    }

    /// Length in slots.
    #[inline]
    pub fn duration_slots(&self) -> u32 {
        self.end_slot - u32::from(self.start_slot)
    }
}

impl Violation {
    /// Creates a violation tied to an activity occurrence.
    pub fn at(kind: ViolationKind, activity_id: ActivityId, slot: u32, amount: f64) -> Self {
        Self {
            kind,
            activity_id: Some(activity_id),
            slot: Some(slot),
            amount,
        }
    }
}

impl Schedule {
    /// Creates an empty feasible schedule.
    pub fn new() -> Self {
        Self {
            format_version: SCHEDULE_FORMAT_VERSION,
            feasible: true,
            score: 0.0,
            violation: 0.0,
            breaches: 0,
            placements: Vec::new(),
            violations: Vec::new(),
        }
    }

    /// Adds a placement.
    pub fn add_placement(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    /// Sorts placements into their canonical order.
    pub fn normalize(&mut self) {
        self.placements
            .sort_unstable_by_key(|p| (p.start_slot, p.activity_id, p.end_slot));
    }

    /// All placements of one activity.
    pub fn placements_for(&self, activity_id: ActivityId) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| p.activity_id == activity_id)
            .collect()
    }

    /// Latest end slot across placements.
    pub fn makespan(&self) -> u32 {
        self.placements.iter().map(|p| p.end_slot).max().unwrap_or(0)
    }

    /// Number of placements.
    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }

    /// `(activity_id, start_slot)` pairs in canonical order.
    pub fn as_tuples(&self) -> Vec<(ActivityId, TimeSlot)> {
        self.placements
            .iter()
            .map(|p| (p.activity_id, p.start_slot))
            .collect()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}
