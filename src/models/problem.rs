//! Problem model.
//!
//! A problem is everything one solve call needs: the activities, which of
//! them the solver may place, horizon-wide constraints, and two learned
//! preference tables (slot heatmap and activity-to-activity Markov
//! transitions).
//!
//! The problem is immutable for the duration of a solve.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Activity, ActivityId, GlobalConstraint, TimeSlot};

/// A decoded scheduling problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// All activities, indexed by their dense ID.
    pub activities: Vec<Activity>,
    /// Indices of floating activities (the optimization variables).
    pub floating_indices: Vec<usize>,
    /// Indices of fixed activities.
    pub fixed_indices: Vec<usize>,
    #[serde(default)]
    pub global_constraints: Vec<GlobalConstraint>,
    /// `(activity, start slot, probability)` preference entries.
    #[serde(default)]
    pub heatmap: Vec<(ActivityId, TimeSlot, f32)>,
    /// `(from activity, to activity, probability)` transition entries.
    #[serde(default)]
    pub markov_matrix: Vec<(ActivityId, ActivityId, f32)>,
    /// Horizon length in slots.
    pub total_slots: TimeSlot,
}

impl Problem {
    /// Creates an empty problem over `total_slots`.
    pub fn new(total_slots: TimeSlot) -> Self {
        Self {
            total_slots,
            ..Self::default()
        }
    }

    /// Adds an activity, keeping the floating/fixed index lists in sync.
    ///
    /// The activity's ID is reassigned to its position.
    pub fn with_activity(mut self, mut activity: Activity) -> Self {
        let idx = self.activities.len();
        activity.id = idx;
        if activity.is_fixed() {
            self.fixed_indices.push(idx);
        } else {
            self.floating_indices.push(idx);
        }
        self.activities.push(activity);
        self
    }

    /// Adds a global constraint.
    pub fn with_constraint(mut self, constraint: GlobalConstraint) -> Self {
        self.global_constraints.push(constraint);
        self
    }

    /// Adds a heatmap entry.
    pub fn with_heat(mut self, activity: ActivityId, slot: TimeSlot, probability: f32) -> Self {
        self.heatmap.push((activity, slot, probability));
        self
    }

    /// Adds a Markov transition entry.
    pub fn with_transition(mut self, from: ActivityId, to: ActivityId, probability: f32) -> Self {
        self.markov_matrix.push((from, to, probability));
        self
    }

    /// Number of floating activities.
    #[inline]
    pub fn floating_count(&self) -> usize {
        self.floating_indices.len()
    }

    /// Builds the heatmap and Markov lookup tables.
    ///
    /// Later duplicate entries overwrite earlier ones.
    pub fn build_lookup_maps(
        &self,
    ) -> (
        HashMap<(ActivityId, TimeSlot), f64>,
        HashMap<(ActivityId, ActivityId), f64>,
    ) {
        let heat = self
            .heatmap
            .iter()
            .map(|&(a, t, p)| ((a, t), f64::from(p)))
            .collect();
        let markov = self
            .markov_matrix
            .iter()
            .map(|&(f, t, p)| ((f, t), f64::from(p)))
            .collect();
        (heat, markov)
    }
}
