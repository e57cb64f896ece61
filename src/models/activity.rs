//! Activity model.
//!
//! An activity is the unit the solver places on the slot horizon. Fixed
//! activities carry their own start slot and are never moved; floating
//! activities are the optimization variables and may be placed any number
//! of times (including zero).
//!
//! # Bindings
//!
//! Bindings express "this activity wants some other activities around it"
//! in Disjunctive Normal Form: the binding is met when **any** required set
//! is met, and a set is met when **all** of its activity IDs occur in the
//! binding's time scope.
//!
//! - **Input bindings**: the set must already have occurred (strictly
//!   before) within the scope.
//! - **Output bindings**: the set must still occur (strictly after)
//!   within the scope.

use serde::{Deserialize, Serialize};

use super::{ActivityId, CategoryId, TimeSlot};

/// Whether an activity is pinned or placed by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    /// Immutable: scheduled at `assigned_start`.
    Fixed,
    /// Optimization variable.
    Floating,
}

/// Calendar scope used by bindings and frequency rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeScope {
    /// One 96-slot day.
    SameDay,
    /// One 672-slot week.
    SameWeek,
    /// The whole horizon.
    SameMonth,
}

/// A weighted DNF dependency between activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// OR of ANDs over activity IDs.
    pub required_sets: Vec<Vec<ActivityId>>,
    /// Scope in which the required activities are counted.
    pub time_scope: TimeScope,
    /// Weekday bitmask (bit 0 = Monday). The binding only applies on days
    /// whose bit is set.
    pub valid_weekdays: u8,
    /// Score deducted when the binding is not met.
    pub weight: f32,
}

impl Binding {
    /// Weekday mask covering all seven days.
    pub const ALL_WEEKDAYS: u8 = 0b111_1111;

    /// Creates a binding requiring a single set of activities.
    pub fn requiring(ids: Vec<ActivityId>, time_scope: TimeScope, weight: f32) -> Self {
        Self {
            required_sets: vec![ids],
            time_scope,
            valid_weekdays: Self::ALL_WEEKDAYS,
            weight,
        }
    }

    /// Adds an alternative required set.
    pub fn or_requiring(mut self, ids: Vec<ActivityId>) -> Self {
        self.required_sets.push(ids);
        self
    }

    /// Restricts the binding to the given weekdays.
    pub fn on_weekdays(mut self, mask: u8) -> Self {
        self.valid_weekdays = mask;
        self
    }

    /// Whether the binding applies on the given weekday (0 = Monday).
    #[inline]
    pub fn applies_on(&self, weekday: usize) -> bool {
        weekday < 7 && self.valid_weekdays & (1 << weekday) != 0
    }
}

/// Soft reward for hitting a per-scope occurrence count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTarget {
    pub scope: TimeScope,
    pub target_count: u16,
    pub weight: f32,
}

/// Hard per-scope occurrence bounds declared by the user.
///
/// Occurrences starting at or after `deadline_end` are not counted, and
/// scope buckets starting at or after it are not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFrequencyConstraint {
    pub scope: TimeScope,
    #[serde(default)]
    pub min_count: Option<u16>,
    #[serde(default)]
    pub max_count: Option<u16>,
    #[serde(default)]
    pub deadline_end: Option<TimeSlot>,
    pub penalty_weight: f32,
}

impl UserFrequencyConstraint {
    /// Creates an "at least `min` per scope" constraint.
    pub fn at_least(scope: TimeScope, min: u16, penalty_weight: f32) -> Self {
        Self {
            scope,
            min_count: Some(min),
            max_count: None,
            deadline_end: None,
            penalty_weight,
        }
    }

    /// Creates an "at most `max` per scope" constraint.
    pub fn at_most(scope: TimeScope, max: u16, penalty_weight: f32) -> Self {
        Self {
            scope,
            min_count: None,
            max_count: Some(max),
            deadline_end: None,
            penalty_weight,
        }
    }

    /// Sets the deadline slot.
    pub fn with_deadline(mut self, deadline_end: TimeSlot) -> Self {
        self.deadline_end = Some(deadline_end);
        self
    }

    /// How far `count` lies outside `[min_count, max_count]`.
    pub fn deviation(&self, count: u32) -> u32 {
        if let Some(min) = self.min_count {
            if count < u32::from(min) {
                return u32::from(min) - count;
            }
        }
        if let Some(max) = self.max_count {
            if count > u32::from(max) {
                return count - u32::from(max);
            }
        }
        0
    }
}

/// An activity to be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Dense identifier in `0..activities.len()`.
    pub id: ActivityId,
    #[serde(rename = "activity_type")]
    pub kind: ActivityKind,
    /// Length in 15-minute slots.
    pub duration_slots: u16,
    /// Reward weight per placed occurrence.
    pub priority: f32,
    /// Start slot for fixed activities.
    #[serde(default)]
    pub assigned_start: Option<TimeSlot>,
    #[serde(default)]
    pub category_id: CategoryId,
    #[serde(default)]
    pub input_bindings: Vec<Binding>,
    #[serde(default)]
    pub output_bindings: Vec<Binding>,
    #[serde(default)]
    pub frequency_targets: Vec<FrequencyTarget>,
    #[serde(default)]
    pub user_frequency_constraints: Vec<UserFrequencyConstraint>,
}

impl Activity {
    /// Creates a floating activity.
    pub fn floating(id: ActivityId, duration_slots: u16) -> Self {
        Self {
            id,
            kind: ActivityKind::Floating,
            duration_slots,
            priority: 1.0,
            assigned_start: None,
            category_id: 0,
            input_bindings: Vec::new(),
            output_bindings: Vec::new(),
            frequency_targets: Vec::new(),
            user_frequency_constraints: Vec::new(),
        }
    }

    /// Creates a fixed activity pinned at `start`.
    pub fn fixed(id: ActivityId, duration_slots: u16, start: TimeSlot) -> Self {
        Self {
            kind: ActivityKind::Fixed,
            assigned_start: Some(start),
            ..Self::floating(id, duration_slots)
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = category_id;
        self
    }

    /// Adds an input binding.
    pub fn with_input_binding(mut self, binding: Binding) -> Self {
        self.input_bindings.push(binding);
        self
    }

    /// Adds an output binding.
    pub fn with_output_binding(mut self, binding: Binding) -> Self {
        self.output_bindings.push(binding);
        self
    }

    /// Adds a frequency target.
    pub fn with_frequency_target(mut self, target: FrequencyTarget) -> Self {
        self.frequency_targets.push(target);
        self
    }

    /// Adds a user frequency constraint.
    pub fn with_user_frequency(mut self, constraint: UserFrequencyConstraint) -> Self {
        self.user_frequency_constraints.push(constraint);
        self
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.kind == ActivityKind::Fixed
    }

    /// All activity IDs referenced by this activity's bindings.
    pub fn referenced_ids(&self) -> impl Iterator<Item = ActivityId> + '_ {
        self.input_bindings
            .iter()
            .chain(self.output_bindings.iter())
            .flat_map(|b| b.required_sets.iter().flatten().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_builders() {
        let a = Activity::floating(3, 4).with_priority(2.5).with_category(7);
        assert_eq!(a.id, 3);
        assert_eq!(a.kind, ActivityKind::Floating);
        assert_eq!(a.duration_slots, 4);
        assert_eq!(a.category_id, 7);
        assert!(!a.is_fixed());

        let f = Activity::fixed(1, 2, 40);
        assert!(f.is_fixed());
        assert_eq!(f.assigned_start, Some(40));
    }

    #[test]
    fn test_binding_weekday_mask() {
        let b = Binding::requiring(vec![0], TimeScope::SameDay, 1.0).on_weekdays(1 << 0);
        assert!(b.applies_on(0));
        assert!(!b.applies_on(1));
        assert!(!b.applies_on(7));
    }

    #[test]
    fn test_referenced_ids() {
        let a = Activity::floating(0, 1)
            .with_input_binding(Binding::requiring(vec![1, 2], TimeScope::SameDay, 1.0))
            .with_output_binding(
                Binding::requiring(vec![3], TimeScope::SameWeek, 1.0).or_requiring(vec![4]),
            );
        let ids: Vec<_> = a.referenced_ids().collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_user_frequency_deviation() {
        let c = UserFrequencyConstraint {
            scope: TimeScope::SameDay,
            min_count: Some(2),
            max_count: Some(3),
            deadline_end: None,
            penalty_weight: 1.0,
        };
        assert_eq!(c.deviation(0), 2);
        assert_eq!(c.deviation(2), 0);
        assert_eq!(c.deviation(3), 0);
        assert_eq!(c.deviation(5), 2);
        assert_eq!(UserFrequencyConstraint::at_most(TimeScope::SameDay, 1, 1.0).deviation(0), 0);
    }

    #[test]
    fn test_activity_wire_names() {
        let json = serde_json::to_value(Activity::fixed(0, 2, 5)).unwrap();
        assert_eq!(json["activity_type"], "Fixed");
        assert_eq!(json["assigned_start"], 5);
    }
}
