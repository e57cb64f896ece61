//! Horizon-wide constraints.
//!
//! Global constraints apply to every occurrence regardless of which
//! activity produced it: forbidden zones block slot ranges, cumulative
//! time rules bound how much of a category fits in each period.

use serde::{Deserialize, Serialize};

use super::{CategoryId, SlotWindow, TimeSlot};

/// A constraint that is not attached to a single activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GlobalConstraint {
    /// No occurrence may intersect `[start, end)`.
    ForbiddenZone { start: TimeSlot, end: TimeSlot },

    /// Per `period_slots` bucket, the summed duration of the category
    /// (every category when `None`) must lie in `[min_duration, max_duration]`.
    CumulativeTime {
        category_id: Option<CategoryId>,
        period_slots: u16,
        min_duration: u16,
        max_duration: u16,
    },
}

impl GlobalConstraint {
    /// Creates a forbidden zone.
    pub fn forbidden(start: TimeSlot, end: TimeSlot) -> Self {
        Self::ForbiddenZone { start, end }
    }

    /// Creates a cumulative time rule.
    pub fn cumulative(
        category_id: Option<CategoryId>,
        period_slots: u16,
        min_duration: u16,
        max_duration: u16,
    ) -> Self {
        Self::CumulativeTime {
            category_id,
            period_slots,
            min_duration,
            max_duration,
        }
    }

    /// The blocked window, for forbidden zones.
    pub fn forbidden_window(&self) -> Option<SlotWindow> {
        match *self {
            Self::ForbiddenZone { start, end } => Some(SlotWindow::new(start.into(), end.into())),
            Self::CumulativeTime { .. } => None,
        }
    }
}

/// A cumulative time rule in evaluation-ready form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulativeRule {
    pub category_id: Option<CategoryId>,
    pub period_slots: u32,
    pub min_duration: u32,
    pub max_duration: u32,
    /// Number of period buckets covering the horizon.
    pub bucket_count: usize,
}

impl CumulativeRule {
    /// Extracts the rule from a constraint, given the horizon length.
    ///
    /// Periods at least as long as the horizon collapse into one bucket.
    pub fn from_constraint(constraint: &GlobalConstraint, total_slots: TimeSlot) -> Option<Self> {
        let GlobalConstraint::CumulativeTime {
            category_id,
            period_slots,
            min_duration,
            max_duration,
        } = *constraint
        else {
            return None;
        };
        if period_slots == 0 {
            return None;
        }
        let total = u32::from(total_slots);
        let period = u32::from(period_slots);
        let bucket_count = if period >= total {
            1
        } else {
            total.div_ceil(period) as usize
        };
        Some(Self {
            category_id,
            period_slots: period,
            min_duration: min_duration.into(),
            max_duration: max_duration.into(),
            bucket_count,
        })
    }

    /// Whether the rule tracks the given category.
    #[inline]
    pub fn tracks(&self, category_id: CategoryId) -> bool {
        self.category_id.is_none_or(|c| c == category_id)
    }

    /// Bucket index for an occurrence starting at `start`.
    #[inline]
    pub fn bucket_of(&self, start: u32) -> usize {
        ((start / self.period_slots) as usize).min(self.bucket_count - 1)
    }

    /// Slots by which `total` misses `[min_duration, max_duration]`.
    #[inline]
    pub fn deviation(&self, total: u32) -> u32 {
        if total < self.min_duration {
            self.min_duration - total
        } else {
            total.saturating_sub(self.max_duration)
        }
    }
}
