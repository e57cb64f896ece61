//! Slot calendar and slot windows.
//!
//! The horizon is a sequence of 15-minute slots starting on a Monday at
//! midnight. Day, week and weekday are derived from the slot index alone.
//!
//! # Time Model
//! - 96 slots per day, 672 slots per week.
//! - Weekday 0 = Monday, 6 = Sunday.
//! - Windows are half-open: `[start, end)`.

use serde::{Deserialize, Serialize};

/// Slots in one day.
pub const SLOTS_PER_DAY: u32 = 96;
/// Slots in one week.
pub const SLOTS_PER_WEEK: u32 = SLOTS_PER_DAY * 7;

/// A slot interval `[start, end)`.
///
/// Stored as `u32` so `start + duration` never overflows the `u16`
/// slot range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotWindow {
    /// Interval start (inclusive).
    pub start: u32,
    /// Interval end (exclusive).
    pub end: u32,
}

impl SlotWindow {
    /// Creates a new window.
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Window of `duration` slots beginning at `start`.
    pub fn starting_at(start: u32, duration: u32) -> Self {
        Self::new(start, start.saturating_add(duration))
    }

    /// Number of slots covered.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the window covers no slot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether a slot falls within this window.
    #[inline]
    pub fn contains(&self, slot: u32) -> bool {
        slot >= self.start && slot < self.end
    }

    /// Whether two windows share at least one slot.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersection with `[0, horizon)`.
    pub fn clamp_to(&self, horizon: u32) -> Self {
        Self::new(self.start.min(horizon), self.end.min(horizon))
    }
}

/// Day index of a slot.
#[inline]
pub fn day_of(slot: u32) -> usize {
    (slot / SLOTS_PER_DAY) as usize
}

/// Week index of a slot.
#[inline]
pub fn week_of(slot: u32) -> usize {
    (slot / SLOTS_PER_WEEK) as usize
}

/// Weekday of a slot (0 = Monday).
#[inline]
pub fn weekday_of(slot: u32) -> usize {
    day_of(slot) % 7
}

/// Number of day buckets touched by a horizon of `total_slots`.
pub fn days_in(total_slots: u32) -> usize {
    (total_slots.div_ceil(SLOTS_PER_DAY) as usize).max(1)
}

/// Number of week buckets touched by a horizon of `total_slots`.
pub fn weeks_in(total_slots: u32) -> usize {
    (total_slots.div_ceil(SLOTS_PER_WEEK) as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_basics() {
        let w = SlotWindow::starting_at(10, 4);
        assert_eq!(w.end, 14);
        assert_eq!(w.len(), 4);
        assert!(w.contains(10));
        assert!(w.contains(13));
        assert!(!w.contains(14));
        assert!(!w.is_empty());
        assert!(SlotWindow::new(5, 5).is_empty());
    }

    #[test]
    fn test_window_overlap_is_half_open() {
        let a = SlotWindow::new(0, 4);
        assert!(a.overlaps(&SlotWindow::new(3, 6)));
        assert!(!a.overlaps(&SlotWindow::new(4, 6)));
        assert!(!SlotWindow::new(4, 6).overlaps(&a));
    }

    #[test]
    fn test_clamp() {
        let w = SlotWindow::new(90, 120).clamp_to(96);
        assert_eq!(w, SlotWindow::new(90, 96));
        assert!(SlotWindow::new(100, 120).clamp_to(96).is_empty());
    }

    #[test]
    fn test_calendar_indices() {
        assert_eq!(day_of(95), 0);
        assert_eq!(day_of(96), 1);
        assert_eq!(week_of(671), 0);
        assert_eq!(week_of(672), 1);
        assert_eq!(weekday_of(96 * 8), 1);
        assert_eq!(days_in(96), 1);
        assert_eq!(days_in(97), 2);
        assert_eq!(days_in(0), 1);
        assert_eq!(weeks_in(672 * 2 + 1), 3);
    }
}
