//! Slot scheduling domain models.
//!
//! Provides the data types for problems sent to the solver and the
//! schedules it sends back. All times are slot indices on a 15-minute
//! grid.
//!
//! # Domain Mappings
//!
//! | u-slot-evolve | Personal planning | Clinic | Facility |
//! |---------------|-------------------|--------|----------|
//! | Activity (floating) | Workout, deep work | Follow-up visit | Cleaning round |
//! | Activity (fixed) | Meeting | Surgery | Delivery window |
//! | ForbiddenZone | Sleep | Closed hours | Maintenance |
//! | Schedule | Week plan | Roster | Shift plan |

mod activity;
mod calendar;
mod constraint;
mod problem;
mod schedule;

pub use activity::{
    Activity, ActivityKind, Binding, FrequencyTarget, TimeScope, UserFrequencyConstraint,
};
pub use calendar::{
    SLOTS_PER_DAY, SLOTS_PER_WEEK, SlotWindow, day_of, days_in, week_of, weekday_of, weeks_in,
};
pub use constraint::{CumulativeRule, GlobalConstraint};
pub use problem::Problem;
pub use schedule::{Placement, SCHEDULE_FORMAT_VERSION, Schedule, Violation, ViolationKind};

/// A 15-minute slot index.
pub type TimeSlot = u16;

/// Dense activity identifier (`0..activities.len()`).
pub type ActivityId = usize;

/// Category identifier used by cumulative time rules.
pub type CategoryId = usize;
