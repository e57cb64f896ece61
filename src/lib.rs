//! Bounded-budget evolutionary time-slot scheduler.
//!
//! Places recurring, movable activities on a 15-minute slot horizon around
//! fixed commitments. Hard rules (no overlap, forbidden zones, cumulative
//! time, frequency bounds) decide feasibility; soft preferences (priority,
//! slot heatmap, activity transitions, bindings, frequency targets) rank
//! feasible schedules. The search is a generational evolutionary loop that
//! stops on a generation count or a wall-clock limit, whichever comes
//! first, and always returns the best schedule seen so far.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Activity`, `Binding`, `GlobalConstraint`,
//!   `Problem`, `Schedule`, slot calendar
//! - **`validation`**: Integrity checks on decoded problems
//! - **`codec`**: MessagePack problem decoder and result encoder
//! - **`ga`**: Generational engine, slot encoding, fitness evaluator
//! - **`boundary`**: Byte-buffer call contract and C ABI
//! - **`error`**: Error types
//!
//! # Call contract
//!
//! ```
//! use u_slot_evolve::boundary::solve;
//! use u_slot_evolve::codec::decode_schedule;
//! use u_slot_evolve::models::{Activity, GlobalConstraint, Problem};
//!
//! let problem = Problem::new(96)
//!     .with_activity(Activity::floating(0, 4).with_priority(2.0))
//!     .with_activity(Activity::fixed(0, 8, 36))
//!     .with_constraint(GlobalConstraint::forbidden(0, 28));
//! let bytes = rmp_serde::to_vec_named(&problem).unwrap();
//!
//! let result = solve(&bytes, 50, 2_000);
//! let schedule = decode_schedule(&result).unwrap();
//! assert!(schedule.feasible);
//! ```
//!
//! # References
//!
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Deb (2000), "An efficient constraint handling method for genetic algorithms"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod boundary;
pub mod codec;
pub mod error;
pub mod ga;
pub mod models;
pub mod validation;

pub use boundary::{solve, solve_with_config};
pub use error::SolveError;
pub use ga::SolverConfig;
