//! The byte-buffer call boundary.
//!
//! - [`solve`](solve::solve): problem bytes + budget → result bytes
//! - [`memory`]: ownership registry for buffers handed to the host
//! - [`ffi`]: C ABI wrappers (`slot_solve`, `slot_alloc`, `slot_release`)

pub mod ffi;
pub mod memory;
mod solve;

pub use memory::{BoundaryBuffers, BufferStats, SlotBuffer, global};
pub use solve::{SolveSession, solve, solve_into, solve_schedule, solve_with_config};
