//! C ABI entry points.
//!
//! | Symbol | Purpose |
//! |--------|---------|
//! | `slot_solve` | Solve one problem buffer; returns a result buffer |
//! | `slot_alloc` | Allocate a host-side input buffer |
//! | `slot_release` | Release any buffer returned by this library |
//!
//! Every non-empty buffer returned here must be released exactly once
//! with its exact length. All buffers are tracked by the process-wide
//! [`BoundaryBuffers`](super::BoundaryBuffers) registry.

use tracing::error;

use super::memory::{SlotBuffer, global};
use super::solve::solve_into;
use crate::ga::SolverConfig;

/// Solves the MessagePack problem at `data_ptr[..len]`.
///
/// Returns the empty buffer (null, 0) for empty or rejected input and on
/// internal failure.
///
/// # Safety
/// `data_ptr` must be null or point to `len` readable bytes that stay
/// valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn slot_solve(
    data_ptr: *const u8,
    len: usize,
    max_generations: usize,
    time_limit_ms: u64,
) -> SlotBuffer {
    if data_ptr.is_null() || len == 0 {
        return SlotBuffer::empty();
    }
    // SAFETY: non-null and `len` readable bytes per the caller contract.
    let bytes = unsafe { std::slice::from_raw_parts(data_ptr, len) };
    solve_into(
        global(),
        bytes,
        max_generations,
        time_limit_ms,
        &SolverConfig::default(),
    )
}

/// Allocates `size` zeroed bytes, or returns null for `size == 0`.
#[no_mangle]
pub extern "C" fn slot_alloc(size: usize) -> *mut u8 {
    match global().allocate(size) {
        Ok(buffer) => buffer.ptr,
        Err(e) => {
            error!(error = %e, size, "allocation rejected");
            std::ptr::null_mut()
        }
    }
}

/// Releases a buffer from [`slot_solve`] or [`slot_alloc`].
///
/// Returns 0 on success and a negative status when the release is
/// rejected (null, unknown or already released pointer, wrong length).
#[no_mangle]
pub extern "C" fn slot_release(ptr: *mut u8, size: usize) -> i32 {
    match global().release(ptr, size) {
        Ok(()) => 0,
        Err(e) => {
            error!(error = %e, "release rejected");
            e.status_code()
        }
    }
}
