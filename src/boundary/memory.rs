//! Buffer ownership across the call boundary.
//!
//! Every buffer handed to the host is one exact-size heap allocation
//! registered here by address and length. The host copies it and then
//! releases it exactly once. Releases are checked against the registry,
//! so a double release, a foreign pointer or a wrong length is rejected
//! with a [`BoundaryError`] instead of freeing memory twice.
//!
//! Zero-length results are represented by a null [`SlotBuffer`] and are
//! never allocated.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{error, trace};

use crate::error::BoundaryError;

/// A buffer handed across the C ABI.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotBuffer {
    pub ptr: *mut u8,
    pub len: usize,
}

impl SlotBuffer {
    /// The zero-length buffer (null pointer, no allocation).
    pub const fn empty() -> Self {
        Self {
            ptr: std::ptr::null_mut(),
            len: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ptr.is_null() || self.len == 0
    }
}

/// Allocation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferStats {
    pub allocations: u64,
    pub releases: u64,
    /// Buffers allocated and not yet released.
    pub live: usize,
}

/// Registry of live boundary buffers.
#[derive(Debug, Default)]
pub struct BoundaryBuffers {
    live: Mutex<HashMap<usize, usize>>,
    allocations: AtomicU64,
    releases: AtomicU64,
}

static GLOBAL: LazyLock<BoundaryBuffers> = LazyLock::new(BoundaryBuffers::new);

/// The process-wide registry behind the C ABI.
pub fn global() -> &'static BoundaryBuffers {
    &GLOBAL
}

impl BoundaryBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a zeroed buffer of `size` bytes.
    pub fn allocate(&self, size: usize) -> Result<SlotBuffer, BoundaryError> {
        if size == 0 {
            return Err(BoundaryError::ZeroSize);
        }
        Ok(self.register(vec![0u8; size].into_boxed_slice()))
    }

    /// Moves `bytes` into an exact-size registered buffer.
    ///
    /// Empty input yields [`SlotBuffer::empty`] without allocating.
    pub fn publish(&self, bytes: Vec<u8>) -> SlotBuffer {
        if bytes.is_empty() {
            return SlotBuffer::empty();
        }
        self.register(bytes.into_boxed_slice())
    }

    fn register(&self, data: Box<[u8]>) -> SlotBuffer {
        let len = data.len();
        let ptr = Box::into_raw(data).cast::<u8>();
        self.live.lock().insert(ptr as usize, len);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        trace!(addr = ptr as usize, len, "buffer allocated");
        SlotBuffer { ptr, len }
    }

    /// Releases a buffer previously returned by this registry.
    ///
    /// A length that does not match the allocation is rejected and the
    /// buffer stays live.
    pub fn release(&self, ptr: *mut u8, len: usize) -> Result<(), BoundaryError> {
        if ptr.is_null() {
            return Err(BoundaryError::NullPointer);
        }
        let addr = ptr as usize;
        {
            let mut live = self.live.lock();
            match live.get(&addr) {
                None => return Err(BoundaryError::UnknownBuffer { addr }),
                Some(&expected) if expected != len => {
                    return Err(BoundaryError::SizeMismatch {
                        addr,
                        expected,
                        actual: len,
                    });
                }
                Some(_) => {
                    live.remove(&addr);
                }
            }
        }

        // SAFETY: `addr` was produced by `Box::into_raw` on a `[u8]` of
        // exactly `len` bytes in `register`, and its registry entry was
        // removed above under the lock, so no other release can reach it.
        unsafe {
            drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)));
        }
        self.releases.fetch_add(1, Ordering::Relaxed);
        trace!(addr, len, "buffer released");
        Ok(())
    }

    /// Releases a [`SlotBuffer`]; the empty buffer is a no-op.
    pub fn release_buffer(&self, buffer: SlotBuffer) -> Result<(), BoundaryError> {
        if buffer.is_empty() {
            return Ok(());
        }
        self.release(buffer.ptr, buffer.len)
    }

    /// Copies a live buffer's contents.
    pub fn copy_out(&self, buffer: &SlotBuffer) -> Option<Vec<u8>> {
        if buffer.is_empty() {
            return Some(Vec::new());
        }
        let live = self.live.lock();
        if live.get(&(buffer.ptr as usize)) != Some(&buffer.len) {
            return None;
        }
        // SAFETY: the registry entry proves the allocation is live with
        // this length; holding the lock keeps it from being released.
        let bytes = unsafe { std::slice::from_raw_parts(buffer.ptr, buffer.len) };
        Some(bytes.to_vec())
    }

    /// Whether the buffer at `ptr` is allocated and not yet released.
    pub fn is_live(&self, ptr: *const u8) -> bool {
        self.live.lock().contains_key(&(ptr as usize))
    }

    pub fn stats(&self) -> BufferStats {
        BufferStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            live: self.live.lock().len(),
        }
    }
}

impl Drop for BoundaryBuffers {
    fn drop(&mut self) {
        let live = std::mem::take(self.live.get_mut());
        if !live.is_empty() {
            error!(count = live.len(), "registry dropped with unreleased buffers");
        }
        for (addr, len) in live {
            // SAFETY: every entry was registered from `Box::into_raw` with
            // this length and has not been released.
            unsafe {
                drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    addr as *mut u8,
                    len,
                )));
            }
        }
    }
}
