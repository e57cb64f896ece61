//! Result encoder.
//!
//! Serializes the best schedule as a MessagePack map keyed by field name,
//! so hosts can read it without sharing Rust types. The encoding only
//! depends on the schedule value: placements are in canonical order and
//! nothing time- or address-dependent is written.

use crate::error::{DecodeError, EncodeError};
use crate::models::Schedule;

/// Encodes the best schedule, or nothing.
///
/// `None` yields a zero-length buffer.
pub fn encode_schedule(schedule: Option<&Schedule>) -> Result<Vec<u8>, EncodeError> {
    match schedule {
        None => Ok(Vec::new()),
        Some(schedule) => Ok(rmp_serde::to_vec_named(schedule)?),
    }
}

/// Reads back bytes produced by [`encode_schedule`].
///
/// Zero-length bytes decode to [`DecodeError::Empty`].
pub fn decode_schedule(bytes: &[u8]) -> Result<Schedule, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(rmp_serde::from_slice(bytes)?)
}
