//! Problem decoder.
//!
//! Turns the opaque problem bytes into a validated [`Problem`]. Decoding
//! is pure: the same bytes always yield the same result, and failure is
//! an ordinary `Err` the caller maps to an empty result.
//!
//! # Stages
//! 1. Empty input is rejected before any parsing.
//! 2. MessagePack parse. Container lengths declared in the stream are
//!    only trusted as far as the bytes actually present; serde's cautious
//!    size hints cap up-front allocation.
//! 3. Trailing bytes after the problem are rejected.
//! 4. Semantic validation (see [`crate::validation`]).

use std::io::Cursor;

use crate::error::DecodeError;
use crate::models::Problem;
use crate::validation::validate_problem;

/// Decodes problem bytes into a problem the evaluator can trust.
///
/// Implementations must be pure and must never panic on arbitrary input.
pub trait ProblemDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Problem, DecodeError>;
}

/// Default decoder for MessagePack-encoded problems.
///
/// Accepts structs encoded either as maps keyed by field name or as
/// positional arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackDecoder;

impl ProblemDecoder for MessagePackDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Problem, DecodeError> {
        decode_problem(bytes)
    }
}

/// Decodes and validates a MessagePack problem.
pub fn decode_problem(bytes: &[u8]) -> Result<Problem, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut cursor = Cursor::new(bytes);
    let problem: Problem = rmp_serde::from_read(&mut cursor)?;

    let consumed = usize::try_from(cursor.position()).unwrap_or(bytes.len());
    if consumed < bytes.len() {
        return Err(DecodeError::TrailingBytes(bytes.len() - consumed));
    }

    validate_problem(&problem).map_err(DecodeError::Invalid)?;
    Ok(problem)
}
