//! Error types.
//!
//! None of these cross the call boundary: decode failures and
//! infeasibility degrade to the shape of the result bytes, and only
//! ownership misuse is reported back to the host as a status code.

use crate::validation::ValidationError;

/// Why a problem buffer could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("empty problem buffer")]
    Empty,
    #[error("malformed problem encoding: {0}")]
    Malformed(#[from] rmp_serde::decode::Error),
    #[error("{0} trailing byte(s) after the encoded problem")]
    TrailingBytes(usize),
    #[error("problem failed validation with {} issue(s)", .0.len())]
    Invalid(Vec<ValidationError>),
}

/// Why a schedule could not be encoded.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("schedule serialization failed: {0}")]
    Serialize(#[from] rmp_serde::encode::Error),
}

/// Invalid solver configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("population size must be at least 1")]
    EmptyPopulation,
    #[error("tournament size must be at least 1")]
    EmptyTournament,
    #[error("elite count {elite_count} must be below population size {population_size}")]
    TooManyElites {
        elite_count: usize,
        population_size: usize,
    },
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
}

/// Parent selection failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("cannot select parents from an empty population")]
    EmptyPopulation,
}

/// The problem admits no structurally valid candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedError {
    #[error("{0} floating activities exceed the allele range")]
    TooManyFloating(usize),
}

/// Ownership protocol misuse at the buffer boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoundaryError {
    #[error("zero-length buffers are never allocated")]
    ZeroSize,
    #[error("null buffer pointer")]
    NullPointer,
    #[error("buffer at {addr:#x} is not live (double release or never allocated)")]
    UnknownBuffer { addr: usize },
    #[error("buffer at {addr:#x} has length {expected}, release claimed {actual}")]
    SizeMismatch {
        addr: usize,
        expected: usize,
        actual: usize,
    },
}

impl BoundaryError {
    /// Status code reported through the C ABI.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::ZeroSize => -1,
            Self::NullPointer => -2,
            Self::UnknownBuffer { .. } => -3,
            Self::SizeMismatch { .. } => -4,
        }
    }
}

/// Any failure inside one solve call.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Seed(#[from] SeedError),
}
