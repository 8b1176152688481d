//! Error types for scheduling, configuration and storage.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::id::CardId;

/// Rejected scheduling input. Nothing has been computed or written when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid grade {0}, expected 1 (forgot) to 4 (easy)")]
    InvalidGrade(String),

    #[error("review at {reviewed_at} is before the last review at {last_review}")]
    NegativeElapsed {
        reviewed_at: DateTime<Utc>,
        last_review: DateTime<Utc>,
    },

    #[error("malformed memory state: {0}")]
    MalformedState(&'static str),

    #[error("review history is out of order at entry {0}")]
    OutOfOrder(usize),

    #[error("a review at {reviewed_at} would be due {days} days later, past the last representable date")]
    DueOutOfRange {
        reviewed_at: DateTime<Utc>,
        days: i64,
    },

    #[error("stability is no longer a finite number after this review")]
    StabilityOverflow,

    #[error("invalid card id {0:?}, expected 11 base64 characters")]
    InvalidCardId(String),
}

/// A parameter set that fails its own invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("expected {expected} weights, got {actual}")]
    WeightCount { expected: usize, actual: usize },

    #[error("weight w[{0}] is not a finite number")]
    NonFiniteWeight(usize),

    #[error("initial stability weight w[{0}] must be positive")]
    NonPositiveInitialStability(usize),

    #[error("desired retention must lie strictly between 0 and 1, got {0}")]
    Retention(f64),

    #[error("maximum interval must be at least one day")]
    MaximumInterval,

    #[error("learning steps must be positive minute counts")]
    LearningStep,

    #[error("relearning steps must be positive minute counts")]
    RelearningStep,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to replace data file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("no memory state stored for card {0}")]
    UnknownCard(CardId),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
