use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    fsrs::{MAX_DIFFICULTY, MIN_DIFFICULTY, MemoryState},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    #[default]
    New,
    Learning,
    Review,
    Relearning,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::New => "new",
            State::Learning => "learning",
            State::Review => "review",
            State::Relearning => "relearning",
        };
        f.pad(name)
    }
}

/// Everything the scheduler knows about one card. Produced fresh by every
/// review; the scheduler never mutates a value it was handed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMemoryState {
    pub due: DateTime<Utc>,
    pub stability: Option<f64>,
    pub difficulty: Option<f64>,
    pub elapsed_days: u32,
    pub scheduled_days: u32,
    pub reps: u32,
    pub lapses: u32,
    pub state: State,
    pub last_review: Option<DateTime<Utc>>,
    /// Index into the learning or relearning steps. Zero outside those states.
    pub learning_steps: u32,
}

impl CardMemoryState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            due: now,
            stability: None,
            difficulty: None,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            state: State::New,
            last_review: None,
            learning_steps: 0,
        }
    }

    pub fn is_new(&self) -> bool {
        self.state == State::New
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due <= now
    }

    pub fn memory(&self) -> Option<MemoryState> {
        Some(MemoryState {
            stability: self.stability?,
            difficulty: self.difficulty?,
        })
    }

    /// Checks a state read from storage before it is scheduled again.
    /// Returns the memory state and last review of a non-new card.
    pub(crate) fn validate(
        &self,
    ) -> Result<Option<(MemoryState, DateTime<Utc>)>, ValidationError> {
        if self.is_new() {
            return Ok(None);
        }
        let memory = self
            .memory()
            .ok_or(ValidationError::MalformedState("reviewed card without stability or difficulty"))?;
        let last_review = self
            .last_review
            .ok_or(ValidationError::MalformedState("reviewed card without a last review"))?;

        if !memory.stability.is_finite() || memory.stability <= 0.0 {
            return Err(ValidationError::MalformedState("stability must be positive"));
        }
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&memory.difficulty) {
            return Err(ValidationError::MalformedState("difficulty out of range"));
        }
        Ok(Some((memory, last_review)))
    }
}
