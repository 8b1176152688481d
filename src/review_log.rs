//! One immutable record per review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    card::{CardMemoryState, State},
    fsrs::Grade,
};

/// Written once by the scheduler and only read afterwards. Fields are private
/// so a stored entry cannot be edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    grade: Grade,
    previous_state: State,
    state: State,
    previous_stability: Option<f64>,
    previous_difficulty: Option<f64>,
    stability: f64,
    difficulty: f64,
    elapsed_days: u32,
    last_elapsed_days: u32,
    scheduled_days: u32,
    learning_steps: u32,
    due: DateTime<Utc>,
    reviewed_at: DateTime<Utc>,
}

impl ReviewLog {
    pub(crate) fn record(
        previous: &CardMemoryState,
        next: &CardMemoryState,
        grade: Grade,
        reviewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            grade,
            previous_state: previous.state,
            state: next.state,
            previous_stability: previous.stability,
            previous_difficulty: previous.difficulty,
            // Every reviewed card carries a memory state.
            stability: next.stability.unwrap_or_default(),
            difficulty: next.difficulty.unwrap_or_default(),
            elapsed_days: next.elapsed_days,
            last_elapsed_days: previous.elapsed_days,
            scheduled_days: next.scheduled_days,
            learning_steps: next.learning_steps,
            due: next.due,
            reviewed_at,
        }
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn previous_state(&self) -> State {
        self.previous_state
    }

    /// State the card moved to.
    pub fn state(&self) -> State {
        self.state
    }

    pub fn previous_stability(&self) -> Option<f64> {
        self.previous_stability
    }

    pub fn previous_difficulty(&self) -> Option<f64> {
        self.previous_difficulty
    }

    pub fn stability(&self) -> f64 {
        self.stability
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn elapsed_days(&self) -> u32 {
        self.elapsed_days
    }

    pub fn last_elapsed_days(&self) -> u32 {
        self.last_elapsed_days
    }

    pub fn scheduled_days(&self) -> u32 {
        self.scheduled_days
    }

    pub fn learning_steps(&self) -> u32 {
        self.learning_steps
    }

    pub fn due(&self) -> DateTime<Utc> {
        self.due
    }

    pub fn reviewed_at(&self) -> DateTime<Utc> {
        self.reviewed_at
    }
}
