//! Implements the memory model of the [Free Spaced Repetition Scheduling][fsrs]
//! algorithm (FSRS-5): the forgetting curve and the stability/difficulty
//! update rules. Scheduling policy lives in [`crate::scheduler`].
//!
//! [fsrs]: https://github.com/open-spaced-repetition/free-spaced-repetition-scheduler

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Exponent of the power forgetting curve.
pub const DECAY: f64 = -0.5;
/// Chosen so that `retrievability(s, s) == 0.9`, i.e. `0.9^(1/DECAY) - 1`.
pub const FACTOR: f64 = 19.0 / 81.0;

pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;
pub const MIN_STABILITY: f64 = 0.01;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Grade {
    Forgot = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Forgot, Grade::Hard, Grade::Good, Grade::Easy];

    fn value(self) -> f64 {
        self as u8 as f64
    }
}

impl TryFrom<u8> for Grade {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Grade::Forgot),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Good),
            4 => Ok(Grade::Easy),
            _ => Err(ValidationError::InvalidGrade(value.to_string())),
        }
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade as u8
    }
}

impl FromStr for Grade {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "forgot" | "again" => Ok(Grade::Forgot),
            "2" | "hard" => Ok(Grade::Hard),
            "3" | "good" => Ok(Grade::Good),
            "4" | "easy" => Ok(Grade::Easy),
            other => Err(ValidationError::InvalidGrade(other.to_string())),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Grade::Forgot => "forgot",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        };
        f.pad(name)
    }
}

/// Probability of recall after `elapsed_days` for a memory of the given
/// stability. Callers must not pass a non-positive stability.
pub fn retrievability(elapsed_days: f64, stability: f64) -> f64 {
    (1.0 + FACTOR * elapsed_days / stability).powf(DECAY)
}

/// Inverse of [`retrievability`]: the elapsed days at which recall drops to
/// `desired_retention`. Not rounded or clamped.
pub fn interval_for(stability: f64, desired_retention: f64) -> f64 {
    stability / FACTOR * (desired_retention.powf(1.0 / DECAY) - 1.0)
}

/// Stability and difficulty of one card.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    pub stability: f64,
    pub difficulty: f64,
}

impl MemoryState {
    pub fn new(stability: f64, difficulty: f64) -> Self {
        Self {
            stability: stability.max(MIN_STABILITY),
            difficulty: clamp_difficulty(difficulty),
        }
    }

    pub fn from_initial_grade(w: &[f64], grade: Grade) -> Self {
        Self::new(
            initial_stability(w, grade),
            initial_difficulty(w, grade),
        )
    }

    /// Review after at least a day, with `r` the retrievability at the time
    /// of the review.
    pub fn update_long_term(self, w: &[f64], grade: Grade, r: f64) -> Self {
        let stability = match grade {
            Grade::Forgot => self.forget_stability(w, r),
            _ => self.recall_stability(w, grade, r),
        };
        Self::new(stability, next_difficulty(w, self.difficulty, grade))
    }

    /// Review on the same day as the previous one.
    pub fn update_same_day(self, w: &[f64], grade: Grade) -> Self {
        let s = self.stability;
        let mut s2 = s * f64::exp(w[17] * (grade.value() - 3.0 + w[18]));
        if let Grade::Easy | Grade::Good = grade
            && s2 < s
        {
            s2 = s;
        }
        Self::new(s2, next_difficulty(w, self.difficulty, grade))
    }

    fn recall_stability(self, w: &[f64], grade: Grade, r: f64) -> f64 {
        let s = self.stability;
        let d = self.difficulty;

        let increase_d = 11.0 - d;
        let increase_s = s.powf(-w[9]);
        let increase_r = f64::exp(w[10] * (1.0 - r)) - 1.0;
        let hard_penalty = if grade == Grade::Hard { w[15] } else { 1.0 };
        let easy_bonus = if grade == Grade::Easy { w[16] } else { 1.0 };

        s * (1.0
            + f64::exp(w[8]) * increase_d * increase_s * increase_r * hard_penalty * easy_bonus)
    }

    fn forget_stability(self, w: &[f64], r: f64) -> f64 {
        let s = self.stability;
        let long_term = w[11]
            * self.difficulty.powf(-w[12])
            * ((s + 1.0).powf(w[13]) - 1.0)
            * f64::exp(w[14] * (1.0 - r));
        let short_term = s / f64::exp(w[17] * w[18]);
        long_term.min(short_term)
    }
}

pub fn clamp_difficulty(d: f64) -> f64 {
    d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

pub fn initial_stability(w: &[f64], grade: Grade) -> f64 {
    w[grade as usize - 1].max(MIN_STABILITY)
}

pub fn initial_difficulty(w: &[f64], grade: Grade) -> f64 {
    clamp_difficulty(w[4] - f64::exp(w[5] * (grade.value() - 1.0)) + 1.0)
}

/// Linear damping toward 10 followed by mean reversion toward the initial
/// difficulty of an easy card.
pub fn next_difficulty(w: &[f64], d: f64, grade: Grade) -> f64 {
    let delta_d = -w[6] * (grade.value() - 3.0);
    let d1 = d + delta_d * (10.0 - d) / 9.0;
    let d2 = w[7] * initial_difficulty(w, Grade::Easy) + (1.0 - w[7]) * d1;
    clamp_difficulty(d2)
}
