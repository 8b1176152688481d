//! Scheduler parameters: the FSRS weight vector plus the scalar knobs.
//!
//! A [`ParameterSet`] is validated once, when it is built, and is immutable
//! afterwards. [`ParameterConfig`] is the loose serde form read from disk.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Error};

pub const WEIGHT_COUNT: usize = 19;

/// FSRS-5 default weights.
pub const DEFAULT_WEIGHTS: [f64; WEIGHT_COUNT] = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

pub const DEFAULT_RETENTION: f64 = 0.9;
pub const DEFAULT_MAXIMUM_INTERVAL: u32 = 36500;

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    weights: [f64; WEIGHT_COUNT],
    desired_retention: f64,
    maximum_interval: u32,
    enable_fuzz: bool,
    enable_short_term: bool,
    learning_steps: Vec<u32>,
    relearning_steps: Vec<u32>,
    hard_step_interpolation: bool,
}

impl ParameterSet {
    pub fn new(
        weights: &[f64],
        desired_retention: f64,
        maximum_interval: u32,
    ) -> Result<Self, ConfigurationError> {
        ParameterConfig {
            weights: Some(weights.to_vec()),
            desired_retention: Some(desired_retention),
            maximum_interval: Some(maximum_interval),
            ..Default::default()
        }
        .try_into()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = fs::File::open(path).map_err(crate::error::StoreError::from)?;
        let config: ParameterConfig =
            serde_json::from_reader(file).map_err(crate::error::StoreError::from)?;
        Ok(Self::try_from(config)?)
    }

    pub fn weights(&self) -> &[f64; WEIGHT_COUNT] {
        &self.weights
    }

    pub fn desired_retention(&self) -> f64 {
        self.desired_retention
    }

    pub fn maximum_interval(&self) -> u32 {
        self.maximum_interval
    }

    pub fn fuzz_enabled(&self) -> bool {
        self.enable_fuzz
    }

    pub fn short_term_enabled(&self) -> bool {
        self.enable_short_term
    }

    pub fn hard_step_interpolation(&self) -> bool {
        self.hard_step_interpolation
    }

    /// Learning steps in minutes. Empty when short-term scheduling is off.
    pub fn learning_steps(&self) -> &[u32] {
        if self.enable_short_term {
            self.learning_steps.as_slice()
        } else {
            &[]
        }
    }

    /// Relearning steps in minutes. Empty when short-term scheduling is off.
    pub fn relearning_steps(&self) -> &[u32] {
        if self.enable_short_term {
            self.relearning_steps.as_slice()
        } else {
            &[]
        }
    }

    pub fn with_fuzz(self, enable_fuzz: bool) -> Self {
        Self {
            enable_fuzz,
            ..self
        }
    }

    pub fn with_short_term(self, enable_short_term: bool) -> Self {
        Self {
            enable_short_term,
            ..self
        }
    }

    /// Replacing the steps goes through validation again.
    pub fn with_steps(
        self,
        learning_steps: Vec<u32>,
        relearning_steps: Vec<u32>,
    ) -> Result<Self, ConfigurationError> {
        ParameterConfig {
            learning_steps: Some(learning_steps),
            relearning_steps: Some(relearning_steps),
            ..ParameterConfig::from(self)
        }
        .try_into()
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
            desired_retention: DEFAULT_RETENTION,
            maximum_interval: DEFAULT_MAXIMUM_INTERVAL,
            enable_fuzz: true,
            enable_short_term: true,
            learning_steps: vec![1, 10],
            relearning_steps: vec![10],
            hard_step_interpolation: true,
        }
    }
}

/// Raw parameters as they appear in a config file. Missing fields take the
/// defaults of [`ParameterSet::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_retention: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_fuzz: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_short_term: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_steps: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relearning_steps: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_step_interpolation: Option<bool>,
}

impl From<ParameterSet> for ParameterConfig {
    fn from(params: ParameterSet) -> Self {
        Self {
            weights: Some(params.weights.to_vec()),
            desired_retention: Some(params.desired_retention),
            maximum_interval: Some(params.maximum_interval),
            enable_fuzz: Some(params.enable_fuzz),
            enable_short_term: Some(params.enable_short_term),
            learning_steps: Some(params.learning_steps),
            relearning_steps: Some(params.relearning_steps),
            hard_step_interpolation: Some(params.hard_step_interpolation),
        }
    }
}

impl TryFrom<ParameterConfig> for ParameterSet {
    type Error = ConfigurationError;

    fn try_from(config: ParameterConfig) -> Result<Self, Self::Error> {
        let defaults = ParameterSet::default();

        let weights = match config.weights {
            Some(w) => {
                let weights: [f64; WEIGHT_COUNT] =
                    w.as_slice()
                        .try_into()
                        .map_err(|_| ConfigurationError::WeightCount {
                            expected: WEIGHT_COUNT,
                            actual: w.len(),
                        })?;
                weights
            }
            None => defaults.weights,
        };
        if let Some(idx) = weights.iter().position(|w| !w.is_finite()) {
            return Err(ConfigurationError::NonFiniteWeight(idx));
        }
        if let Some(idx) = weights[..4].iter().position(|w| *w <= 0.0) {
            return Err(ConfigurationError::NonPositiveInitialStability(idx));
        }

        let desired_retention = config.desired_retention.unwrap_or(defaults.desired_retention);
        // NaN fails both comparisons
        if !(desired_retention > 0.0 && desired_retention < 1.0) {
            return Err(ConfigurationError::Retention(desired_retention));
        }

        let maximum_interval = config.maximum_interval.unwrap_or(defaults.maximum_interval);
        if maximum_interval == 0 {
            return Err(ConfigurationError::MaximumInterval);
        }

        let learning_steps = config.learning_steps.unwrap_or(defaults.learning_steps);
        if learning_steps.contains(&0) {
            return Err(ConfigurationError::LearningStep);
        }
        let relearning_steps = config.relearning_steps.unwrap_or(defaults.relearning_steps);
        if relearning_steps.contains(&0) {
            return Err(ConfigurationError::RelearningStep);
        }

        Ok(Self {
            weights,
            desired_retention,
            maximum_interval,
            enable_fuzz: config.enable_fuzz.unwrap_or(defaults.enable_fuzz),
            enable_short_term: config.enable_short_term.unwrap_or(defaults.enable_short_term),
            learning_steps,
            relearning_steps,
            hard_step_interpolation: config
                .hard_step_interpolation
                .unwrap_or(defaults.hard_step_interpolation),
        })
    }
}
