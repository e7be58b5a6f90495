//! Steps - How far a racer moves in one tick

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::StepConfig;
use crate::error::{RaceError, Result};

/// Validated inclusive step range, `1 <= min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepBounds {
    min: u32,
    max: u32,
}

impl StepBounds {
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min == 0 {
            return Err(RaceError::invalid("minimum step must be at least 1"));
        }
        if min > max {
            return Err(RaceError::invalid(format!(
                "minimum step {} exceeds maximum step {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Upper bound on the ticks needed to cover `distance`
    pub fn worst_case_ticks(&self, distance: u32) -> u32 {
        distance.div_ceil(self.min)
    }
}

impl TryFrom<&StepConfig> for StepBounds {
    type Error = RaceError;

    fn try_from(config: &StepConfig) -> Result<Self> {
        Self::new(config.min, config.max)
    }
}

/// Source of per-racer steps
pub trait StepSource {
    /// Draw one step within `bounds`
    fn next_step(&mut self, bounds: StepBounds) -> u32;
}

/// Uniform steps from the thread-local generator. Races are not reproducible.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSteps;

impl StepSource for RandomSteps {
    fn next_step(&mut self, bounds: StepBounds) -> u32 {
        rand::thread_rng().gen_range(bounds.min..=bounds.max)
    }
}

/// Replays a fixed list of steps, falling back to `bounds.min` once exhausted.
///
/// Scripted values are clamped into the bounds so a racer never moves backwards
/// or further than allowed.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSteps {
    steps: VecDeque<u32>,
}

impl ScriptedSteps {
    pub fn new(steps: impl IntoIterator<Item = u32>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl StepSource for ScriptedSteps {
    fn next_step(&mut self, bounds: StepBounds) -> u32 {
        self.steps
            .pop_front()
            .map_or(bounds.min, |step| step.clamp(bounds.min, bounds.max))
    }
}
