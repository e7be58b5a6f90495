//! Racer - Individual racer state
//!
//! Each racer has a fixed lane, a display name and color, and an offset from
//! the start line. The race loop is the only thing that moves a racer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display color of a racer. Opaque to the race itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RacerColor(String);

impl RacerColor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RacerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RacerColor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Complete state for a single racer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacerState {
    /// Lane index, also the racer's turn order within a tick
    pub lane: usize,
    /// Display name
    pub name: String,
    /// Display color
    pub color: RacerColor,
    /// Offset travelled from the start line
    position: u32,
}

impl RacerState {
    /// Create a racer standing on the start line
    pub fn new(lane: usize, name: impl Into<String>, color: RacerColor) -> Self {
        Self {
            lane,
            name: name.into(),
            color,
            position: 0,
        }
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    /// Move forward by `step`. Positions never decrease.
    pub fn advance(&mut self, step: u32) -> u32 {
        self.position = self.position.saturating_add(step);
        self.position
    }

    /// Current X coordinate for a track whose start line is at `start_x`
    pub fn x(&self, start_x: i32) -> i32 {
        let offset = i32::try_from(self.position).unwrap_or(i32::MAX);
        start_x.saturating_add(offset)
    }

    /// Whether the racer has reached or passed `finish_x`
    pub fn has_finished(&self, start_x: i32, finish_x: i32) -> bool {
        self.x(start_x) >= finish_x
    }
}

/// Compact racer state for logging and summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacerSnapshot {
    pub lane: usize,
    pub name: String,
    pub position: u32,
}

impl From<&RacerState> for RacerSnapshot {
    fn from(state: &RacerState) -> Self {
        Self {
            lane: state.lane,
            name: state.name.clone(),
            position: state.position,
        }
    }
}
