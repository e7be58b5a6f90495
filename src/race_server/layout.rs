//! Layout - Lane placement on the canvas
//!
//! Computed once per race from the racer count and the canvas configuration.

use serde::{Deserialize, Serialize};

use crate::config::{CanvasConfig, MarginConfig};
use crate::error::{RaceError, Result};

/// Static track geometry for one race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneLayout {
    /// X coordinate of the start line
    pub start_x: i32,
    /// X coordinate of the finish line
    pub finish_x: i32,
    /// Y coordinate of each lane, indexed by lane
    pub lane_ys: Vec<i32>,
}

impl LaneLayout {
    /// Spread `count` lanes evenly over the usable height.
    ///
    /// Lane `i` sits at `top + (i + 1) * floor(usable / (count + 1))`. When the
    /// spacing floors to zero the lanes collide; that is accepted.
    pub fn compute(count: usize, canvas: &CanvasConfig, margins: &MarginConfig) -> Result<Self> {
        if count == 0 {
            return Err(RaceError::invalid("a race needs at least one racer"));
        }

        if canvas.width <= 0 || canvas.height <= 0 {
            return Err(RaceError::invalid(format!(
                "canvas must have a positive size, got {}x{}",
                canvas.width, canvas.height
            )));
        }
        let MarginConfig {
            top,
            bottom,
            left,
            right,
        } = *margins;
        if top < 0 || bottom < 0 || left < 0 || right < 0 {
            return Err(RaceError::invalid(format!(
                "margins must not be negative (top {}, bottom {}, left {}, right {})",
                top, bottom, left, right
            )));
        }

        let start_x = left;
        let finish_x = canvas
            .width
            .checked_sub(right)
            .ok_or_else(|| RaceError::invalid(format!("right margin {} out of range", right)))?;
        if finish_x <= start_x {
            return Err(RaceError::invalid(format!(
                "finish line ({}) must be right of the start line ({})",
                finish_x, start_x
            )));
        }

        let usable_height = canvas
            .height
            .checked_sub(top)
            .and_then(|h| h.checked_sub(bottom))
            .ok_or_else(|| {
                RaceError::invalid(format!("vertical margins {} + {} out of range", top, bottom))
            })?;
        if usable_height <= 0 {
            return Err(RaceError::invalid(format!(
                "no vertical room for lanes (usable height {})",
                usable_height
            )));
        }

        let lanes = i32::try_from(count)
            .ok()
            .filter(|&lanes| lanes < i32::MAX)
            .ok_or_else(|| RaceError::invalid(format!("too many racers: {}", count)))?;
        // top + (i + 1) * spacing never exceeds top + usable_height < height
        let spacing = usable_height / (lanes + 1);
        let lane_ys = (0..lanes).map(|i| top + (i + 1) * spacing).collect();

        Ok(Self {
            start_x,
            finish_x,
            lane_ys,
        })
    }

    /// Distance from start to finish
    pub fn track_length(&self) -> i32 {
        self.finish_x - self.start_x
    }

    pub fn lane_count(&self) -> usize {
        self.lane_ys.len()
    }

    pub fn lane_y(&self, lane: usize) -> Option<i32> {
        self.lane_ys.get(lane).copied()
    }
}
