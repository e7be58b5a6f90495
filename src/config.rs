//! Race configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`LANE_RACE_SECTION__KEY`)

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "LANE_RACE_";

/// Complete race configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Drawing surface dimensions
    #[serde(default)]
    pub canvas: CanvasConfig,
    /// Space kept clear around the track
    #[serde(default)]
    pub margins: MarginConfig,
    /// Per-tick step bounds
    #[serde(default)]
    pub steps: StepConfig,
    /// Tick pacing
    #[serde(default)]
    pub timing: TimingConfig,
    /// Default racers and their colors
    #[serde(default)]
    pub roster: RosterConfig,
    /// Terminal renderer settings
    #[serde(default)]
    pub terminal: TerminalConfig,
}

impl RaceConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::from(Serialized::defaults(RaceConfig::default()));

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // LANE_RACE_STEPS__MAX=8 -> steps.max = 8
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::from_figment(figment)
    }

    /// Extract a configuration from an already assembled figment
    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }
}

/// Canvas configuration, in world units (pixels on a graphical surface)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 500,
        }
    }
}

/// Margin configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginConfig {
    pub top: i32,
    pub bottom: i32,
    /// Start line sits on the left margin
    pub left: i32,
    /// Finish line sits this far from the right edge
    pub right: i32,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            top: 70,
            bottom: 60,
            left: 120,
            right: 120,
        }
    }
}

/// Step bounds, both inclusive. Smaller steps make a slower race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    pub min: u32,
    pub max: u32,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self { min: 1, max: 4 }
    }
}

/// Timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Pause between ticks in milliseconds
    pub tick_delay_ms: u64,
}

impl TimingConfig {
    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { tick_delay_ms: 20 }
    }
}

/// Roster configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Racers used when the prompt yields no names
    pub default_names: Vec<String>,
    /// Colors handed out by lane, wrapping around
    pub palette: Vec<String>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        let names = ["Ruby", "Bluey", "Leafy", "Violet", "Sunny", "Cobalt"];
        let palette = [
            "red", "blue", "green", "purple", "orange", "gold", "pink", "brown", "cyan",
            "magenta", "navy", "darkgreen",
        ];
        Self {
            default_names: names.iter().map(|n| n.to_string()).collect(),
            palette: palette.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Terminal renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Columns the canvas width is scaled onto
    pub columns: u16,
    /// Emit ANSI colors
    pub color: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            columns: 100,
            color: true,
        }
    }
}
