//! Race Server Module
//!
//! The race itself: lane layout, racer state, step generation, the tick loop
//! and the orchestration around it. Drawing happens behind [`RenderSink`].

pub mod layout;
pub mod race;
pub mod racer;
pub mod render;
pub mod simulation;
pub mod steps;

pub use layout::LaneLayout;
pub use race::{Race, RaceResult, RaceSnapshot, RaceStatus};
pub use racer::{RacerColor, RacerSnapshot, RacerState};
pub use render::{NullSink, RacerUpdate, RecordingSink, RenderEvent, RenderSink};
pub use simulation::{CancelToken, RaceOutcome, RaceServer, RaceStats};
pub use steps::{RandomSteps, ScriptedSteps, StepBounds, StepSource};
