//! Render - Output side of the race
//!
//! The race never draws anything itself. It reports placements, moves and the
//! winner to a [`RenderSink`], which decides what they look like.

use serde::{Deserialize, Serialize};

use crate::race_server::layout::LaneLayout;
use crate::race_server::racer::RacerColor;

/// A racer's new place on the canvas after a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacerUpdate {
    pub lane: usize,
    pub name: String,
    /// Racer marker X
    pub x: i32,
    /// Fixed Y of the racer's lane
    pub lane_y: i32,
    /// Distance label value, `max(0, x - start_x)`
    pub distance: i32,
}

impl RacerUpdate {
    pub fn new(lane: usize, name: &str, x: i32, lane_y: i32, start_x: i32) -> Self {
        Self {
            lane,
            name: name.to_string(),
            x,
            lane_y,
            distance: (x - start_x).max(0),
        }
    }
}

/// Drawing surface driven by the race
pub trait RenderSink {
    /// Draw static decorations (start/finish markers, lane lines)
    fn draw_track(&mut self, _layout: &LaneLayout) {}

    /// Put a racer on the start line. Called once per racer before the first tick.
    fn place_racer(&mut self, lane: usize, name: &str, color: &RacerColor, start_x: i32, lane_y: i32);

    /// Move a racer and its labels
    fn update_racer(&mut self, update: &RacerUpdate);

    /// Flush pending changes as one frame
    fn refresh(&mut self);

    /// Show the winner. Called exactly once per finished race.
    fn announce_winner(&mut self, name: &str);
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn draw_track(&mut self, layout: &LaneLayout) {
        (**self).draw_track(layout)
    }

    fn place_racer(&mut self, lane: usize, name: &str, color: &RacerColor, start_x: i32, lane_y: i32) {
        (**self).place_racer(lane, name, color, start_x, lane_y)
    }

    fn update_racer(&mut self, update: &RacerUpdate) {
        (**self).update_racer(update)
    }

    fn refresh(&mut self) {
        (**self).refresh()
    }

    fn announce_winner(&mut self, name: &str) {
        (**self).announce_winner(name)
    }
}

/// Sink that discards everything, for headless races
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn place_racer(&mut self, _lane: usize, _name: &str, _color: &RacerColor, _start_x: i32, _lane_y: i32) {}

    fn update_racer(&mut self, _update: &RacerUpdate) {}

    fn refresh(&mut self) {}

    fn announce_winner(&mut self, _name: &str) {}
}

/// Everything a [`RecordingSink`] was asked to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderEvent {
    Track(LaneLayout),
    Place {
        lane: usize,
        name: String,
        color: RacerColor,
        x: i32,
        y: i32,
    },
    Update(RacerUpdate),
    Refresh,
    Winner(String),
}

/// Sink that keeps every call in order
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<RenderEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All racer updates, in call order
    pub fn updates(&self) -> impl Iterator<Item = &RacerUpdate> {
        self.events.iter().filter_map(|event| match event {
            RenderEvent::Update(update) => Some(update),
            _ => None,
        })
    }

    pub fn refresh_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, RenderEvent::Refresh))
            .count()
    }

    pub fn winners(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Winner(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl RenderSink for RecordingSink {
    fn draw_track(&mut self, layout: &LaneLayout) {
        self.events.push(RenderEvent::Track(layout.clone()));
    }

    fn place_racer(&mut self, lane: usize, name: &str, color: &RacerColor, start_x: i32, lane_y: i32) {
        self.events.push(RenderEvent::Place {
            lane,
            name: name.to_string(),
            color: color.clone(),
            x: start_x,
            y: lane_y,
        });
    }

    fn update_racer(&mut self, update: &RacerUpdate) {
        self.events.push(RenderEvent::Update(update.clone()));
    }

    fn refresh(&mut self) {
        self.events.push(RenderEvent::Refresh);
    }

    fn announce_winner(&mut self, name: &str) {
        self.events.push(RenderEvent::Winner(name.to_string()));
    }
}
