//! Simulation - Race orchestration and tick pacing
//!
//! Validates the roster, lays out the track, drives the race loop until
//! someone wins (or the race is cancelled) and reports to the render sink.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::RaceConfig;
use crate::error::Result;
use crate::race_server::layout::LaneLayout;
use crate::race_server::race::{Race, RaceResult, RaceSnapshot, RaceStatus};
use crate::race_server::racer::RacerColor;
use crate::race_server::render::RenderSink;
use crate::race_server::steps::{StepBounds, StepSource};

/// Shared flag an embedding application can set to stop a race early.
///
/// Checked once per tick, before any racer moves.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a race ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceOutcome {
    Finished(RaceResult),
    Cancelled { ticks: u32 },
}

impl RaceOutcome {
    pub fn winner(&self) -> Option<&str> {
        match self {
            RaceOutcome::Finished(result) => Some(&result.name),
            RaceOutcome::Cancelled { .. } => None,
        }
    }
}

/// Tick statistics of the last race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceStats {
    pub ticks: u32,
    pub avg_tick_time_ms: f32,
    pub racer_count: u32,
}

/// Runs races with a fixed configuration
pub struct RaceServer {
    config: RaceConfig,
    /// Ticks played in the last race
    tick_count: u32,
    /// Summed tick time of the last race, for averaging
    tick_time_total_ms: f32,
    /// Final state of the last race
    last_snapshot: Option<RaceSnapshot>,
}

impl RaceServer {
    pub fn new(config: RaceConfig) -> Self {
        Self {
            config,
            tick_count: 0,
            tick_time_total_ms: 0.0,
            last_snapshot: None,
        }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Validate the roster and build a race on the start line.
    ///
    /// Fails before anything is drawn.
    pub fn prepare(&self, names: &[String], colors: &[RacerColor]) -> Result<Race> {
        let bounds = StepBounds::try_from(&self.config.steps)?;
        // An empty roster fails here; a color mismatch fails in Race::new
        let layout = LaneLayout::compute(names.len(), &self.config.canvas, &self.config.margins)?;
        Race::new(names, colors, layout, bounds)
    }

    /// Run a whole race and return its outcome.
    ///
    /// The winner is announced exactly once. A cancelled race announces nothing.
    pub fn run(
        &mut self,
        names: &[String],
        colors: &[RacerColor],
        steps: &mut dyn StepSource,
        sink: &mut dyn RenderSink,
        cancel: &CancelToken,
    ) -> Result<RaceOutcome> {
        let mut race = self.prepare(names, colors)?;
        self.tick_count = 0;
        self.tick_time_total_ms = 0.0;
        self.last_snapshot = None;

        sink.draw_track(&race.layout);
        sink.refresh();
        race.place_racers(sink);
        sink.refresh();

        log::info!(
            "Race started with {} racers, finish line at {}",
            race.racers.len(),
            race.layout.finish_x
        );

        let delay = self.config.timing.tick_delay();
        loop {
            if cancel.is_cancelled() {
                race.cancel();
                break;
            }

            let tick_start = Instant::now();
            let status = race.tick(steps, sink);
            self.tick_count += 1;
            self.tick_time_total_ms += tick_start.elapsed().as_secs_f32() * 1000.0;

            if status != RaceStatus::Running {
                break;
            }
            if let Some(leader) = race.leader() {
                log::debug!("Tick {}: {} leads at {}", race.ticks, leader.name, leader.position());
            }
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }

        let outcome = match race.result() {
            Some(result) => {
                sink.announce_winner(&result.name);
                sink.refresh();
                log::info!("{} wins after {} ticks", result.name, result.ticks);
                RaceOutcome::Finished(result)
            }
            None => {
                log::info!("Race cancelled after {} ticks", race.ticks);
                RaceOutcome::Cancelled { ticks: race.ticks }
            }
        };

        self.last_snapshot = Some(race.get_snapshot());
        Ok(outcome)
    }

    /// Final state of the last race, if one ran
    pub fn get_snapshot(&self) -> Option<&RaceSnapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn get_stats(&self) -> RaceStats {
        let avg_tick_time = if self.tick_count == 0 {
            0.0
        } else {
            self.tick_time_total_ms / self.tick_count as f32
        };

        RaceStats {
            ticks: self.tick_count,
            avg_tick_time_ms: avg_tick_time,
            racer_count: self
                .last_snapshot
                .as_ref()
                .map(|s| s.racers.len() as u32)
                .unwrap_or(0),
        }
    }
}

impl Default for RaceServer {
    fn default() -> Self {
        Self::new(RaceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CanvasConfig, MarginConfig, StepConfig, TimingConfig};
    use crate::error::RaceError;
    use crate::race_server::render::{NullSink, RacerUpdate, RecordingSink, RenderEvent};
    use crate::race_server::steps::{RandomSteps, ScriptedSteps};

    fn server(min: u32, max: u32) -> RaceServer {
        RaceServer::new(RaceConfig {
            steps: StepConfig { min, max },
            timing: TimingConfig { tick_delay_ms: 0 },
            ..Default::default()
        })
    }

    fn roster(count: usize) -> (Vec<String>, Vec<RacerColor>) {
        let names = (0..count).map(|i| format!("Racer {}", i + 1)).collect();
        let colors = (0..count).map(|_| RacerColor::from("red")).collect();
        (names, colors)
    }

    #[test]
    fn test_run_announces_single_winner() {
        let mut server = server(1, 4);
        let (names, colors) = roster(6);
        let mut sink = RecordingSink::new();

        let outcome = server
            .run(&names, &colors, &mut RandomSteps, &mut sink, &CancelToken::new())
            .unwrap();

        let RaceOutcome::Finished(result) = outcome else {
            panic!("race should finish");
        };
        assert_eq!(sink.winners(), vec![result.name.as_str()]);
        // 660 units of track at no less than 1 per tick
        assert!(result.ticks <= 660);
        assert!(result.position >= 660);

        let snapshot = server.get_snapshot().unwrap();
        assert_eq!(snapshot.status, RaceStatus::Finished);
        assert_eq!(snapshot.winner.as_ref(), Some(&result));
        assert_eq!(server.get_stats().ticks, result.ticks);
        assert_eq!(server.get_stats().racer_count, 6);
    }

    #[test]
    fn test_setup_order() {
        let mut server = server(660, 660);
        let (names, colors) = roster(2);
        let mut sink = RecordingSink::new();
        server
            .run(&names, &colors, &mut RandomSteps, &mut sink, &CancelToken::new())
            .unwrap();

        assert!(matches!(sink.events[0], RenderEvent::Track(_)));
        assert_eq!(sink.events[1], RenderEvent::Refresh);
        assert!(matches!(sink.events[2], RenderEvent::Place { lane: 0, x: 120, .. }));
        assert!(matches!(sink.events[3], RenderEvent::Place { lane: 1, x: 120, .. }));
        assert_eq!(sink.events[4], RenderEvent::Refresh);
        assert!(matches!(sink.events[5], RenderEvent::Update(_)));
        assert_eq!(sink.events[6], RenderEvent::Winner("Racer 1".to_string()));
        assert_eq!(sink.events[7], RenderEvent::Refresh);
        assert_eq!(sink.events.len(), 8);
    }

    #[test]
    fn test_scripted_tie_goes_to_lower_lane() {
        let mut server = server(1, 700);
        let (names, colors) = roster(3);
        let mut steps = ScriptedSteps::new([100, 100, 100, 600, 600, 600]);

        let outcome = server
            .run(&names, &colors, &mut steps, &mut NullSink, &CancelToken::new())
            .unwrap();
        assert_eq!(outcome.winner(), Some("Racer 1"));
        assert_eq!(steps.remaining(), 2);
    }

    #[test]
    fn test_cancelled_before_first_tick() {
        let mut server = server(1, 4);
        let (names, colors) = roster(2);
        let mut sink = RecordingSink::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        let outcome = server
            .run(&names, &colors, &mut RandomSteps, &mut sink, &cancel)
            .unwrap();
        assert_eq!(outcome, RaceOutcome::Cancelled { ticks: 0 });
        assert!(sink.winners().is_empty());
        assert_eq!(sink.updates().count(), 0);
        assert_eq!(server.get_snapshot().unwrap().status, RaceStatus::Cancelled);
    }

    /// Records like `RecordingSink` and cancels the race after a number of refreshes
    struct CancellingSink {
        inner: RecordingSink,
        cancel: CancelToken,
        cancel_after: usize,
    }

    impl RenderSink for CancellingSink {
        fn place_racer(&mut self, lane: usize, name: &str, color: &RacerColor, start_x: i32, lane_y: i32) {
            self.inner.place_racer(lane, name, color, start_x, lane_y);
        }

        fn update_racer(&mut self, update: &RacerUpdate) {
            self.inner.update_racer(update);
        }

        fn refresh(&mut self) {
            self.inner.refresh();
            if self.inner.refresh_count() == self.cancel_after {
                self.cancel.cancel();
            }
        }

        fn announce_winner(&mut self, name: &str) {
            self.inner.announce_winner(name);
        }
    }

    #[test]
    fn test_cancelled_mid_race() {
        let mut server = server(1, 4);
        let (names, colors) = roster(3);
        let cancel = CancelToken::new();
        // Two setup refreshes, then one per running tick
        let mut sink = CancellingSink {
            inner: RecordingSink::new(),
            cancel: cancel.clone(),
            cancel_after: 2 + 3,
        };

        let outcome = server
            .run(&names, &colors, &mut RandomSteps, &mut sink, &cancel)
            .unwrap();

        assert_eq!(outcome, RaceOutcome::Cancelled { ticks: 3 });
        assert!(sink.inner.winners().is_empty());
        assert_eq!(sink.inner.updates().count(), 9);
        let snapshot = server.get_snapshot().unwrap();
        assert_eq!(snapshot.status, RaceStatus::Cancelled);
        assert!(snapshot.winner.is_none());
        assert_eq!(server.get_stats().ticks, 3);
    }

    #[test]
    fn test_invalid_configuration_draws_nothing() {
        let (names, colors) = roster(2);
        let cases = [
            (server(1, 4), Vec::new(), Vec::new()),
            (server(1, 4), names.clone(), colors[..1].to_vec()),
            (server(5, 4), names.clone(), colors.clone()),
        ];

        for (mut server, names, colors) in cases {
            let mut sink = RecordingSink::new();
            let err = server
                .run(&names, &colors, &mut RandomSteps, &mut sink, &CancelToken::new())
                .unwrap_err();
            assert!(matches!(err, RaceError::InvalidConfiguration(_)));
            assert!(sink.events.is_empty());
        }
    }

    #[test]
    fn test_degenerate_canvas_rejected() {
        let mut server = RaceServer::new(RaceConfig {
            canvas: CanvasConfig {
                width: 100,
                height: 500,
            },
            margins: MarginConfig::default(),
            ..Default::default()
        });
        let (names, colors) = roster(1);
        let err = server
            .run(&names, &colors, &mut RandomSteps, &mut NullSink, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, RaceError::InvalidConfiguration(_)));
        assert!(server.get_snapshot().is_none());
    }
}
