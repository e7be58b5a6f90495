//! Race - Tick-by-tick race state
//!
//! Handles racer setup, stepping and finish detection.

use serde::{Deserialize, Serialize};

use crate::error::{RaceError, Result};
use crate::race_server::layout::LaneLayout;
use crate::race_server::racer::{RacerColor, RacerSnapshot, RacerState};
use crate::race_server::render::{RacerUpdate, RenderSink};
use crate::race_server::steps::{StepBounds, StepSource};

/// Race status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    Running,
    Finished,
    Cancelled,
}

/// Winner of a finished race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    pub lane: usize,
    pub name: String,
    /// Offset from the start line on the winning tick
    pub position: u32,
    /// Ticks played, including the winning one
    pub ticks: u32,
}

/// Complete race state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    /// Current race status
    pub status: RaceStatus,
    /// Track geometry
    pub layout: LaneLayout,
    /// All racers, ordered by lane
    pub racers: Vec<RacerState>,
    /// Completed ticks
    pub ticks: u32,
    bounds: StepBounds,
    winner: Option<usize>,
}

impl Race {
    /// Create a race with one racer per name, all on the start line.
    ///
    /// Names and colors are index-aligned and give the lane order.
    pub fn new(
        names: &[String],
        colors: &[RacerColor],
        layout: LaneLayout,
        bounds: StepBounds,
    ) -> Result<Self> {
        if names.is_empty() {
            return Err(RaceError::invalid("a race needs at least one racer"));
        }
        if names.len() != colors.len() {
            return Err(RaceError::invalid(format!(
                "{} racer names but {} colors",
                names.len(),
                colors.len()
            )));
        }
        if layout.lane_count() != names.len() {
            return Err(RaceError::invalid(format!(
                "layout has {} lanes for {} racers",
                layout.lane_count(),
                names.len()
            )));
        }

        let racers = names
            .iter()
            .zip(colors)
            .enumerate()
            .map(|(lane, (name, color))| RacerState::new(lane, name.as_str(), color.clone()))
            .collect();

        Ok(Self {
            status: RaceStatus::Running,
            layout,
            racers,
            ticks: 0,
            bounds,
            winner: None,
        })
    }

    pub fn bounds(&self) -> StepBounds {
        self.bounds
    }

    /// Put every racer on the start line of the sink
    pub fn place_racers(&self, sink: &mut dyn RenderSink) {
        for racer in &self.racers {
            let lane_y = self.layout.lane_ys[racer.lane];
            sink.place_racer(racer.lane, &racer.name, &racer.color, self.layout.start_x, lane_y);
        }
    }

    /// Play one tick.
    ///
    /// Racers move in lane order. The first racer to reach the finish line wins
    /// and ends the tick; racers after it in lane order do not move.
    pub fn tick(&mut self, steps: &mut dyn StepSource, sink: &mut dyn RenderSink) -> RaceStatus {
        if self.status != RaceStatus::Running {
            return self.status;
        }

        self.ticks += 1;
        let LaneLayout {
            start_x,
            finish_x,
            ref lane_ys,
        } = self.layout;

        for racer in &mut self.racers {
            let step = steps.next_step(self.bounds);
            racer.advance(step);

            let x = racer.x(start_x);
            sink.update_racer(&RacerUpdate::new(racer.lane, &racer.name, x, lane_ys[racer.lane], start_x));

            if racer.has_finished(start_x, finish_x) {
                log::debug!("{} crossed the finish at x={} on tick {}", racer.name, x, self.ticks);
                self.winner = Some(racer.lane);
                self.status = RaceStatus::Finished;
                return self.status;
            }
        }

        sink.refresh();
        self.status
    }

    /// Stop a running race without a winner
    pub fn cancel(&mut self) {
        if self.status == RaceStatus::Running {
            self.status = RaceStatus::Cancelled;
        }
    }

    /// The winning racer, once finished
    pub fn winner(&self) -> Option<&RacerState> {
        self.winner.and_then(|lane| self.racers.get(lane))
    }

    pub fn result(&self) -> Option<RaceResult> {
        self.winner().map(|racer| RaceResult {
            lane: racer.lane,
            name: racer.name.clone(),
            position: racer.position(),
            ticks: self.ticks,
        })
    }

    /// Current leader by position, lowest lane on ties
    pub fn leader(&self) -> Option<&RacerState> {
        self.racers
            .iter()
            .reduce(|best, racer| if racer.position() > best.position() { racer } else { best })
    }

    /// Get compact snapshot for logging
    pub fn get_snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            status: self.status,
            ticks: self.ticks,
            racers: self.racers.iter().map(RacerSnapshot::from).collect(),
            winner: self.result(),
        }
    }
}

/// Compact race snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub status: RaceStatus,
    pub ticks: u32,
    pub racers: Vec<RacerSnapshot>,
    pub winner: Option<RaceResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race_server::render::{NullSink, RecordingSink};
    use crate::race_server::steps::{RandomSteps, ScriptedSteps};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    fn colors(count: usize) -> Vec<RacerColor> {
        (0..count).map(|i| RacerColor::new(format!("c{}", i))).collect()
    }

    fn straight_layout(count: usize, finish_x: i32) -> LaneLayout {
        LaneLayout {
            start_x: 0,
            finish_x,
            lane_ys: (0..count as i32).map(|i| 100 + i * 50).collect(),
        }
    }

    fn race(count: usize, finish_x: i32, min: u32, max: u32) -> Race {
        let all = names(&["Ruby", "Bluey", "Leafy", "Violet"]);
        Race::new(
            &all[..count],
            &colors(count),
            straight_layout(count, finish_x),
            StepBounds::new(min, max).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_lockstep_two_racers() {
        let mut race = race(2, 20, 5, 5);
        let mut sink = RecordingSink::new();
        let mut steps = RandomSteps;

        for tick in 1..=3 {
            assert_eq!(race.tick(&mut steps, &mut sink), RaceStatus::Running);
            assert!(race.racers.iter().all(|r| r.position() == tick * 5));
        }
        assert_eq!(race.tick(&mut steps, &mut sink), RaceStatus::Finished);

        let result = race.result().unwrap();
        assert_eq!(result.lane, 0);
        assert_eq!(result.name, "Ruby");
        assert_eq!(result.position, 20);
        assert_eq!(result.ticks, 4);
        // Lane 1 is not stepped on the winning tick
        assert_eq!(race.racers[1].position(), 15);
        assert_eq!(sink.refresh_count(), 3);
    }

    #[test]
    fn test_three_racers_unit_steps() {
        let mut race = race(3, 3, 1, 1);
        let mut steps = RandomSteps;
        while race.tick(&mut steps, &mut NullSink) == RaceStatus::Running {}
        assert_eq!(race.ticks, 3);
        assert_eq!(race.winner().unwrap().lane, 0);
    }

    #[test]
    fn test_lower_lane_wins_tie() {
        let mut race = race(2, 10, 1, 10);
        let mut steps = ScriptedSteps::new([10, 10]);
        assert_eq!(race.tick(&mut steps, &mut NullSink), RaceStatus::Finished);
        assert_eq!(race.winner().unwrap().lane, 0);
        assert_eq!(race.racers[1].position(), 0);
        assert_eq!(steps.remaining(), 1);
    }

    #[test]
    fn test_later_lanes_skip_the_winning_tick() {
        let mut race = race(3, 10, 1, 10);
        let mut steps = ScriptedSteps::new([4, 6, 2, 4, 4, 9]);
        let mut sink = RecordingSink::new();

        assert_eq!(race.tick(&mut steps, &mut sink), RaceStatus::Running);
        assert_eq!(race.tick(&mut steps, &mut sink), RaceStatus::Finished);
        assert_eq!(race.winner().unwrap().name, "Bluey");
        assert_eq!(race.racers[0].position(), 8);
        assert_eq!(race.racers[2].position(), 2);
        assert_eq!(steps.remaining(), 1);
        assert_eq!(sink.updates().count(), 5);
        assert_eq!(sink.refresh_count(), 1);
    }

    #[test]
    fn test_updates_carry_lane_y_and_distance() {
        let mut race = Race::new(
            &names(&["Ruby", "Bluey"]),
            &colors(2),
            LaneLayout {
                start_x: 120,
                finish_x: 780,
                lane_ys: vec![193, 316],
            },
            StepBounds::new(3, 3).unwrap(),
        )
        .unwrap();
        let mut sink = RecordingSink::new();
        race.tick(&mut RandomSteps, &mut sink);

        let updates: Vec<_> = sink.updates().cloned().collect();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], RacerUpdate::new(0, "Ruby", 123, 193, 120));
        assert_eq!(updates[1].lane_y, 316);
        assert_eq!(updates[1].distance, 3);
    }

    #[test]
    fn test_positions_never_decrease() {
        let mut race = race(4, 300, 1, 4);
        let mut previous = vec![0; 4];
        let mut steps = RandomSteps;
        let worst_case = race.bounds().worst_case_ticks(300);

        while race.tick(&mut steps, &mut NullSink) == RaceStatus::Running {
            for (racer, before) in race.racers.iter().zip(previous.iter_mut()) {
                assert!(racer.position() > *before);
                *before = racer.position();
            }
            assert!(race.ticks <= worst_case);
        }
        assert!(race.ticks <= worst_case);
        let winner = race.winner().unwrap();
        assert!(winner.x(race.layout.start_x) >= race.layout.finish_x);
    }

    #[test]
    fn test_finished_race_does_not_tick() {
        let mut race = race(1, 1, 1, 1);
        assert_eq!(race.tick(&mut RandomSteps, &mut NullSink), RaceStatus::Finished);
        assert_eq!(race.tick(&mut RandomSteps, &mut NullSink), RaceStatus::Finished);
        assert_eq!(race.ticks, 1);
    }

    #[test]
    fn test_cancel_stops_running_race() {
        let mut race = race(2, 100, 1, 1);
        race.tick(&mut RandomSteps, &mut NullSink);
        race.cancel();
        assert_eq!(race.tick(&mut RandomSteps, &mut NullSink), RaceStatus::Cancelled);
        assert_eq!(race.ticks, 1);
        assert!(race.result().is_none());
    }

    #[test]
    fn test_rejects_empty_and_mismatched_rosters() {
        let bounds = StepBounds::new(1, 4).unwrap();
        let err = Race::new(&[], &[], straight_layout(0, 10), bounds).unwrap_err();
        assert!(matches!(err, RaceError::InvalidConfiguration(_)));

        let err = Race::new(&names(&["Ruby", "Bluey"]), &colors(1), straight_layout(2, 10), bounds)
            .unwrap_err();
        assert!(matches!(err, RaceError::InvalidConfiguration(_)));

        let err = Race::new(&names(&["Ruby"]), &colors(1), straight_layout(2, 10), bounds)
            .unwrap_err();
        assert!(matches!(err, RaceError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_snapshot_and_leader() {
        let mut race = race(2, 50, 1, 10);
        race.tick(&mut ScriptedSteps::new([2, 7]), &mut NullSink);
        assert_eq!(race.leader().unwrap().name, "Bluey");

        let snapshot = race.get_snapshot();
        assert_eq!(snapshot.status, RaceStatus::Running);
        assert_eq!(snapshot.ticks, 1);
        assert_eq!(snapshot.racers[1].position, 7);
        assert!(snapshot.winner.is_none());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"Running\""));
    }
}
