//! Terminal - Text renderer for the race
//!
//! Scales canvas X coordinates onto a fixed number of columns and redraws the
//! whole frame on every refresh. Each lane takes three rows: name label, track
//! with the racer marker, distance label.

use std::io::Write;

use crate::config::TerminalConfig;
use crate::race_server::{LaneLayout, RacerColor, RacerUpdate, RenderSink};

const TITLE: &str = "Lane Race";
const RACER_GLYPH: char = '>';
const LANE_GLYPH: char = '.';
const LINE_GLYPH: char = '|';
/// Extra columns so labels near the finish are not cut off
const SLACK: usize = 12;

#[derive(Debug, Clone)]
struct LaneRow {
    name: String,
    color: RacerColor,
    x: i32,
    distance: i32,
}

/// [`RenderSink`] writing ANSI text frames to any writer
pub struct TerminalSink<W: Write> {
    out: W,
    config: TerminalConfig,
    canvas_width: i32,
    layout: Option<LaneLayout>,
    lanes: Vec<Option<LaneRow>>,
    banner: Option<String>,
    write_failed: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, config: TerminalConfig, canvas_width: i32) -> Self {
        Self {
            out,
            config,
            canvas_width: canvas_width.max(1),
            layout: None,
            lanes: Vec::new(),
            banner: None,
            write_failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn width(&self) -> usize {
        usize::from(self.config.columns.max(1))
    }

    /// Column of a canvas X coordinate
    fn column(&self, x: i32) -> usize {
        let columns = i64::from(self.config.columns.max(1));
        let col = i64::from(x.max(0)) * columns / i64::from(self.canvas_width);
        col.clamp(0, columns - 1) as usize
    }

    fn blank_row(&self) -> Vec<char> {
        vec![' '; self.width() + SLACK]
    }

    fn paint(&self, color: &RacerColor, text: &str) -> String {
        match ansi_code(color.as_str()) {
            Some(code) if self.config.color => format!("\x1b[{}m{}\x1b[0m", code, text),
            _ => text.to_string(),
        }
    }

    fn render_frame(&self) -> String {
        let mut frame = String::from("\x1b[H\x1b[J");

        let mut header = self.blank_row();
        let title = self.banner.as_deref().unwrap_or(TITLE);
        write_centered(&mut header, self.width() / 2, title);
        push_row(&mut frame, &header, None);

        let Some(layout) = &self.layout else {
            return frame;
        };
        let start_col = self.column(layout.start_x);
        let finish_col = self.column(layout.finish_x);

        let mut markers = self.blank_row();
        write_centered(&mut markers, start_col, "START");
        write_centered(&mut markers, finish_col, "FINISH");
        push_row(&mut frame, &markers, None);

        for lane in self.lanes.iter().flatten() {
            let col = self.column(lane.x);

            let mut name_row = self.blank_row();
            write_centered(&mut name_row, col, &lane.name);
            push_row(&mut frame, &name_row, None);

            let mut track = self.blank_row();
            for cell in track.iter_mut().take(finish_col + 1).skip(start_col) {
                *cell = LANE_GLYPH;
            }
            track[start_col] = LINE_GLYPH;
            track[finish_col] = LINE_GLYPH;
            let marker = self.paint(&lane.color, &RACER_GLYPH.to_string());
            push_row(&mut frame, &track, Some((col, marker.as_str())));

            let mut distance_row = self.blank_row();
            write_centered(&mut distance_row, col, &lane.distance.to_string());
            push_row(&mut frame, &distance_row, None);
        }

        frame
    }

    fn lane_mut(&mut self, lane: usize) -> &mut Option<LaneRow> {
        if self.lanes.len() <= lane {
            self.lanes.resize(lane + 1, None);
        }
        &mut self.lanes[lane]
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn draw_track(&mut self, layout: &LaneLayout) {
        self.layout = Some(layout.clone());
        self.lanes = vec![None; layout.lane_count()];
    }

    fn place_racer(&mut self, lane: usize, name: &str, color: &RacerColor, start_x: i32, _lane_y: i32) {
        *self.lane_mut(lane) = Some(LaneRow {
            name: name.to_string(),
            color: color.clone(),
            x: start_x,
            distance: 0,
        });
    }

    fn update_racer(&mut self, update: &RacerUpdate) {
        let slot = self.lane_mut(update.lane);
        if let Some(row) = slot.as_mut() {
            row.x = update.x;
            row.distance = update.distance;
        } else {
            log::warn!("Lane {} updated before it was placed", update.lane);
            *slot = Some(LaneRow {
                name: update.name.clone(),
                color: RacerColor::new(""),
                x: update.x,
                distance: update.distance,
            });
        }
    }

    fn refresh(&mut self) {
        if self.write_failed {
            return;
        }
        let frame = self.render_frame();
        if let Err(e) = self
            .out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush())
        {
            log::warn!("Terminal write failed, no further frames: {}", e);
            self.write_failed = true;
        }
    }

    fn announce_winner(&mut self, name: &str) {
        self.banner = Some(format!("{} wins!", name));
    }
}

/// Overwrite `row` with `text` centered on `col`, clipped to the row
fn write_centered(row: &mut [char], col: usize, text: &str) {
    let len = text.chars().count();
    let start = col.saturating_sub(len / 2);
    for (cell, c) in row.iter_mut().skip(start).zip(text.chars()) {
        *cell = c;
    }
}

/// Append a row, optionally swapping one cell for a styled string
fn push_row(frame: &mut String, row: &[char], styled: Option<(usize, &str)>) {
    let mut line: String = match styled {
        Some((col, text)) if col < row.len() => {
            let mut line: String = row[..col].iter().collect();
            line.push_str(text);
            line.extend(&row[col + 1..]);
            line
        }
        _ => row.iter().collect(),
    };
    let trimmed = line.trim_end().len();
    line.truncate(trimmed);
    frame.push_str(&line);
    frame.push('\n');
}

/// ANSI SGR code for the palette color names
fn ansi_code(color: &str) -> Option<&'static str> {
    Some(match color {
        "red" => "31",
        "green" => "32",
        "blue" => "34",
        "purple" => "35",
        "cyan" => "36",
        "magenta" => "95",
        "orange" => "38;5;208",
        "gold" => "38;5;220",
        "pink" => "38;5;213",
        "brown" => "38;5;130",
        "navy" => "38;5;18",
        "darkgreen" => "38;5;22",
        _ => return None,
    })
}
