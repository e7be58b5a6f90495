//! Lane Race
//!
//! A race between named racers on parallel lanes. Each tick every racer moves a
//! random step towards the finish line; the first to reach it wins.

pub mod config;
pub mod error;
pub mod race_server;
pub mod roster;
pub mod terminal;

pub use config::RaceConfig;
pub use error::{RaceError, Result};
pub use race_server::{CancelToken, RaceOutcome, RaceServer, RandomSteps, RenderSink};
pub use terminal::TerminalSink;

use std::io;

/// Prompt for racers on the console and run one race in the terminal
pub fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RaceConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        RaceConfig::default()
    });

    let names = roster::prompt_names(io::stdin().lock(), io::stdout(), &config.roster.default_names)?;
    let colors = roster::assign_colors(names.len(), &config.roster.palette)?;
    log::info!("Racers: {}", names.join(", "));

    let mut sink = TerminalSink::new(io::stdout(), config.terminal.clone(), config.canvas.width);
    let mut server = RaceServer::new(config);
    let outcome = server.run(&names, &colors, &mut RandomSteps, &mut sink, &CancelToken::new())?;

    if let Some(snapshot) = server.get_snapshot() {
        match serde_json::to_string(snapshot) {
            Ok(json) => log::debug!("Race summary: {}", json),
            Err(e) => log::warn!("Could not serialize race summary: {}", e),
        }
    }
    let stats = server.get_stats();
    log::debug!(
        "{} ticks, {:.3} ms average tick time",
        stats.ticks,
        stats.avg_tick_time_ms
    );

    if let RaceOutcome::Cancelled { ticks } = outcome {
        log::warn!("Race stopped after {} ticks without a winner", ticks);
    }
    Ok(())
}
