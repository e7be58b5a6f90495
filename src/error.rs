//! Race error types
//!
//! Every failure the race can report is raised before the first tick.

use std::fmt;
use std::io;

/// Error type for race setup and the console front-end
#[derive(Debug)]
pub enum RaceError {
    /// Racer set, step bounds or canvas cannot produce a race
    InvalidConfiguration(String),
    /// Configuration sources could not be read or parsed
    Config(String),
    /// Console I/O failed
    Io(io::Error),
}

impl RaceError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        RaceError::InvalidConfiguration(msg.into())
    }
}

impl fmt::Display for RaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceError::InvalidConfiguration(msg) => write!(f, "Invalid race configuration: {}", msg),
            RaceError::Config(msg) => write!(f, "Configuration error: {}", msg),
            RaceError::Io(err) => write!(f, "Console IO error: {}", err),
        }
    }
}

impl std::error::Error for RaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RaceError::Io(err) => Some(err),
            RaceError::InvalidConfiguration(_) | RaceError::Config(_) => None,
        }
    }
}

impl From<io::Error> for RaceError {
    fn from(err: io::Error) -> Self {
        RaceError::Io(err)
    }
}

impl From<figment::Error> for RaceError {
    fn from(err: figment::Error) -> Self {
        RaceError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, RaceError>;
