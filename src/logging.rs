//! File logging. The terminal UI owns stdout and stderr, so records go to a file.

use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use env_logger::{Target, WriteStyle};
use log::LevelFilter;

#[derive(Debug)]
pub enum LogError {
    Io(io::Error),
    SetLogger(log::SetLoggerError),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::Io(e) => write!(f, "Failed to open log file: {}", e),
            LogError::SetLogger(e) => write!(f, "Failed to install logger: {}", e),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogError::Io(e) => Some(e),
            LogError::SetLogger(e) => Some(e),
        }
    }
}

impl From<io::Error> for LogError {
    fn from(err: io::Error) -> Self {
        LogError::Io(err)
    }
}

impl From<log::SetLoggerError> for LogError {
    fn from(err: log::SetLoggerError) -> Self {
        LogError::SetLogger(err)
    }
}

/// Route `log` records at or above `level` to `path` (appending).
/// `RUST_LOG` directives, when set, refine the level per module.
pub fn init(path: &Path, level: LevelFilter) -> Result<(), LogError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder
        .filter_level(level)
        // request internals are noise at info
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)));
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.try_init()?;
    Ok(())
}
