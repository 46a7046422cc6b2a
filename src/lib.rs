//! # quiz-hub
//!
//! Terminal client for the Quiz Hub quiz service: play timed ten-question
//! quizzes, browse and manage questions, keep favorites and compete on
//! per-difficulty leaderboards.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quiz_hub::{client, Config, QuizHubError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizHubError> {
//!     let config = Config::default();
//!     client::run(&config).await
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod data;
pub mod favorites;
pub mod library;
pub mod logging;
pub mod models;
pub mod protocol;
pub mod quiz;
pub mod scores;
pub mod search;
pub mod terminal;
pub mod view_state;

use std::io;

pub use api::{ApiError, HubClient, QuizHubApi};
pub use config::{Cli, Command, Config};
pub use data::{load_draft, load_edit, LoadError};
pub use library::ManageError;
pub use logging::LogError;

/// Error type for the binary's top-level operations.
#[derive(Debug)]
pub enum QuizHubError {
    /// Backend request failed.
    Api(ApiError),
    /// A question could not be managed.
    Manage(ManageError),
    /// A draft file could not be loaded.
    Load(LoadError),
    /// Terminal or file IO failed.
    Io(io::Error),
    /// The log file could not be set up.
    Log(LogError),
    /// Unknown leaderboard name.
    UnknownBucket(String),
}

impl std::fmt::Display for QuizHubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizHubError::Api(e) => write!(f, "{}", e),
            QuizHubError::Manage(e) => write!(f, "{}", e),
            QuizHubError::Load(e) => write!(f, "Failed to load draft: {}", e),
            QuizHubError::Io(e) => write!(f, "IO error: {}", e),
            QuizHubError::Log(e) => write!(f, "Failed to set up logging: {}", e),
            QuizHubError::UnknownBucket(name) => write!(
                f,
                "Unknown leaderboard '{}' (expected EASY, MEDIUM, HARD, KANGAROO or RANDOM)",
                name
            ),
        }
    }
}

impl std::error::Error for QuizHubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizHubError::Api(e) => Some(e),
            QuizHubError::Manage(e) => Some(e),
            QuizHubError::Load(e) => Some(e),
            QuizHubError::Io(e) => Some(e),
            QuizHubError::Log(e) => Some(e),
            QuizHubError::UnknownBucket(_) => None,
        }
    }
}

impl From<ApiError> for QuizHubError {
    fn from(err: ApiError) -> Self {
        QuizHubError::Api(err)
    }
}

impl From<ManageError> for QuizHubError {
    fn from(err: ManageError) -> Self {
        QuizHubError::Manage(err)
    }
}

impl From<LoadError> for QuizHubError {
    fn from(err: LoadError) -> Self {
        QuizHubError::Load(err)
    }
}

impl From<io::Error> for QuizHubError {
    fn from(err: io::Error) -> Self {
        QuizHubError::Io(err)
    }
}

impl From<LogError> for QuizHubError {
    fn from(err: LogError) -> Self {
        QuizHubError::Log(err)
    }
}
