//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Parser, Debug)]
#[command(version, about = "Terminal client for the Quiz Hub trivia service", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: Options,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug, Clone)]
pub struct Options {
    /// Base URL of the Quiz Hub backend
    #[arg(long, env = "QUIZ_HUB_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Base URL of the GitHub REST API used for owner profiles
    #[arg(long, env = "QUIZ_HUB_GITHUB_API", default_value = DEFAULT_GITHUB_API_URL, global = true)]
    pub github_api_url: String,

    /// Session cookie of a logged-in browser session (e.g. `JSESSIONID=...`)
    #[arg(long, env = "QUIZ_HUB_SESSION", global = true)]
    pub session_cookie: Option<String>,

    /// File the browse page and profile tab are remembered in
    #[arg(long, env = "QUIZ_HUB_STATE", default_value = "quiz-hub-state.json", global = true)]
    pub state_file: PathBuf,

    /// Log file (the terminal UI owns stdout)
    #[arg(long, env = "QUIZ_HUB_LOG", default_value = "quiz-hub.log", global = true)]
    pub log_file: PathBuf,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, env = "QUIZ_HUB_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: LevelFilter,

    /// HTTP request timeout in seconds
    #[arg(long, env = "QUIZ_HUB_TIMEOUT", default_value_t = 10, global = true)]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open the interactive terminal client (the default)
    Play,
    /// Submit a new question from a JSON draft file
    Add {
        draft: PathBuf,
        /// Image to attach to the question
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Edit one of your questions; fields the JSON file leaves out keep their current values
    Edit {
        id: String,
        draft: PathBuf,
        /// New image for the question
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete one of your questions
    Delete { id: String },
    /// List active questions
    List {
        /// Include inactive questions
        #[arg(long)]
        all: bool,
        /// Only your own questions
        #[arg(long, conflicts_with = "all")]
        mine: bool,
    },
    /// Print leaderboards (all buckets, or one of EASY, MEDIUM, HARD, KANGAROO, RANDOM)
    Scores { bucket: Option<String> },
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub github_api_url: String,
    pub session_cookie: Option<String>,
    pub state_file: PathBuf,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub timeout: Duration,
}

impl Config {
    pub fn from_options(options: Options) -> Self {
        Self {
            base_url: trim_slash(options.base_url),
            github_api_url: trim_slash(options.github_api_url),
            session_cookie: options.session_cookie.filter(|cookie| !cookie.trim().is_empty()),
            state_file: options.state_file,
            log_file: options.log_file,
            log_level: options.log_level,
            timeout: Duration::from_secs(options.timeout_secs.max(1)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            session_cookie: None,
            state_file: PathBuf::from("quiz-hub-state.json"),
            log_file: PathBuf::from("quiz-hub.log"),
            log_level: LevelFilter::Info,
            timeout: Duration::from_secs(10),
        }
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommand_and_options() {
        let cli = Cli::parse_from([
            "quiz-hub",
            "--base-url",
            "https://quiz.example.org/",
            "add",
            "draft.json",
            "--image",
            "cat.png",
        ]);

        let config = Config::from_options(cli.options);
        assert_eq!(config.base_url, "https://quiz.example.org");
        assert_eq!(config.timeout, Duration::from_secs(10));

        match cli.command {
            Some(Command::Add { draft, image }) => {
                assert_eq!(draft, PathBuf::from("draft.json"));
                assert_eq!(image, Some(PathBuf::from("cat.png")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_blank_cookie_is_anonymous() {
        let cli = Cli::parse_from(["quiz-hub", "--session-cookie", "  "]);
        let config = Config::from_options(cli.options);
        assert!(config.session_cookie.is_none());
        assert!(cli.command.is_none());
    }
}
