//! Leaderboard qualification and high-score submission.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use crate::api::{ApiError, QuizHubApi};
use crate::models::{Bucket, CurrentUser, HighScoreEntry, RunScore};
use crate::protocol::NewHighScore;
use crate::quiz::QuizResult;

/// Entries kept per bucket.
pub const LEADERBOARD_SIZE: usize = 10;
pub const PLAYER_NAME_MIN: usize = 3;
pub const PLAYER_NAME_MAX: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    TooShort { min: usize },
    TooLong { max: usize },
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::TooShort { min } => {
                write!(f, "Player name must be at least {} characters", min)
            }
            NameError::TooLong { max } => {
                write!(f, "Player name must be at most {} characters", max)
            }
        }
    }
}

impl std::error::Error for NameError {}

/// Trim `raw` and check its length in characters.
pub fn validate_player_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len < PLAYER_NAME_MIN {
        return Err(NameError::TooShort {
            min: PLAYER_NAME_MIN,
        });
    }
    if len > PLAYER_NAME_MAX {
        return Err(NameError::TooLong {
            max: PLAYER_NAME_MAX,
        });
    }
    Ok(name.to_string())
}

/// Whether `score` earns a place on `board`.
///
/// A board with free slots accepts anything; a full board requires a
/// score strictly better than its worst entry.
pub fn qualifies(board: &[HighScoreEntry], score: RunScore) -> bool {
    if board.len() < LEADERBOARD_SIZE {
        return true;
    }
    board
        .iter()
        .map(HighScoreEntry::score)
        .max_by(|a, b| a.rank_cmp(b))
        .is_some_and(|worst| score.rank_cmp(&worst).is_lt())
}

/// Build the submission body for a finished run.
pub fn new_high_score(
    result: &QuizResult,
    player_name: &str,
    user: &CurrentUser,
    date: DateTime<Utc>,
) -> Result<NewHighScore, NameError> {
    let player_name = validate_player_name(player_name)?;
    Ok(NewHighScore {
        player_name,
        owner_id: user.id().to_string(),
        bucket: result.bucket(),
        category: result.entry_category(),
        wrong_answer_count: result.wrong_answers,
        score_time: result.score_time,
        date,
    })
}

/// Cached leaderboards, one per bucket, kept in rank order.
#[derive(Debug, Default)]
pub struct Leaderboards {
    boards: HashMap<Bucket, Vec<HighScoreEntry>>,
}

impl Leaderboards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, bucket: Bucket, mut entries: Vec<HighScoreEntry>) {
        entries.sort_by(|a, b| a.score().rank_cmp(&b.score()));
        self.boards.insert(bucket, entries);
    }

    pub fn get(&self, bucket: Bucket) -> &[HighScoreEntry] {
        self.boards.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_loaded(&self, bucket: Bucket) -> bool {
        self.boards.contains_key(&bucket)
    }

    /// Only complete runs can be ranked.
    pub fn qualifies(&self, result: &QuizResult) -> bool {
        result.is_full_run() && qualifies(self.get(result.bucket()), result.score())
    }

    pub fn owner_ids(&self) -> impl Iterator<Item = &str> {
        self.boards
            .values()
            .flatten()
            .map(|entry| entry.owner_id.as_str())
    }
}

/// Outcome of [`submit_and_refresh`].
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// The stored entry, or `None` if the backend did not keep it.
    pub recorded: Option<HighScoreEntry>,
    pub board: Vec<HighScoreEntry>,
}

/// Post `score` and re-read its bucket.
pub async fn submit_and_refresh<A>(api: &A, score: &NewHighScore) -> Result<Submission, ApiError>
where
    A: QuizHubApi + ?Sized,
{
    let recorded = api.submit_high_score(score).await?;
    if recorded.is_none() {
        log::info!(
            "high score for {} was not recorded by the backend",
            score.bucket.key()
        );
    }
    let board = api.high_scores(score.bucket).await?;
    Ok(Submission { recorded, board })
}

/// Fetch every bucket concurrently.
pub async fn fetch_all<A>(api: &A) -> Vec<(Bucket, Result<Vec<HighScoreEntry>, ApiError>)>
where
    A: QuizHubApi + ?Sized,
{
    let fetches = Bucket::ALL.into_iter().map(|bucket| async move {
        let result = api.high_scores(bucket).await;
        if let Err(e) = &result {
            log::error!("Error fetching {} high scores: {}", bucket.key(), e);
        }
        (bucket, result)
    });
    join_all(fetches).await
}
