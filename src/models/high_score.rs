use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, Difficulty, Selection};

/// Leaderboard partition a quiz run is ranked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bucket {
    Easy,
    Medium,
    Hard,
    Kangaroo,
    Random,
}

impl Bucket {
    /// Buckets in the order the leaderboard screen lists them.
    pub const ALL: [Bucket; 5] = [
        Bucket::Kangaroo,
        Bucket::Random,
        Bucket::Easy,
        Bucket::Medium,
        Bucket::Hard,
    ];

    /// Bucket a run with the given difficulty choice is ranked in.
    pub fn for_selection(difficulty: Selection<Difficulty>) -> Self {
        match difficulty {
            Selection::Random => Bucket::Random,
            Selection::Only(Difficulty::Easy) => Bucket::Easy,
            Selection::Only(Difficulty::Medium) => Bucket::Medium,
            Selection::Only(Difficulty::Hard) => Bucket::Hard,
            Selection::Only(Difficulty::Kangaroo) => Bucket::Kangaroo,
        }
    }

    /// Path segment used by `/api/high-score/{bucket}`.
    pub fn key(self) -> &'static str {
        match self {
            Bucket::Easy => "EASY",
            Bucket::Medium => "MEDIUM",
            Bucket::Hard => "HARD",
            Bucket::Kangaroo => "KANGAROO",
            Bucket::Random => "RANDOM",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Bucket::Easy => "Easy",
            Bucket::Medium => "Medium",
            Bucket::Hard => "Hard",
            Bucket::Kangaroo => "Kangaroo",
            Bucket::Random => "Random",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Bucket::ALL
            .into_iter()
            .find(|bucket| bucket.key().eq_ignore_ascii_case(key.trim()))
    }
}

/// Ranking key of a finished run: fewer wrong answers first, then less time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunScore {
    pub wrong_answers: u32,
    pub score_time: f64,
}

impl RunScore {
    pub fn new(wrong_answers: u32, score_time: f64) -> Self {
        Self {
            wrong_answers,
            score_time,
        }
    }

    /// Total order used for leaderboard ranking.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.wrong_answers
            .cmp(&other.wrong_answers)
            .then_with(|| self.score_time.total_cmp(&other.score_time))
    }
}

/// A leaderboard row as served by `/api/high-score/{bucket}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreEntry {
    pub id: String,
    pub player_name: String,
    #[serde(rename = "githubId")]
    pub owner_id: String,
    #[serde(rename = "difficultyEnum")]
    pub bucket: Bucket,
    #[serde(rename = "categoryEnum", default)]
    pub category: Option<Selection<Category>>,
    pub wrong_answer_count: u32,
    pub score_time: f64,
    #[serde(with = "super::timestamp")]
    pub date: DateTime<Utc>,
}

impl HighScoreEntry {
    pub fn score(&self) -> RunScore {
        RunScore::new(self.wrong_answer_count, self.score_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_for_selection() {
        assert_eq!(Bucket::for_selection(Selection::Random), Bucket::Random);
        assert_eq!(
            Bucket::for_selection(Selection::Only(Difficulty::Kangaroo)),
            Bucket::Kangaroo
        );
        assert_eq!(
            Bucket::for_selection(Selection::Only(Difficulty::Medium)),
            Bucket::Medium
        );
        assert_eq!(Bucket::parse("hard"), Some(Bucket::Hard));
        assert_eq!(Bucket::parse("legendary"), None);
    }

    #[test]
    fn test_rank_order() {
        let fewer_mistakes = RunScore::new(2, 25.0);
        let faster = RunScore::new(3, 20.0);
        assert_eq!(fewer_mistakes.rank_cmp(&faster), Ordering::Less);
        assert_eq!(
            RunScore::new(3, 19.9).rank_cmp(&RunScore::new(3, 20.0)),
            Ordering::Less
        );
        assert_eq!(faster.rank_cmp(&faster), Ordering::Equal);
    }

    #[test]
    fn test_entry_wire_format() {
        let json = r#"{
            "id": "h1",
            "playerName": "Ada",
            "githubId": "anonymousUser",
            "difficultyEnum": "RANDOM",
            "categoryEnum": "RANDOM",
            "wrongAnswerCount": 1,
            "scoreTime": 42.3,
            "date": "2025-04-02T18:30:00"
        }"#;

        let entry: HighScoreEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.bucket, Bucket::Random);
        assert_eq!(entry.category, Some(Selection::Random));
        assert_eq!(entry.score(), RunScore::new(1, 42.3));
    }
}
