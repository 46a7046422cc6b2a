use serde::{Deserialize, Serialize};

/// Difficulty tag of a question.
///
/// `Kangaroo` marks the special kangaroo-contest questions, which are played
/// in their own pool and have their own leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Kangaroo,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Kangaroo,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Kangaroo => "Kangaroo",
        }
    }
}

/// Category tag of a question.
///
/// The eleven topical tags are selectable; `Kangaroo` only appears on
/// kangaroo-contest questions delivered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Art,
    GeneralKnowledge,
    Geography,
    History,
    Literature,
    Mathematics,
    MoviesAndTv,
    Music,
    Politics,
    Science,
    Sports,
    Kangaroo,
}

impl Category {
    /// The selectable topical categories.
    pub const ALL: [Category; 11] = [
        Category::Art,
        Category::GeneralKnowledge,
        Category::Geography,
        Category::History,
        Category::Literature,
        Category::Mathematics,
        Category::MoviesAndTv,
        Category::Music,
        Category::Politics,
        Category::Science,
        Category::Sports,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Art => "Art",
            Category::GeneralKnowledge => "General Knowledge",
            Category::Geography => "Geography",
            Category::History => "History",
            Category::Literature => "Literature",
            Category::Mathematics => "Mathematics",
            Category::MoviesAndTv => "Movies and TV",
            Category::Music => "Music",
            Category::Politics => "Politics",
            Category::Science => "Science",
            Category::Sports => "Sports",
            Category::Kangaroo => "Kangaroo",
        }
    }
}

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub text: String,
    pub is_correct: bool,
}

impl AnswerOption {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

/// A question as served by `/api/quiz-hub`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub title: String,
    #[serde(rename = "difficultyEnum")]
    pub difficulty: Difficulty,
    #[serde(rename = "categoryEnum")]
    pub category: Category,
    pub question_text: String,
    pub options: Vec<AnswerOption>,
    #[serde(default)]
    pub answer_explanation: String,
    pub is_active: bool,
    #[serde(rename = "githubId")]
    pub owner_id: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Question {
    /// Whether this question belongs to the kangaroo pool.
    pub fn is_kangaroo(&self) -> bool {
        self.difficulty == Difficulty::Kangaroo || self.category == Category::Kangaroo
    }

    /// Whether the option at `index` is the correct one.
    pub fn is_correct(&self, index: usize) -> bool {
        self.options.get(index).is_some_and(|option| option.is_correct)
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}
