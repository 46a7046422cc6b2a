use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AnswerOption, Category, Difficulty, Question};

pub const TITLE_MIN_LENGTH: usize = 3;
pub const QUESTION_TEXT_MIN_LENGTH: usize = 5;
pub const OPTION_COUNT: usize = 4;

/// The `questionModelDto` part sent when creating or editing a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub title: String,
    #[serde(rename = "difficultyEnum")]
    pub difficulty: Difficulty,
    #[serde(rename = "categoryEnum")]
    pub category: Category,
    pub question_text: String,
    pub options: Vec<AnswerOption>,
    #[serde(default)]
    pub answer_explanation: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(rename = "githubId", default)]
    pub owner_id: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Field-level problems found in a draft before it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftError {
    pub fields: Vec<(&'static str, String)>,
}

impl DraftError {
    /// Messages in the `field: message` form used by the validation popup.
    pub fn messages(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect()
    }
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid question: {}", self.messages().join("; "))
    }
}

impl std::error::Error for DraftError {}

impl QuestionDraft {
    /// Draft pre-filled from an existing question, for editing.
    pub fn from_question(question: &Question) -> Self {
        Self {
            title: question.title.clone(),
            difficulty: question.difficulty,
            category: question.category,
            question_text: question.question_text.clone(),
            options: question.options.clone(),
            answer_explanation: question.answer_explanation.clone(),
            is_active: question.is_active,
            owner_id: question.owner_id.clone(),
            image_url: question.image_url.clone(),
        }
    }

    /// Apply the backend's input rules locally.
    pub fn validate(&self) -> Result<(), DraftError> {
        let mut fields = Vec::new();

        if self.title.trim().chars().count() < TITLE_MIN_LENGTH {
            fields.push((
                "title",
                format!("Title must be at least {} characters long", TITLE_MIN_LENGTH),
            ));
        }

        if self.question_text.trim().chars().count() < QUESTION_TEXT_MIN_LENGTH {
            fields.push((
                "questionText",
                format!(
                    "Question Text must be at least {} characters long",
                    QUESTION_TEXT_MIN_LENGTH
                ),
            ));
        }

        let correct = self.options.iter().filter(|option| option.is_correct).count();
        if self.options.len() != OPTION_COUNT {
            fields.push((
                "options",
                format!("Exactly {} answer options are required", OPTION_COUNT),
            ));
        } else if correct != 1 {
            fields.push((
                "options",
                "Exactly one answer option must be marked as correct".to_string(),
            ));
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(DraftError { fields })
        }
    }
}
