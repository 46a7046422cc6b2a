use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::models::{DraftError, Question, QuestionDraft};

/// Why a draft file could not be used.
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(DraftError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            LoadError::Parse { path, source } => {
                write!(f, "Failed to parse {}: {}", path.display(), source)
            }
            LoadError::Invalid(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
            LoadError::Invalid(e) => Some(e),
        }
    }
}

/// Read a question draft from a JSON file and validate it.
pub fn load_draft<P: AsRef<Path>>(path: P) -> Result<QuestionDraft, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let draft: QuestionDraft =
        serde_json::from_str(&json_content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    draft.validate().map_err(LoadError::Invalid)?;
    Ok(draft)
}

/// Read an edit for `current` from a JSON file. Fields the file leaves out
/// keep their stored values, so a partial file never clears the image or
/// re-activates a question.
pub fn load_edit<P: AsRef<Path>>(path: P, current: &Question) -> Result<QuestionDraft, LoadError> {
    let path = path.as_ref();
    let parse_error = |source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let changes: Map<String, Value> = serde_json::from_str(&json_content).map_err(parse_error)?;

    let mut merged = match serde_json::to_value(QuestionDraft::from_question(current)) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => Map::new(),
        Err(source) => return Err(parse_error(source)),
    };
    merged.extend(changes);

    let draft: QuestionDraft = serde_json::from_value(Value::Object(merged)).map_err(parse_error)?;
    draft.validate().map_err(LoadError::Invalid)?;
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerOption, Category, Difficulty};

    const DRAFT: &str = r#"{
        "title": "Capital",
        "difficultyEnum": "EASY",
        "categoryEnum": "GEOGRAPHY",
        "questionText": "What is the capital of France?",
        "options": [
            {"text": "Paris", "isCorrect": true},
            {"text": "Lyon", "isCorrect": false},
            {"text": "Nice", "isCorrect": false},
            {"text": "Lille", "isCorrect": false}
        ]
    }"#;

    #[test]
    fn test_load_valid_draft() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        fs::write(&path, DRAFT).unwrap();

        let draft = load_draft(&path).unwrap();
        assert_eq!(draft.title, "Capital");
        assert!(draft.is_active);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = load_draft(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(LoadError::Io { .. })));

        let path = dir.path().join("broken.json");
        fs::write(&path, "[]").unwrap();
        assert!(matches!(load_draft(&path), Err(LoadError::Parse { .. })));

        let path = dir.path().join("invalid.json");
        fs::write(&path, DRAFT.replace("\"Capital\"", "\"Ca\"")).unwrap();
        match load_draft(&path) {
            Err(LoadError::Invalid(e)) => assert_eq!(e.fields[0].0, "title"),
            other => panic!("expected invalid draft, got {:?}", other),
        }
    }

    fn stored() -> Question {
        Question {
            id: "9".to_string(),
            title: "Cats".to_string(),
            difficulty: Difficulty::Medium,
            category: Category::Science,
            question_text: "How many lives does a cat have?".to_string(),
            options: vec![
                AnswerOption::new("one", true),
                AnswerOption::new("seven", false),
                AnswerOption::new("nine", false),
                AnswerOption::new("none", false),
            ],
            answer_explanation: "Just one.".to_string(),
            is_active: false,
            owner_id: "42".to_string(),
            image_url: Some("https://img/cat.png".to_string()),
        }
    }

    #[test]
    fn test_edit_keeps_fields_the_file_leaves_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edit.json");
        fs::write(&path, r#"{"title": "Cats and lives"}"#).unwrap();

        let draft = load_edit(&path, &stored()).unwrap();
        assert_eq!(draft.title, "Cats and lives");
        assert_eq!(draft.image_url.as_deref(), Some("https://img/cat.png"));
        assert!(!draft.is_active);
        assert_eq!(draft.options, stored().options);
        assert_eq!(draft.category, Category::Science);
    }

    #[test]
    fn test_edit_overrides_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edit.json");
        fs::write(&path, DRAFT).unwrap();

        let draft = load_edit(&path, &stored()).unwrap();
        assert_eq!(draft.title, "Capital");
        assert_eq!(draft.category, Category::Geography);
        assert_eq!(draft.image_url.as_deref(), Some("https://img/cat.png"));
        assert!(!draft.is_active);

        fs::write(&path, r#"{"title": "No"}"#).unwrap();
        assert!(matches!(load_edit(&path, &stored()), Err(LoadError::Invalid(_))));
    }
}
