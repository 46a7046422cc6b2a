//! Request and response bodies exchanged with the Quiz Hub backend.
//!
//! All bodies are JSON except question submissions, which are multipart.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Bucket, Category, Selection};

/// Body of `POST /api/high-score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHighScore {
    pub player_name: String,
    #[serde(rename = "githubId")]
    pub owner_id: String,
    #[serde(rename = "difficultyEnum")]
    pub bucket: Bucket,
    #[serde(rename = "categoryEnum")]
    pub category: Option<Selection<Category>>,
    pub wrong_answer_count: u32,
    pub score_time: f64,
    #[serde(with = "crate::models::timestamp")]
    pub date: DateTime<Utc>,
}

/// Error body the backend sends alongside non-validation failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Turn a 400 response body (`{"field": "message", ...}`) into display lines.
///
/// Returns `None` if the body is not a field map.
pub fn validation_messages(body: &str) -> Option<Vec<String>> {
    let fields: BTreeMap<String, String> = serde_json::from_str(body).ok()?;
    if fields.is_empty() {
        return None;
    }
    Some(
        fields
            .into_iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect(),
    )
}

/// Binary `image` part attached to a question submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = guess_mime(&file_name);
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Read an image from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn guess_mime(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_validation_messages() {
        let body = r#"{
            "title": "Title must be at least 3 characters long",
            "options": "Exactly one answer option must be marked as correct"
        }"#;
        let messages = validation_messages(body).unwrap();
        assert_eq!(
            messages,
            vec![
                "options: Exactly one answer option must be marked as correct",
                "title: Title must be at least 3 characters long",
            ]
        );

        assert!(validation_messages("{}").is_none());
        assert!(validation_messages("Bad Request").is_none());
        assert!(validation_messages(r#"{"status": 400}"#).is_none());
    }

    #[test]
    fn test_high_score_serialization() {
        let score = NewHighScore {
            player_name: "Ada".to_string(),
            owner_id: "anonymousUser".to_string(),
            bucket: Bucket::Easy,
            category: Some(Selection::Only(Category::Art)),
            wrong_answer_count: 2,
            score_time: 31.4,
            date: Utc.with_ymd_and_hms(2025, 4, 2, 18, 30, 0).unwrap(),
        };
        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(json["playerName"], "Ada");
        assert_eq!(json["difficultyEnum"], "EASY");
        assert_eq!(json["categoryEnum"], "ART");
        assert_eq!(json["wrongAnswerCount"], 2);
        assert_eq!(json["date"], "2025-04-02T18:30:00+00:00");
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(ImageUpload::new("cat.JPG", vec![]).mime, "image/jpeg");
        assert_eq!(ImageUpload::new("cat.png", vec![]).mime, "image/png");
        assert_eq!(ImageUpload::new("cat", vec![]).mime, "application/octet-stream");
    }
}
