//! REST access to the Quiz Hub backend.
//!
//! [`QuizHubApi`] is the seam the managers and the terminal client talk to;
//! [`HubClient`] implements it over HTTP.

mod client;
mod error;
mod github;

use async_trait::async_trait;

pub use client::HubClient;
pub use error::ApiError;
pub use github::{GithubClient, ProfileCache};

use crate::models::{Bucket, CurrentUser, GithubProfile, HighScoreEntry, Question, QuestionDraft};
use crate::protocol::{ImageUpload, NewHighScore};

/// Operations the client needs from the backend.
#[async_trait]
pub trait QuizHubApi: Send + Sync {
    /// `GET /api/users/me`
    async fn current_user(&self) -> Result<CurrentUser, ApiError>;

    /// `GET /api/users/me/details`; `None` when not logged in.
    async fn user_details(&self) -> Result<Option<GithubProfile>, ApiError>;

    /// `GET /api/quiz-hub`
    async fn all_questions(&self) -> Result<Vec<Question>, ApiError>;

    /// `GET /api/quiz-hub/active` (active, without kangaroo questions)
    async fn active_questions(&self) -> Result<Vec<Question>, ApiError>;

    /// `GET /api/quiz-hub/active-all`
    async fn all_active_questions(&self) -> Result<Vec<Question>, ApiError>;

    /// `GET /api/quiz-hub/active/kangaroo`
    async fn active_kangaroo_questions(&self) -> Result<Vec<Question>, ApiError>;

    /// `GET /api/quiz-hub/{id}`
    async fn question(&self, id: &str) -> Result<Question, ApiError>;

    /// `GET /api/users/me/my-questions/{owner_id}`
    async fn my_questions(&self, owner_id: &str) -> Result<Vec<Question>, ApiError>;

    /// `GET /api/users/favorites`
    async fn favorites(&self) -> Result<Vec<Question>, ApiError>;

    /// `POST /api/users/favorites/{id}`
    async fn add_favorite(&self, id: &str) -> Result<(), ApiError>;

    /// `DELETE /api/users/favorites/{id}`
    async fn remove_favorite(&self, id: &str) -> Result<(), ApiError>;

    /// `POST /api/quiz-hub` (multipart)
    async fn create_question(
        &self,
        draft: &QuestionDraft,
        image: Option<ImageUpload>,
    ) -> Result<Question, ApiError>;

    /// `PUT /api/quiz-hub/{id}` (multipart)
    async fn update_question(
        &self,
        id: &str,
        draft: &QuestionDraft,
        image: Option<ImageUpload>,
    ) -> Result<Question, ApiError>;

    /// `DELETE /api/quiz-hub/{id}`
    async fn delete_question(&self, id: &str) -> Result<(), ApiError>;

    /// `PUT /api/users/{id}/toggle-active`
    async fn toggle_active(&self, id: &str) -> Result<(), ApiError>;

    /// `GET /api/high-score/{bucket}`, best first.
    async fn high_scores(&self, bucket: Bucket) -> Result<Vec<HighScoreEntry>, ApiError>;

    /// `POST /api/high-score`; `None` when the backend did not keep the entry.
    async fn submit_high_score(
        &self,
        score: &NewHighScore,
    ) -> Result<Option<HighScoreEntry>, ApiError>;
}
