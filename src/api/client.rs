//! HTTP implementation of [`QuizHubApi`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::models::{Bucket, CurrentUser, GithubProfile, HighScoreEntry, Question, QuestionDraft};
use crate::protocol::{validation_messages, ErrorBody, ImageUpload, NewHighScore};

use super::{ApiError, QuizHubApi};

/// Client for the Quiz Hub REST API.
#[derive(Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base_url: String,
}

impl HubClient {
    /// Build a client from the runtime configuration.
    ///
    /// A configured session cookie is sent with every request so calls run
    /// as the logged-in user.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie.trim())
                .map_err(|e| ApiError::Config(format!("session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(concat!("quiz-hub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = classify_failure(status, &body);
        log::warn!("backend call failed: {}", err);
        Err(err)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        log::debug!("GET {}", path);
        let response = self.send(self.http.get(self.url(path))).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Map a non-success response onto the error taxonomy.
fn classify_failure(status: StatusCode, body: &str) -> ApiError {
    if status == StatusCode::BAD_REQUEST {
        if let Some(messages) = validation_messages(body) {
            return ApiError::Validation(messages);
        }
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message);

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

fn question_form(draft: &QuestionDraft, image: Option<ImageUpload>) -> Result<Form, ApiError> {
    let json = serde_json::to_string(draft)?;
    let mut form = Form::new().part(
        "questionModelDto",
        Part::text(json).mime_str("application/json")?,
    );

    if let Some(image) = image {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.mime)?;
        form = form.part("image", part);
    }

    Ok(form)
}

/// `/api/users/me/details` answers `{"message": ...}` for anonymous users.
fn parse_user_details(body: &str) -> Result<Option<GithubProfile>, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.get("login").is_none() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

/// `POST /api/high-score` answers with an empty body when the run did not make the cut.
fn parse_submitted_score(body: &str) -> Result<Option<HighScoreEntry>, ApiError> {
    let body = body.trim();
    if body.is_empty() || body == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(body)?))
}

#[async_trait]
impl QuizHubApi for HubClient {
    async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        let response = self.send(self.http.get(self.url("/api/users/me"))).await?;
        let id = response.text().await?;
        Ok(CurrentUser::new(id))
    }

    async fn user_details(&self) -> Result<Option<GithubProfile>, ApiError> {
        let response = self
            .send(self.http.get(self.url("/api/users/me/details")))
            .await?;
        parse_user_details(&response.text().await?)
    }

    async fn all_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.get_json("/api/quiz-hub").await
    }

    async fn active_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.get_json("/api/quiz-hub/active").await
    }

    async fn all_active_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.get_json("/api/quiz-hub/active-all").await
    }

    async fn active_kangaroo_questions(&self) -> Result<Vec<Question>, ApiError> {
        self.get_json("/api/quiz-hub/active/kangaroo").await
    }

    async fn question(&self, id: &str) -> Result<Question, ApiError> {
        self.get_json(&format!("/api/quiz-hub/{}", id)).await
    }

    async fn my_questions(&self, owner_id: &str) -> Result<Vec<Question>, ApiError> {
        self.get_json(&format!("/api/users/me/my-questions/{}", owner_id))
            .await
    }

    async fn favorites(&self) -> Result<Vec<Question>, ApiError> {
        self.get_json("/api/users/favorites").await
    }

    async fn add_favorite(&self, id: &str) -> Result<(), ApiError> {
        log::debug!("POST favorite {}", id);
        let url = self.url(&format!("/api/users/favorites/{}", id));
        self.send(self.http.post(url)).await?;
        Ok(())
    }

    async fn remove_favorite(&self, id: &str) -> Result<(), ApiError> {
        log::debug!("DELETE favorite {}", id);
        let url = self.url(&format!("/api/users/favorites/{}", id));
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn create_question(
        &self,
        draft: &QuestionDraft,
        image: Option<ImageUpload>,
    ) -> Result<Question, ApiError> {
        let form = question_form(draft, image)?;
        let request = self.http.post(self.url("/api/quiz-hub")).multipart(form);
        let response = self.send(request).await?;
        Ok(serde_json::from_str(&response.text().await?)?)
    }

    async fn update_question(
        &self,
        id: &str,
        draft: &QuestionDraft,
        image: Option<ImageUpload>,
    ) -> Result<Question, ApiError> {
        let form = question_form(draft, image)?;
        let url = self.url(&format!("/api/quiz-hub/{}", id));
        let response = self.send(self.http.put(url).multipart(form)).await?;
        Ok(serde_json::from_str(&response.text().await?)?)
    }

    async fn delete_question(&self, id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/quiz-hub/{}", id));
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn toggle_active(&self, id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/users/{}/toggle-active", id));
        self.send(self.http.put(url)).await?;
        Ok(())
    }

    async fn high_scores(&self, bucket: Bucket) -> Result<Vec<HighScoreEntry>, ApiError> {
        self.get_json(&format!("/api/high-score/{}", bucket.key()))
            .await
    }

    async fn submit_high_score(
        &self,
        score: &NewHighScore,
    ) -> Result<Option<HighScoreEntry>, ApiError> {
        let request = self.http.post(self.url("/api/high-score")).json(score);
        let response = self.send(request).await?;
        parse_submitted_score(&response.text().await?)
    }
}
