//! Messages between the UI loop and its background tasks.
//!
//! Tasks never touch [`ClientApp`](super::state::ClientApp) directly: the
//! state queues [`Request`]s, the loop turns them into tasks, and each task
//! answers with one [`AppEvent`].

use uuid::Uuid;

use crate::api::ApiError;
use crate::favorites::FavoriteToggle;
use crate::library::{ActiveToggle, Collection};
use crate::models::{Bucket, CurrentUser, GithubProfile, HighScoreEntry, Question};
use crate::protocol::NewHighScore;
use crate::quiz::SessionEvent;
use crate::scores::Submission;
use crate::view_state::ViewState;

/// Completion of background work, applied on the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    Session(SessionEvent),
    UserLoaded {
        user: CurrentUser,
        details: Option<GithubProfile>,
    },
    CollectionLoaded {
        generation: u64,
        collection: Collection,
        result: Result<Vec<Question>, ApiError>,
    },
    FavoritesLoaded(Result<Vec<Question>, ApiError>),
    FavoriteSynced {
        toggle: FavoriteToggle,
        result: Result<(), ApiError>,
    },
    ActiveSynced {
        toggle: ActiveToggle,
        result: Result<(), ApiError>,
    },
    QuestionDeleted {
        id: String,
        result: Result<(), ApiError>,
    },
    QuestionLoaded {
        generation: u64,
        result: Result<Question, ApiError>,
    },
    ScoresLoaded {
        bucket: Bucket,
        result: Result<Vec<HighScoreEntry>, ApiError>,
    },
    /// Tagged with the quiz run that produced the score.
    ScoreSubmitted {
        token: Uuid,
        bucket: Bucket,
        result: Result<Submission, ApiError>,
    },
    ProfileLoaded {
        owner_id: String,
        profile: GithubProfile,
    },
}

impl From<SessionEvent> for AppEvent {
    fn from(event: SessionEvent) -> Self {
        AppEvent::Session(event)
    }
}

/// Work the UI state asks the loop to start.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    LoadUser,
    LoadCollection {
        generation: u64,
        collection: Collection,
    },
    LoadFavorites,
    SyncFavorite(FavoriteToggle),
    SyncActive(ActiveToggle),
    DeleteQuestion(String),
    LoadQuestion {
        generation: u64,
        id: String,
    },
    LoadScores(Bucket),
    SubmitScore {
        token: Uuid,
        body: NewHighScore,
    },
    LoadProfiles(Vec<String>),
    SaveViewState(ViewState),
}
