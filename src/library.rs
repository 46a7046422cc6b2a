//! Client-side caches of backend question collections and the owner-only
//! operations on them.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::api::{ApiError, QuizHubApi};
use crate::models::{CurrentUser, DraftError, Question, QuestionDraft};
use crate::protocol::ImageUpload;

/// The question collections the backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Every question, active or not.
    All,
    /// Active, non-kangaroo.
    Active,
    /// Active including kangaroo.
    ActiveAll,
    /// Active kangaroo only.
    Kangaroo,
    /// Questions owned by the current user.
    Mine,
}

impl Collection {
    fn admits(self, question: &Question, user: &CurrentUser) -> bool {
        match self {
            Collection::All => true,
            Collection::Active => question.is_active && !question.is_kangaroo(),
            Collection::ActiveAll => question.is_active,
            Collection::Kangaroo => question.is_active && question.is_kangaroo(),
            Collection::Mine => !user.is_anonymous() && question.is_owned_by(user.id()),
        }
    }
}

/// Why an owner-only operation was refused or failed.
#[derive(Debug)]
pub enum ManageError {
    /// Anonymous users own nothing.
    Anonymous,
    NotFound(String),
    NotOwner(String),
    /// A status change for this question is still waiting on the backend.
    TogglePending(String),
    Draft(DraftError),
    Api(ApiError),
}

impl ManageError {
    /// Lines to show in an alert popup.
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            ManageError::Draft(e) => e.messages(),
            ManageError::Api(e) => e.user_messages(),
            other => vec![other.to_string()],
        }
    }
}

impl fmt::Display for ManageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManageError::Anonymous => write!(f, "You need to log in to manage questions"),
            ManageError::NotFound(id) => write!(f, "Question {} not found", id),
            ManageError::NotOwner(id) => write!(f, "Question {} belongs to another user", id),
            ManageError::TogglePending(id) => {
                write!(f, "Question {} is still being updated, try again in a moment", id)
            }
            ManageError::Draft(e) => write!(f, "{}", e),
            ManageError::Api(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ManageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManageError::Draft(e) => Some(e),
            ManageError::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DraftError> for ManageError {
    fn from(err: DraftError) -> Self {
        ManageError::Draft(err)
    }
}

impl From<ApiError> for ManageError {
    fn from(err: ApiError) -> Self {
        ManageError::Api(err)
    }
}

/// Active flag flipped locally and awaiting the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveToggle {
    pub id: String,
    pub previous: bool,
    /// The question as it was before the flip.
    pub before: Question,
}

/// Read-through caches of the last fetched collections.
#[derive(Debug, Default)]
pub struct QuestionLibrary {
    collections: HashMap<Collection, Vec<Question>>,
    pending_toggles: HashSet<String>,
}

impl QuestionLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, collection: Collection, questions: Vec<Question>) {
        self.collections.insert(collection, questions);
    }

    pub fn get(&self, collection: Collection) -> &[Question] {
        self.collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_loaded(&self, collection: Collection) -> bool {
        self.collections.contains_key(&collection)
    }

    /// The cached copy of `id`, from whichever collection holds it.
    pub fn find(&self, id: &str) -> Option<&Question> {
        self.collections.values().flatten().find(|q| q.id == id)
    }

    /// Look up `id` and make sure `user` owns it.
    pub fn owned(&self, id: &str, user: &CurrentUser) -> Result<&Question, ManageError> {
        if user.is_anonymous() {
            return Err(ManageError::Anonymous);
        }
        let question = self
            .find(id)
            .ok_or_else(|| ManageError::NotFound(id.to_string()))?;
        if !question.is_owned_by(user.id()) {
            return Err(ManageError::NotOwner(id.to_string()));
        }
        Ok(question)
    }

    /// Put `question` into every loaded collection that should hold it,
    /// replacing by id where present and dropping it where it no longer fits.
    pub fn upsert(&mut self, question: &Question, user: &CurrentUser) {
        for (collection, questions) in self.collections.iter_mut() {
            let position = questions.iter().position(|q| q.id == question.id);
            match (position, collection.admits(question, user)) {
                (Some(index), true) => questions[index] = question.clone(),
                (Some(index), false) => {
                    questions.remove(index);
                }
                (None, true) => questions.push(question.clone()),
                (None, false) => {}
            }
        }
    }

    pub fn remove(&mut self, id: &str) {
        for questions in self.collections.values_mut() {
            questions.retain(|q| q.id != id);
        }
    }

    /// Flip the active flag of an owned question and refile it, so
    /// collections that only hold active questions gain or lose it.
    /// One toggle per question may be in flight.
    pub fn begin_toggle_active(&mut self, id: &str, user: &CurrentUser) -> Result<ActiveToggle, ManageError> {
        let before = self.owned(id, user)?.clone();
        if self.pending_toggles.contains(id) {
            return Err(ManageError::TogglePending(id.to_string()));
        }

        let mut flipped = before.clone();
        flipped.is_active = !before.is_active;
        self.upsert(&flipped, user);
        self.pending_toggles.insert(id.to_string());
        Ok(ActiveToggle {
            id: id.to_string(),
            previous: before.is_active,
            before,
        })
    }

    /// Keep `toggle` on success; restore the old flag on failure.
    pub fn settle_toggle_active(
        &mut self,
        toggle: ActiveToggle,
        user: &CurrentUser,
        result: Result<(), ApiError>,
    ) -> Result<(), ManageError> {
        self.pending_toggles.remove(&toggle.id);
        if let Err(e) = result {
            log::warn!("reverting active toggle of {}: {}", toggle.id, e);
            let mut restored = self.find(&toggle.id).cloned().unwrap_or(toggle.before);
            restored.is_active = toggle.previous;
            self.upsert(&restored, user);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn is_toggle_pending(&self, id: &str) -> bool {
        self.pending_toggles.contains(id)
    }
}

/// Fetch one collection from the backend.
pub async fn fetch_collection<A>(
    api: &A,
    collection: Collection,
    user: &CurrentUser,
) -> Result<Vec<Question>, ApiError>
where
    A: QuizHubApi + ?Sized,
{
    match collection {
        Collection::All => api.all_questions().await,
        Collection::Active => api.active_questions().await,
        Collection::ActiveAll => api.all_active_questions().await,
        Collection::Kangaroo => api.active_kangaroo_questions().await,
        Collection::Mine if user.is_anonymous() => Ok(Vec::new()),
        Collection::Mine => api.my_questions(user.id()).await,
    }
}

/// Fetch question `id` and make sure `user` owns it, for callers without a
/// warm cache.
pub async fn fetch_owned<A>(api: &A, user: &CurrentUser, id: &str) -> Result<Question, ManageError>
where
    A: QuizHubApi + ?Sized,
{
    if user.is_anonymous() {
        return Err(ManageError::Anonymous);
    }
    let question = match api.question(id).await {
        Ok(question) => question,
        Err(ApiError::Status { status: 404, .. }) => {
            return Err(ManageError::NotFound(id.to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    if !question.is_owned_by(user.id()) {
        return Err(ManageError::NotOwner(id.to_string()));
    }
    Ok(question)
}

/// Delete an owned question after checking ownership with the backend.
pub async fn delete_owned<A>(api: &A, user: &CurrentUser, id: &str) -> Result<(), ManageError>
where
    A: QuizHubApi + ?Sized,
{
    fetch_owned(api, user, id).await?;
    api.delete_question(id).await?;
    log::info!("deleted question {}", id);
    Ok(())
}

/// Validate and create a question owned by `user`.
pub async fn create_question<A>(
    api: &A,
    user: &CurrentUser,
    mut draft: QuestionDraft,
    image: Option<ImageUpload>,
) -> Result<Question, ManageError>
where
    A: QuizHubApi + ?Sized,
{
    draft.validate()?;
    draft.owner_id = user.id().to_string();
    let question = api.create_question(&draft, image).await?;
    log::info!("created question {}", question.id);
    Ok(question)
}

/// Validate and save changes to question `id`.
pub async fn update_question<A>(
    api: &A,
    user: &CurrentUser,
    id: &str,
    mut draft: QuestionDraft,
    image: Option<ImageUpload>,
) -> Result<Question, ManageError>
where
    A: QuizHubApi + ?Sized,
{
    draft.validate()?;
    draft.owner_id = user.id().to_string();
    let question = api.update_question(id, &draft, image).await?;
    log::info!("updated question {}", question.id);
    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerOption, Category, Difficulty};

    fn question(id: &str, owner: &str, difficulty: Difficulty, active: bool) -> Question {
        Question {
            id: id.to_string(),
            title: format!("Question {}", id),
            difficulty,
            category: if difficulty == Difficulty::Kangaroo {
                Category::Kangaroo
            } else {
                Category::Sports
            },
            question_text: "Who won?".to_string(),
            options: vec![
                AnswerOption::new("a", true),
                AnswerOption::new("b", false),
                AnswerOption::new("c", false),
                AnswerOption::new("d", false),
            ],
            answer_explanation: String::new(),
            is_active: active,
            owner_id: owner.to_string(),
            image_url: None,
        }
    }

    fn library() -> QuestionLibrary {
        let mut library = QuestionLibrary::new();
        let all = vec![
            question("1", "me", Difficulty::Easy, true),
            question("2", "other", Difficulty::Hard, true),
            question("3", "me", Difficulty::Kangaroo, false),
        ];
        library.set(Collection::Active, vec![all[0].clone(), all[1].clone()]);
        library.set(Collection::Mine, vec![all[0].clone(), all[2].clone()]);
        library.set(Collection::All, all);
        library
    }

    #[test]
    fn test_ownership_checks() {
        let library = library();
        let me = CurrentUser::new("me");

        assert!(library.owned("1", &me).is_ok());
        assert!(matches!(
            library.owned("2", &me),
            Err(ManageError::NotOwner(_))
        ));
        assert!(matches!(
            library.owned("9", &me),
            Err(ManageError::NotFound(_))
        ));
        assert!(matches!(
            library.owned("1", &CurrentUser::anonymous()),
            Err(ManageError::Anonymous)
        ));
    }

    #[test]
    fn test_toggle_active_rolls_back_on_failure() {
        let mut library = library();
        let me = CurrentUser::new("me");

        let toggle = library.begin_toggle_active("1", &me).unwrap();
        assert!(toggle.previous);
        assert!(!library.get(Collection::All)[0].is_active);
        assert!(!library.get(Collection::Mine)[0].is_active);
        assert!(library.get(Collection::Active).iter().all(|q| q.id != "1"));

        let result = library.settle_toggle_active(toggle, &me, Err(ApiError::Config("down".to_string())));
        assert!(matches!(result, Err(ManageError::Api(_))));
        assert!(library.get(Collection::All)[0].is_active);
        assert!(library.get(Collection::Mine)[0].is_active);
        assert!(library.get(Collection::Active).iter().any(|q| q.id == "1"));

        let toggle = library.begin_toggle_active("3", &me).unwrap();
        library.settle_toggle_active(toggle, &me, Ok(())).unwrap();
        assert!(library.find("3").unwrap().is_active);
        // kangaroo questions never join the plain active collection
        assert!(library.get(Collection::Active).iter().all(|q| q.id != "3"));
    }

    #[test]
    fn test_second_toggle_waits_for_the_first() {
        let mut library = library();
        let me = CurrentUser::new("me");

        let toggle = library.begin_toggle_active("1", &me).unwrap();
        assert!(library.is_toggle_pending("1"));
        assert!(matches!(
            library.begin_toggle_active("1", &me),
            Err(ManageError::TogglePending(_))
        ));
        assert!(!library.find("1").unwrap().is_active);

        library
            .settle_toggle_active(toggle, &me, Err(ApiError::Config("down".to_string())))
            .unwrap_err();
        assert!(!library.is_toggle_pending("1"));
        assert!(library.find("1").unwrap().is_active);

        let toggle = library.begin_toggle_active("1", &me).unwrap();
        library.settle_toggle_active(toggle, &me, Ok(())).unwrap();
        assert!(!library.find("1").unwrap().is_active);
    }

    #[test]
    fn test_cannot_toggle_foreign_question() {
        let mut library = library();
        let me = CurrentUser::new("me");
        assert!(matches!(
            library.begin_toggle_active("2", &me),
            Err(ManageError::NotOwner(_))
        ));
        assert!(library.find("2").unwrap().is_active);
    }

    #[test]
    fn test_upsert_replaces_and_refiles_by_id() {
        let mut library = library();
        let me = CurrentUser::new("me");

        let mut edited = question("1", "me", Difficulty::Easy, false);
        edited.title = "Edited".to_string();
        library.upsert(&edited, &me);

        assert_eq!(library.get(Collection::All)[0].title, "Edited");
        assert_eq!(library.get(Collection::Mine)[0].title, "Edited");
        // inactive questions leave the active collection
        assert!(library.get(Collection::Active).iter().all(|q| q.id != "1"));

        let created = question("4", "me", Difficulty::Medium, true);
        library.upsert(&created, &me);
        assert_eq!(library.get(Collection::All).len(), 4);
        assert_eq!(library.get(Collection::Mine).len(), 3);
        assert!(library.get(Collection::Active).iter().any(|q| q.id == "4"));
        // collections that were never fetched stay unloaded
        assert!(!library.is_loaded(Collection::Kangaroo));
    }

    #[test]
    fn test_remove_from_every_collection() {
        let mut library = library();
        library.remove("1");
        assert!(library.find("1").is_none());
        assert_eq!(library.get(Collection::All).len(), 2);
        assert_eq!(library.get(Collection::Mine).len(), 1);
    }
}
