//! The signed-in user's favorite questions.
//!
//! Toggles are applied locally first and confirmed (or reverted) once the
//! backend answers.

use std::collections::HashSet;

use crate::api::{ApiError, QuizHubApi};
use crate::models::Question;

/// Favorite question ids plus the questions themselves for the profile view.
#[derive(Debug, Default)]
pub struct Favorites {
    ids: HashSet<String>,
    questions: Vec<Question>,
    loaded: bool,
}

/// A toggle applied locally and awaiting the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteToggle {
    pub id: String,
    /// `true` for an add, `false` for a remove.
    pub added: bool,
    previous: Option<(usize, Question)>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set with a freshly fetched list.
    pub fn load(&mut self, questions: Vec<Question>) {
        self.ids = questions.iter().map(|q| q.id.clone()).collect();
        self.questions = questions;
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn ids(&self) -> &HashSet<String> {
        &self.ids
    }

    /// Flip membership of `question` locally.
    pub fn toggle(&mut self, question: &Question) -> FavoriteToggle {
        if self.ids.remove(&question.id) {
            let previous = self
                .questions
                .iter()
                .position(|q| q.id == question.id)
                .map(|index| (index, self.questions.remove(index)));
            FavoriteToggle {
                id: question.id.clone(),
                added: false,
                previous,
            }
        } else {
            self.ids.insert(question.id.clone());
            self.questions.push(question.clone());
            FavoriteToggle {
                id: question.id.clone(),
                added: true,
                previous: None,
            }
        }
    }

    /// Keep `toggle` on success; undo it on failure and hand the error back.
    pub fn settle(&mut self, toggle: FavoriteToggle, result: Result<(), ApiError>) -> Result<(), ApiError> {
        let Err(e) = result else {
            return Ok(());
        };

        log::warn!("reverting favorite toggle of {}: {}", toggle.id, e);
        if toggle.added {
            self.ids.remove(&toggle.id);
            self.questions.retain(|q| q.id != toggle.id);
        } else {
            self.ids.insert(toggle.id.clone());
            if let Some((index, question)) = toggle.previous {
                let index = index.min(self.questions.len());
                self.questions.insert(index, question);
            }
        }
        Err(e)
    }

    /// Keep cached copies in step with an edited question.
    pub fn replace(&mut self, question: &Question) {
        for cached in self.questions.iter_mut().filter(|q| q.id == question.id) {
            *cached = question.clone();
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.ids.remove(id);
        self.questions.retain(|q| q.id != id);
    }
}

/// Send the request matching a locally applied toggle.
pub async fn sync_favorite<A>(api: &A, toggle: &FavoriteToggle) -> Result<(), ApiError>
where
    A: QuizHubApi + ?Sized,
{
    if toggle.added {
        api.add_favorite(&toggle.id).await
    } else {
        api.remove_favorite(&toggle.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerOption, Category, Difficulty};

    fn question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            title: format!("Question {}", id),
            difficulty: Difficulty::Medium,
            category: Category::Music,
            question_text: "Which one?".to_string(),
            options: vec![
                AnswerOption::new("a", true),
                AnswerOption::new("b", false),
                AnswerOption::new("c", false),
                AnswerOption::new("d", false),
            ],
            answer_explanation: String::new(),
            is_active: true,
            owner_id: "7".to_string(),
            image_url: None,
        }
    }

    fn ids(favorites: &Favorites) -> Vec<String> {
        favorites.questions().iter().map(|q| q.id.clone()).collect()
    }

    #[test]
    fn test_toggle_twice_restores_set() {
        let mut favorites = Favorites::new();
        favorites.load(vec![question("1"), question("2")]);
        let before = favorites.ids().clone();

        let added = favorites.toggle(&question("3"));
        assert!(added.added);
        assert!(favorites.contains("3"));
        favorites.settle(added, Ok(())).unwrap();

        let removed = favorites.toggle(&question("3"));
        assert!(!removed.added);
        favorites.settle(removed, Ok(())).unwrap();

        assert_eq!(favorites.ids(), &before);
        assert_eq!(ids(&favorites), vec!["1", "2"]);
    }

    #[test]
    fn test_failed_add_is_reverted() {
        let mut favorites = Favorites::new();
        favorites.load(vec![question("1")]);

        let toggle = favorites.toggle(&question("2"));
        let err = favorites
            .settle(toggle, Err(ApiError::Config("offline".to_string())))
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        assert!(!favorites.contains("2"));
        assert_eq!(ids(&favorites), vec!["1"]);
    }

    #[test]
    fn test_failed_remove_is_reverted_in_place() {
        let mut favorites = Favorites::new();
        favorites.load(vec![question("1"), question("2"), question("3")]);

        let toggle = favorites.toggle(&question("2"));
        assert_eq!(ids(&favorites), vec!["1", "3"]);
        let _ = favorites.settle(toggle, Err(ApiError::Config("offline".to_string())));

        assert!(favorites.contains("2"));
        assert_eq!(ids(&favorites), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut favorites = Favorites::new();
        favorites.load(vec![question("1")]);

        let mut edited = question("1");
        edited.title = "Renamed".to_string();
        favorites.replace(&edited);
        assert_eq!(favorites.questions()[0].title, "Renamed");

        favorites.remove("1");
        assert!(favorites.is_empty());
    }
}
