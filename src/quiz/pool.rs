use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Category, Difficulty, Question, Selection};

/// Number of questions in a full quiz run.
pub const QUIZ_LENGTH: usize = 10;

/// Build a shuffled quiz pool of at most [`QUIZ_LENGTH`] active questions.
///
/// Kangaroo draws only from kangaroo questions and ignores `category`;
/// every other choice draws from the non-kangaroo questions passing both
/// selections.
pub fn select_pool<R: Rng + ?Sized>(
    source: &[Question],
    difficulty: Selection<Difficulty>,
    category: Selection<Category>,
    rng: &mut R,
) -> Vec<Question> {
    let mut pool: Vec<Question> = source
        .iter()
        .filter(|question| question.is_active)
        .filter(|question| {
            if difficulty.is_kangaroo() {
                question.is_kangaroo()
            } else {
                !question.is_kangaroo()
                    && difficulty.admits(question.difficulty)
                    && category.admits(question.category)
            }
        })
        .cloned()
        .collect();

    pool.shuffle(rng);
    pool.truncate(QUIZ_LENGTH);
    pool
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::models::AnswerOption;

    fn question(id: usize, difficulty: Difficulty, category: Category, active: bool) -> Question {
        Question {
            id: id.to_string(),
            title: format!("Question {}", id),
            difficulty,
            category,
            question_text: format!("Text {}", id),
            options: vec![
                AnswerOption::new("a", true),
                AnswerOption::new("b", false),
                AnswerOption::new("c", false),
                AnswerOption::new("d", false),
            ],
            answer_explanation: String::new(),
            is_active: active,
            owner_id: "owner".to_string(),
            image_url: None,
        }
    }

    fn catalogue() -> Vec<Question> {
        let mut questions = Vec::new();
        for i in 0..30 {
            let difficulty = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard][i % 3];
            let category = [Category::Art, Category::Science][i % 2];
            questions.push(question(i, difficulty, category, i % 5 != 0));
        }
        for i in 30..45 {
            questions.push(question(i, Difficulty::Kangaroo, Category::Kangaroo, i != 30));
        }
        questions
    }

    #[test]
    fn test_pool_is_capped_and_active() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = select_pool(&catalogue(), Selection::Random, Selection::Random, &mut rng);

        assert_eq!(pool.len(), QUIZ_LENGTH);
        assert!(pool.iter().all(|q| q.is_active));
        assert!(pool.iter().all(|q| !q.is_kangaroo()));
    }

    #[test]
    fn test_pool_respects_selection() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = select_pool(
            &catalogue(),
            Selection::Only(Difficulty::Easy),
            Selection::Only(Category::Art),
            &mut rng,
        );

        // ids 6, 12, 18 and 24; id 0 is inactive
        assert_eq!(pool.len(), 4);
        for question in &pool {
            assert_eq!(question.difficulty, Difficulty::Easy);
            assert_eq!(question.category, Category::Art);
            assert!(question.is_active);
        }
    }

    #[test]
    fn test_kangaroo_ignores_category() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = select_pool(
            &catalogue(),
            Selection::Only(Difficulty::Kangaroo),
            Selection::Only(Category::Art),
            &mut rng,
        );

        assert_eq!(pool.len(), QUIZ_LENGTH);
        assert!(pool.iter().all(|q| q.is_kangaroo() && q.is_active));
        assert!(pool.iter().all(|q| q.id != "30"));
    }

    #[test]
    fn test_pool_has_no_duplicates() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut pool = select_pool(&catalogue(), Selection::Random, Selection::Random, &mut rng);
        pool.sort_by(|a, b| a.id.cmp(&b.id));
        pool.dedup_by(|a, b| a.id == b.id);
        assert_eq!(pool.len(), QUIZ_LENGTH);
    }
}
