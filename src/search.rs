//! Question filtering and pagination for the browse view.

use crate::models::{Category, Difficulty, Question};

/// Viewport width (px) below which pages hold 8 questions.
pub const NARROW_WIDTH_PX: u32 = 768;
/// Viewport width (px) below which pages hold 9 questions.
pub const MEDIUM_WIDTH_PX: u32 = 1200;

/// Free-text query plus optional difficulty and category filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionQuery {
    pub text: String,
    pub difficulty: Option<Difficulty>,
    pub category: Option<Category>,
}

impl QuestionQuery {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.difficulty.is_none() && self.category.is_none()
    }

    /// Set the difficulty filter. Kangaroo questions have no topical
    /// category, so choosing Kangaroo clears the category filter.
    pub fn set_difficulty(&mut self, difficulty: Option<Difficulty>) {
        self.difficulty = difficulty;
        if self.category_locked() {
            self.category = None;
        }
    }

    /// Set the category filter; ignored while the difficulty is Kangaroo.
    pub fn set_category(&mut self, category: Option<Category>) {
        if !self.category_locked() {
            self.category = category;
        }
    }

    pub fn category_locked(&self) -> bool {
        self.difficulty == Some(Difficulty::Kangaroo)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether `question` passes every active filter.
    pub fn matches(&self, question: &Question) -> bool {
        if self.difficulty.is_some_and(|wanted| question.difficulty != wanted) {
            return false;
        }
        if self.category.is_some_and(|wanted| question.category != wanted) {
            return false;
        }

        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
        contains(&question.title)
            || contains(&question.question_text)
            || contains(&question.answer_explanation)
            || question.options.iter().any(|option| contains(&option.text))
    }
}

/// Questions matching `query`, in input order.
pub fn filter<'a, I>(questions: I, query: &QuestionQuery) -> Vec<&'a Question>
where
    I: IntoIterator<Item = &'a Question>,
{
    questions
        .into_iter()
        .filter(|question| query.matches(question))
        .collect()
}

/// Number of questions per page for a viewport of `width_px` pixels.
pub fn page_size_for_width(width_px: u32) -> usize {
    if width_px < NARROW_WIDTH_PX {
        8
    } else if width_px < MEDIUM_WIDTH_PX {
        9
    } else {
        12
    }
}

/// `ceil(len / page_size)`; a zero page size is treated as one.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Clamp a 1-indexed page number into `1..=total_pages` (1 when empty).
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.min(total_pages).max(1)
}

/// One page of a result list.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub number: usize,
    pub total_pages: usize,
}

/// Slice out 1-indexed page `number`. Pages outside `1..=total_pages`
/// are empty.
pub fn paginate<T>(items: &[T], number: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);

    let start = number.saturating_sub(1).saturating_mul(page_size);
    let slice = if number == 0 || start >= items.len() {
        &items[0..0]
    } else {
        let end = (start + page_size).min(items.len());
        &items[start..end]
    };

    Page {
        items: slice,
        number,
        total_pages,
    }
}

/// Distinct topical categories present among `questions`, sorted.
pub fn available_categories(questions: &[Question]) -> Vec<Category> {
    let mut categories: Vec<Category> = questions
        .iter()
        .map(|question| question.category)
        .filter(|category| *category != Category::Kangaroo)
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Distinct difficulties present among `questions`, in declaration order.
pub fn available_difficulties(questions: &[Question]) -> Vec<Difficulty> {
    Difficulty::ALL
        .into_iter()
        .filter(|difficulty| questions.iter().any(|q| q.difficulty == *difficulty))
        .collect()
}
