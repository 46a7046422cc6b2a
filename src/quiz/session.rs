//! Quiz session state machine.
//!
//! `Idle -> Previewing -> InProgress -> Finished`, with soft and hard resets.
//! The session owns its timers: a 0.1 s ticker while in progress and a
//! one-shot delay that finishes the run after the last answer. Both are
//! cancelled on every transition out of `InProgress`.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::models::{Bucket, Category, Difficulty, Question, RunScore, Selection};

use super::pool::{select_pool, QUIZ_LENGTH};
use super::timer::TimerHandle;

/// Interval of the elapsed-time ticker.
pub const TICK: Duration = Duration::from_millis(100);
/// How long the solution of the last question stays up before the run finishes.
pub const FINISH_DELAY: Duration = Duration::from_secs(1);

/// Scheduled events, tagged with the token of the run that scheduled them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Tick(Uuid),
    FinishDue(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Previewing,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The chosen difficulty/category matched no active question.
    EmptyPool,
    /// `start` was called outside of `Previewing`.
    NotReady(Phase),
    /// Selections cannot change while a run is in progress.
    AlreadyRunning,
    /// No difficulty/category has been chosen yet.
    NothingSelected,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyPool => write!(f, "No questions available for this selection"),
            SessionError::NotReady(phase) => write!(f, "Cannot start a quiz while {:?}", phase),
            SessionError::AlreadyRunning => write!(f, "A quiz is already running"),
            SessionError::NothingSelected => write!(f, "Choose a difficulty and a category first"),
        }
    }
}

impl std::error::Error for SessionError {}

/// The option picked for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRecord {
    pub option: usize,
    pub correct: bool,
}

/// What `answer` reports back to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// The run will finish once the display delay elapses.
    pub last_question: bool,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub token: Uuid,
    pub difficulty: Selection<Difficulty>,
    pub category: Selection<Category>,
    pub wrong_answers: u32,
    pub score_time: f64,
    pub questions_played: usize,
}

impl QuizResult {
    pub fn bucket(&self) -> Bucket {
        Bucket::for_selection(self.difficulty)
    }

    pub fn score(&self) -> RunScore {
        RunScore::new(self.wrong_answers, self.score_time)
    }

    /// Only complete runs are ranked.
    pub fn is_full_run(&self) -> bool {
        self.questions_played == QUIZ_LENGTH
    }

    /// Category stored with a leaderboard entry; kangaroo runs have none.
    pub fn entry_category(&self) -> Option<Selection<Category>> {
        if self.difficulty.is_kangaroo() {
            None
        } else {
            Some(self.category)
        }
    }
}

/// One quiz run from selection to finish or reset.
///
/// Scheduled events are delivered through `events`; feed them back with
/// [`QuizSession::handle_event`].
pub struct QuizSession<E = SessionEvent> {
    token: Uuid,
    phase: Phase,
    difficulty: Option<Selection<Difficulty>>,
    category: Option<Selection<Category>>,
    pool: Vec<Question>,
    current_index: usize,
    answers: Vec<Option<AnswerRecord>>,
    wrong_answers: u32,
    elapsed_ticks: u32,
    ticker: Option<TimerHandle>,
    finish_delay: Option<TimerHandle>,
    events: UnboundedSender<E>,
}

impl<E> QuizSession<E>
where
    E: From<SessionEvent> + Send + 'static,
{
    pub fn new(events: UnboundedSender<E>) -> Self {
        Self {
            token: Uuid::new_v4(),
            phase: Phase::Idle,
            difficulty: None,
            category: None,
            pool: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            wrong_answers: 0,
            elapsed_ticks: 0,
            ticker: None,
            finish_delay: None,
            events,
        }
    }

    /// Choose the difficulty and category and draw a pool from `source`.
    ///
    /// On success the session is `Previewing` and the pool size is returned.
    pub fn select_questions<R: Rng + ?Sized>(
        &mut self,
        source: &[Question],
        difficulty: Selection<Difficulty>,
        category: Selection<Category>,
        rng: &mut R,
    ) -> Result<usize, SessionError> {
        if self.phase == Phase::InProgress {
            return Err(SessionError::AlreadyRunning);
        }

        self.difficulty = Some(difficulty);
        self.category = Some(category);
        self.draw(source, rng)
    }

    /// Draw a fresh pool for the current selections.
    pub fn reshuffle<R: Rng + ?Sized>(
        &mut self,
        source: &[Question],
        rng: &mut R,
    ) -> Result<usize, SessionError> {
        if self.phase == Phase::InProgress {
            return Err(SessionError::AlreadyRunning);
        }
        if self.difficulty.is_none() || self.category.is_none() {
            return Err(SessionError::NothingSelected);
        }
        self.draw(source, rng)
    }

    fn draw<R: Rng + ?Sized>(&mut self, source: &[Question], rng: &mut R) -> Result<usize, SessionError> {
        let (Some(difficulty), Some(category)) = (self.difficulty, self.category) else {
            return Err(SessionError::NothingSelected);
        };

        self.stop_timers();
        self.token = Uuid::new_v4();
        self.clear_progress();
        self.pool = select_pool(source, difficulty, category, rng);

        if self.pool.is_empty() {
            self.phase = Phase::Idle;
            log::info!(
                "no questions for {} / {}",
                difficulty.display_name(),
                category.display_name()
            );
            return Err(SessionError::EmptyPool);
        }

        self.phase = Phase::Previewing;
        log::debug!("drew a pool of {} questions", self.pool.len());
        Ok(self.pool.len())
    }

    /// Begin the run: counters reset and the ticker starts.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Previewing => {}
            Phase::InProgress => return Err(SessionError::AlreadyRunning),
            other => return Err(SessionError::NotReady(other)),
        }

        self.stop_timers();
        self.token = Uuid::new_v4();
        self.clear_progress();
        self.answers = vec![None; self.pool.len()];
        self.phase = Phase::InProgress;

        let token = self.token;
        self.ticker = Some(TimerHandle::every(TICK, self.events.clone(), move || {
            E::from(SessionEvent::Tick(token))
        }));

        log::info!("quiz {} started with {} questions", token, self.pool.len());
        Ok(())
    }

    /// Record the answer to the current question.
    ///
    /// Returns `None` (and changes nothing) unless the run is in progress,
    /// `question_index` is the current question, it has not been answered
    /// yet and `option_index` exists.
    pub fn answer(&mut self, question_index: usize, option_index: usize) -> Option<AnswerOutcome> {
        if self.phase != Phase::InProgress || question_index != self.current_index {
            return None;
        }
        let question = self.pool.get(question_index)?;
        if option_index >= question.options.len() {
            return None;
        }
        let slot = self.answers.get_mut(question_index)?;
        if slot.is_some() {
            return None;
        }

        let correct = question.is_correct(option_index);
        *slot = Some(AnswerRecord {
            option: option_index,
            correct,
        });
        if !correct {
            self.wrong_answers += 1;
        }

        let last_question = question_index + 1 >= self.pool.len();
        if last_question {
            let event = E::from(SessionEvent::FinishDue(self.token));
            self.finish_delay = Some(TimerHandle::after(FINISH_DELAY, self.events.clone(), event));
        }

        Some(AnswerOutcome {
            correct,
            last_question,
        })
    }

    /// Move to the next question once the current one is answered; past
    /// the last question the run finishes immediately.
    pub fn next(&mut self) -> bool {
        if self.phase != Phase::InProgress || self.current_answer().is_none() {
            return false;
        }

        if self.current_index + 1 >= self.pool.len() {
            self.finish();
        } else {
            self.current_index += 1;
        }
        true
    }

    /// Apply a scheduled event. Events from earlier runs are ignored.
    ///
    /// Returns whether the session changed.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Tick(token) if token == self.token && self.phase == Phase::InProgress => {
                self.elapsed_ticks += 1;
                true
            }
            SessionEvent::FinishDue(token)
                if token == self.token && self.phase == Phase::InProgress =>
            {
                self.finish();
                true
            }
            _ => false,
        }
    }

    /// Soft reset keeps the selections and pool and returns to
    /// `Previewing`; hard reset forgets everything and returns to `Idle`.
    pub fn reset(&mut self, hard: bool) {
        self.stop_timers();
        self.token = Uuid::new_v4();
        self.clear_progress();

        if hard || self.pool.is_empty() {
            self.difficulty = None;
            self.category = None;
            self.pool.clear();
            self.phase = Phase::Idle;
        } else {
            self.phase = Phase::Previewing;
        }
        log::debug!("quiz reset (hard: {})", hard);
    }

    /// Leaving the quiz view mid-run counts as a hard reset.
    pub fn abandon(&mut self) {
        if self.phase == Phase::InProgress {
            log::info!("quiz {} abandoned", self.token);
        }
        self.reset(true);
    }

    fn finish(&mut self) {
        self.stop_timers();
        self.phase = Phase::Finished;
        log::info!(
            "quiz {} finished: {} wrong in {:.1}s",
            self.token,
            self.wrong_answers,
            self.elapsed_secs()
        );
    }

    fn stop_timers(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        if let Some(delay) = self.finish_delay.take() {
            delay.cancel();
        }
    }

    fn clear_progress(&mut self) {
        self.current_index = 0;
        self.answers.clear();
        self.wrong_answers = 0;
        self.elapsed_ticks = 0;
    }
}

impl<E> QuizSession<E> {
    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn difficulty(&self) -> Option<Selection<Difficulty>> {
        self.difficulty
    }

    pub fn category(&self) -> Option<Selection<Category>> {
        self.category
    }

    pub fn pool(&self) -> &[Question] {
        &self.pool
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::InProgress => self.pool.get(self.current_index),
            _ => None,
        }
    }

    pub fn current_answer(&self) -> Option<AnswerRecord> {
        self.answers.get(self.current_index).copied().flatten()
    }

    pub fn answers(&self) -> &[Option<AnswerRecord>] {
        &self.answers
    }

    pub fn wrong_answers(&self) -> u32 {
        self.wrong_answers
    }

    pub fn elapsed_secs(&self) -> f64 {
        f64::from(self.elapsed_ticks) / 10.0
    }

    /// Whether a ticker or finish delay is currently scheduled.
    pub fn has_pending_timers(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
            || self.finish_delay.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// The run summary, once finished.
    pub fn result(&self) -> Option<QuizResult> {
        if self.phase != Phase::Finished {
            return None;
        }
        Some(QuizResult {
            token: self.token,
            difficulty: self.difficulty?,
            category: self.category?,
            wrong_answers: self.wrong_answers,
            score_time: self.elapsed_secs(),
            questions_played: self.answers.iter().filter(|a| a.is_some()).count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::sync::mpsc::{self, UnboundedReceiver};
    use tokio::time;

    use super::*;
    use crate::models::AnswerOption;

    fn question(id: usize, difficulty: Difficulty, category: Category) -> Question {
        Question {
            id: id.to_string(),
            title: format!("Question {}", id),
            difficulty,
            category,
            question_text: format!("Text {}", id),
            options: vec![
                AnswerOption::new("right", true),
                AnswerOption::new("wrong", false),
                AnswerOption::new("wrong", false),
                AnswerOption::new("wrong", false),
            ],
            answer_explanation: "Because.".to_string(),
            is_active: true,
            owner_id: "owner".to_string(),
            image_url: None,
        }
    }

    fn catalogue(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| question(i, Difficulty::Easy, Category::Science))
            .collect()
    }

    fn session() -> (QuizSession, UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (QuizSession::new(tx), rx)
    }

    fn prepared(count: usize) -> (QuizSession, UnboundedReceiver<SessionEvent>) {
        let (mut session, rx) = session();
        let mut rng = StdRng::seed_from_u64(1);
        session
            .select_questions(
                &catalogue(count),
                Selection::Only(Difficulty::Easy),
                Selection::Random,
                &mut rng,
            )
            .unwrap();
        (session, rx)
    }

    fn drain(session: &mut QuizSession, rx: &mut UnboundedReceiver<SessionEvent>) {
        while let Ok(event) = rx.try_recv() {
            session.handle_event(event);
        }
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() {
        let (mut session, _rx) = session();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.start(), Err(SessionError::NotReady(Phase::Idle)));

        let mut rng = StdRng::seed_from_u64(1);
        let drawn = session
            .select_questions(&catalogue(25), Selection::Random, Selection::Random, &mut rng)
            .unwrap();
        assert_eq!(drawn, QUIZ_LENGTH);
        assert_eq!(session.phase(), Phase::Previewing);

        session.start().unwrap();
        assert_eq!(session.phase(), Phase::InProgress);
        assert!(session.has_pending_timers());
        assert_eq!(session.start(), Err(SessionError::AlreadyRunning));
    }

    #[tokio::test]
    async fn test_empty_pool_is_rejected() {
        let (mut session, _rx) = session();
        let mut rng = StdRng::seed_from_u64(1);
        let result = session.select_questions(
            &catalogue(5),
            Selection::Only(Difficulty::Hard),
            Selection::Random,
            &mut rng,
        );
        assert_eq!(result, Err(SessionError::EmptyPool));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_wrong_answers_are_counted() {
        let (mut session, _rx) = prepared(10);
        session.start().unwrap();

        for index in 0..QUIZ_LENGTH {
            let option = if index % 3 == 0 { 1 } else { 0 };
            let outcome = session.answer(index, option).unwrap();
            assert_eq!(outcome.correct, option == 0);
            assert_eq!(outcome.last_question, index == QUIZ_LENGTH - 1);
            session.next();
        }

        // indices 0, 3, 6, 9 were wrong
        assert_eq!(session.wrong_answers(), 4);
        assert_eq!(session.phase(), Phase::Finished);
        let result = session.result().unwrap();
        assert!(result.is_full_run());
        assert_eq!(result.wrong_answers, 4);
        assert_eq!(result.bucket(), Bucket::Easy);
    }

    #[tokio::test]
    async fn test_answer_is_accepted_once() {
        let (mut session, _rx) = prepared(10);
        session.start().unwrap();

        assert!(session.answer(0, 1).is_some());
        assert!(session.answer(0, 0).is_none());
        assert_eq!(session.wrong_answers(), 1);
        assert_eq!(session.current_answer().unwrap().option, 1);

        // not the current question
        assert!(session.answer(3, 0).is_none());
        // option out of range
        session.next();
        assert!(session.answer(1, 4).is_none());
    }

    #[tokio::test]
    async fn test_next_requires_an_answer() {
        let (mut session, _rx) = prepared(10);
        session.start().unwrap();
        assert!(!session.next());
        assert_eq!(session.current_index(), 0);

        session.answer(0, 0);
        assert!(session.next());
        assert_eq!(session.current_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_measures_time_and_stops_on_finish() {
        let (mut session, mut rx) = prepared(3);
        session.start().unwrap();

        time::sleep(Duration::from_millis(1050)).await;
        drain(&mut session, &mut rx);
        assert_eq!(session.elapsed_secs(), 1.0);

        session.answer(0, 0);
        session.next();
        session.answer(1, 0);
        session.next();
        let outcome = session.answer(2, 1).unwrap();
        assert!(outcome.last_question);
        assert_eq!(session.phase(), Phase::InProgress);

        // solution stays up for the display delay, then the run finishes
        time::sleep(FINISH_DELAY + Duration::from_millis(20)).await;
        drain(&mut session, &mut rx);
        assert_eq!(session.phase(), Phase::Finished);
        assert!(!session.has_pending_timers());

        let finished_at = session.elapsed_secs();
        assert!(finished_at >= 2.0);
        time::sleep(Duration::from_secs(2)).await;
        drain(&mut session, &mut rx);
        assert_eq!(session.elapsed_secs(), finished_at);

        let result = session.result().unwrap();
        assert!(!result.is_full_run());
        assert_eq!(result.wrong_answers, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_events_are_ignored_after_reset() {
        let (mut session, mut rx) = prepared(10);
        session.start().unwrap();
        let old_token = session.token();

        time::sleep(Duration::from_millis(250)).await;
        session.reset(false);
        assert_eq!(session.phase(), Phase::Previewing);
        assert!(!session.has_pending_timers());

        // ticks queued before the reset belong to the old run
        drain(&mut session, &mut rx);
        assert_eq!(session.elapsed_secs(), 0.0);
        assert!(!session.handle_event(SessionEvent::FinishDue(old_token)));

        session.start().unwrap();
        assert!(!session.handle_event(SessionEvent::Tick(old_token)));
    }

    #[tokio::test]
    async fn test_soft_and_hard_reset() {
        let (mut session, _rx) = prepared(10);
        session.start().unwrap();
        session.answer(0, 1);

        session.reset(false);
        assert_eq!(session.phase(), Phase::Previewing);
        assert_eq!(session.wrong_answers(), 0);
        assert_eq!(session.difficulty(), Some(Selection::Only(Difficulty::Easy)));
        assert_eq!(session.pool().len(), QUIZ_LENGTH);

        session.reset(true);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.difficulty().is_none());
        assert!(session.category().is_none());
        assert!(session.pool().is_empty());
    }

    #[tokio::test]
    async fn test_abandon_cancels_timers() {
        let (mut session, _rx) = prepared(10);
        session.start().unwrap();
        session.abandon();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.has_pending_timers());
    }

    #[tokio::test]
    async fn test_reshuffle_needs_selection() {
        let (mut session, _rx) = session();
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(
            session.reshuffle(&catalogue(10), &mut rng),
            Err(SessionError::NothingSelected)
        );
    }
}
