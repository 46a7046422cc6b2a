//! Playing a quiz: pool selection, the run state machine and its timers.

mod pool;
mod session;
mod timer;

pub use pool::{select_pool, QUIZ_LENGTH};
pub use session::{
    AnswerOutcome, AnswerRecord, Phase, QuizResult, QuizSession, SessionError, SessionEvent,
    FINISH_DELAY, TICK,
};
pub use timer::TimerHandle;
