mod draft;
mod high_score;
mod question;
mod selection;
pub(crate) mod timestamp;
mod user;

pub use draft::{DraftError, QuestionDraft, OPTION_COUNT};
pub use high_score::{Bucket, HighScoreEntry, RunScore};
pub use question::{AnswerOption, Category, Difficulty, Question};
pub use selection::Selection;
pub use user::{CurrentUser, GithubProfile, ANONYMOUS_USER};
