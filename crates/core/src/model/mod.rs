mod answer;
mod ids;
mod question;
mod quiz;
mod submission;

pub use answer::{AnswerState, Selection};
pub use ids::{ParseIdError, QuestionId, QuizId};
pub use question::{Question, QuestionDraft, QuestionError};
pub use quiz::{QuizSet, QuizSetError, TimeBudget};
pub(crate) use quiz::ensure_unique_ids;
pub use submission::{Submission, SubmissionError};
