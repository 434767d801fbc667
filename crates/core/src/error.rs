use thiserror::Error;

use crate::model::{QuestionError, QuizSetError, SubmissionError};
use crate::session::SessionError;

/// Umbrella error for callers that do not care which layer of the core failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    QuizSet(#[from] QuizSetError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
