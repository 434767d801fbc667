use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::answer::{AnswerState, Selection};
use crate::model::ids::{QuestionId, QuizId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("submitted_at is before started_at")]
    InvalidTimeRange,
}

/// The finished answer map emitted once per attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    quiz_id: QuizId,
    answers: AnswerState,
    started_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Build a submission, checking the time range.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::InvalidTimeRange` if `submitted_at` precedes `started_at`.
    pub fn new(
        quiz_id: QuizId,
        answers: AnswerState,
        started_at: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, SubmissionError> {
        if submitted_at < started_at {
            return Err(SubmissionError::InvalidTimeRange);
        }
        Ok(Self {
            quiz_id,
            answers,
            started_at,
            submitted_at,
        })
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerState {
        &self.answers
    }

    #[must_use]
    pub fn selection_for(&self, question_id: QuestionId) -> Option<Selection> {
        self.answers.get(question_id)
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}
