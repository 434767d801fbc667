use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use quiz_core::model::{QuizId, Submission};
use storage::repository::{AttemptRepository, AttemptRow};

use crate::error::QuizServiceError;

/// Storage identifier for a delivered attempt (`SQLite` row id).
pub type AttemptId = i64;

/// Presentation-agnostic list item for a past attempt.
///
/// The UI formats timestamps and durations as it sees fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptListItem {
    pub id: AttemptId,
    pub submitted_at: DateTime<Utc>,
    pub duration: Duration,

    pub answered: u32,
    pub total: u32,
}

impl AttemptListItem {
    #[must_use]
    pub fn from_submission(id: AttemptId, submission: &Submission) -> Self {
        let answers = submission.answers();
        Self {
            id,
            submitted_at: submission.submitted_at(),
            duration: submission.submitted_at() - submission.started_at(),
            answered: u32::try_from(answers.answered_count()).unwrap_or(u32::MAX),
            total: u32::try_from(answers.len()).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub fn from_row(row: &AttemptRow) -> Self {
        Self::from_submission(row.id, &row.submission)
    }

    #[must_use]
    pub fn unanswered(&self) -> u32 {
        self.total.saturating_sub(self.answered)
    }
}

/// Read-only view over delivered attempts.
#[derive(Clone)]
pub struct AttemptHistoryService {
    attempts: Arc<dyn AttemptRepository>,
}

impl AttemptHistoryService {
    #[must_use]
    pub fn new(attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { attempts }
    }

    /// Most recent attempts for a quiz, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` on repository failures.
    pub async fn list_recent(
        &self,
        quiz_id: QuizId,
        limit: u32,
    ) -> Result<Vec<AttemptListItem>, QuizServiceError> {
        let rows = self.attempts.list_attempts(quiz_id, limit).await?;
        Ok(rows.iter().map(AttemptListItem::from_row).collect())
    }

    /// Fetch the full answer map of one attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` when the attempt is missing or storage fails.
    pub async fn get_attempt(&self, id: AttemptId) -> Result<Submission, QuizServiceError> {
        Ok(self.attempts.get_attempt(id).await?)
    }
}
