use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSetError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz must contain at least one question")]
    NoQuestions,

    #[error("question {id} appears more than once")]
    DuplicateQuestion { id: QuestionId },
}

/// Answers are keyed by question id, so a set must never repeat one.
pub(crate) fn ensure_unique_ids(questions: &[Question]) -> Result<(), QuizSetError> {
    let mut seen = HashSet::with_capacity(questions.len());
    for question in questions {
        if !seen.insert(question.id()) {
            return Err(QuizSetError::DuplicateQuestion { id: question.id() });
        }
    }
    Ok(())
}

//
// ─── TIME BUDGET ───────────────────────────────────────────────────────────────
//

/// Time allowed for one attempt, in whole seconds. Zero means untimed.
///
/// The budget only feeds the countdown display; nothing ends a session
/// when it runs out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBudget {
    total_secs: u32,
}

impl TimeBudget {
    #[must_use]
    pub fn from_secs(total_secs: u32) -> Self {
        Self { total_secs }
    }

    #[must_use]
    pub fn untimed() -> Self {
        Self { total_secs: 0 }
    }

    /// Sum of per-question allotments; questions without one contribute nothing.
    #[must_use]
    pub fn from_allotments(questions: &[Question]) -> Self {
        let total_secs = questions
            .iter()
            .filter_map(Question::time_allotment_secs)
            .fold(0_u32, u32::saturating_add);
        Self { total_secs }
    }

    #[must_use]
    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    #[must_use]
    pub fn is_untimed(&self) -> bool {
        self.total_secs == 0
    }

    /// Time spent since `started_at`, never negative.
    #[must_use]
    pub fn elapsed(&self, started_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        (now - started_at).max(Duration::zero())
    }

    /// Time left before the budget runs out, saturating at zero.
    ///
    /// Returns `None` for an untimed budget.
    #[must_use]
    pub fn remaining(&self, started_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
        if self.is_untimed() {
            return None;
        }
        let total = Duration::seconds(i64::from(self.total_secs));
        Some((total - self.elapsed(started_at, now)).max(Duration::zero()))
    }
}

//
// ─── QUIZ SET ──────────────────────────────────────────────────────────────────
//

/// Ordered, immutable question set supplied by the content collaborator.
///
/// Questions sit behind an `Arc` so sessions share them with the provider
/// instead of copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSet {
    id: QuizId,
    title: String,
    questions: Arc<[Question]>,
    time_budget: TimeBudget,
}

impl QuizSet {
    /// Build a quiz set from validated questions.
    ///
    /// # Errors
    ///
    /// Returns `QuizSetError::EmptyTitle` for a blank title,
    /// `QuizSetError::NoQuestions` for an empty list and
    /// `QuizSetError::DuplicateQuestion` when an id repeats.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        questions: Vec<Question>,
        time_budget: TimeBudget,
    ) -> Result<Self, QuizSetError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(QuizSetError::EmptyTitle);
        }
        if questions.is_empty() {
            return Err(QuizSetError::NoQuestions);
        }

        ensure_unique_ids(&questions)?;

        Ok(Self {
            id,
            title,
            questions: questions.into(),
            time_budget,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Shared handle to the question list.
    #[must_use]
    pub fn shared_questions(&self) -> Arc<[Question]> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn time_budget(&self) -> TimeBudget {
        self.time_budget
    }
}
