use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::model::{
    AnswerState, Question, QuestionId, QuizId, QuizSet, QuizSetError, Selection, Submission,
    TimeBudget, ensure_unique_ids,
};
use crate::time::Clock;

use super::config::SessionConfig;
use super::error::{SelectionFault, SessionAction, SessionError};
use super::progress::SessionProgress;

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle of one attempt. `Submitted` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    InProgress,
    Submitted,
    Cancelled,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionStatus::InProgress => "in progress",
            SessionStatus::Submitted => "submitted",
            SessionStatus::Cancelled => "cancelled",
        })
    }
}

/// Backend outcome of the emitted submission.
///
/// Tracked beside `SessionStatus`; a failure here never moves the session
/// out of `Submitted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Pending,
    Acknowledged,
    Failed { reason: String },
}

/// Result of `QuizSession::next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Moved { cursor: usize },
    Submitted(Submission),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Linear walk through an ordered question set, one question at a time.
///
/// The cursor stays in `0..question_count()` while in progress. Every
/// mutating call checks the status first and leaves the session untouched
/// when it returns an error.
pub struct QuizSession {
    quiz_id: QuizId,
    questions: Arc<[Question]>,
    cursor: usize,
    answers: Option<AnswerState>,
    status: SessionStatus,
    config: SessionConfig,
    time_budget: TimeBudget,
    clock: Clock,
    started_at: DateTime<Utc>,
    submission: Option<Submission>,
    submission_state: Option<SubmissionState>,
}

impl QuizSession {
    /// Start an attempt over a validated quiz set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidInput` if the set holds no questions.
    pub fn start(quiz: &QuizSet, config: SessionConfig, clock: Clock) -> Result<Self, SessionError> {
        Self::start_with(
            quiz.id(),
            quiz.shared_questions(),
            quiz.time_budget(),
            config,
            clock,
        )
    }

    /// Start an attempt over a shared question list.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidInput` if `questions` is empty or repeats
    /// a question id.
    pub fn start_with(
        quiz_id: QuizId,
        questions: Arc<[Question]>,
        time_budget: TimeBudget,
        config: SessionConfig,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::InvalidInput(QuizSetError::NoQuestions));
        }
        ensure_unique_ids(&questions)?;

        let answers = AnswerState::for_questions(&questions);
        Ok(Self {
            quiz_id,
            questions,
            cursor: 0,
            answers: Some(answers),
            status: SessionStatus::InProgress,
            config,
            time_budget,
            started_at: clock.now(),
            clock,
            submission: None,
            submission_state: None,
        })
    }

    fn ensure_in_progress(&self, action: SessionAction) -> Result<(), SessionError> {
        if self.status == SessionStatus::InProgress {
            Ok(())
        } else {
            Err(self.transition_error(action))
        }
    }

    fn transition_error(&self, action: SessionAction) -> SessionError {
        SessionError::InvalidTransition {
            action,
            status: self.status,
        }
    }

    fn check_current(&self, question_id: QuestionId) -> Result<&Question, SessionError> {
        let current = &self.questions[self.cursor];
        if current.id() != question_id {
            return Err(SelectionFault::NotCurrent {
                question_id,
                current: current.id(),
            }
            .into());
        }
        Ok(current)
    }

    // ─── Commands ──────────────────────────────────────────────────────────────

    /// Record (or overwrite) the pick for the question under the cursor.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` once the session is terminal,
    /// and `SessionError::InvalidSelection` when `question_id` is not the
    /// current question or `option_index` is out of range.
    pub fn select_option(
        &mut self,
        question_id: QuestionId,
        option_index: usize,
    ) -> Result<(), SessionError> {
        self.ensure_in_progress(SessionAction::Select)?;
        let option_count = self.check_current(question_id)?.option_count();
        if option_index >= option_count {
            return Err(SelectionFault::OutOfRange {
                index: option_index,
                option_count,
            }
            .into());
        }

        if let Some(answers) = self.answers.as_mut() {
            answers.set(question_id, Selection::Chosen(option_index));
        }
        Ok(())
    }

    /// Reset the current question back to unanswered.
    ///
    /// # Errors
    ///
    /// Same guards as `select_option`, minus the range check.
    pub fn clear_selection(&mut self, question_id: QuestionId) -> Result<(), SessionError> {
        self.ensure_in_progress(SessionAction::Select)?;
        self.check_current(question_id)?;
        if let Some(answers) = self.answers.as_mut() {
            answers.set(question_id, Selection::Unanswered);
        }
        Ok(())
    }

    /// Move to the next question, or submit when already on the last one
    /// and the merged affordance is enabled.
    ///
    /// Unanswered questions may be skipped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` when the session is terminal,
    /// or when on the last question with the merged affordance disabled.
    pub fn next(&mut self) -> Result<Step, SessionError> {
        self.ensure_in_progress(SessionAction::Next)?;
        if self.is_last() {
            if !self.config.merge_next_and_submit() {
                return Err(self.transition_error(SessionAction::Next));
            }
            return self.submit().map(Step::Submitted);
        }

        self.cursor += 1;
        Ok(Step::Moved {
            cursor: self.cursor,
        })
    }

    /// Move to the previous question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` at the first question or
    /// once the session is terminal.
    pub fn back(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress(SessionAction::Back)?;
        if self.cursor == 0 {
            return Err(self.transition_error(SessionAction::Back));
        }
        self.cursor -= 1;
        Ok(self.cursor)
    }

    /// Move straight to `index`, as a question palette would.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` for an out-of-range index or
    /// a terminal session.
    pub fn jump_to(&mut self, index: usize) -> Result<usize, SessionError> {
        self.ensure_in_progress(SessionAction::Jump)?;
        if index >= self.questions.len() {
            return Err(self.transition_error(SessionAction::Jump));
        }
        self.cursor = index;
        Ok(self.cursor)
    }

    /// Finish the attempt and emit the frozen answer map.
    ///
    /// The returned `Submission` is the only emission a session produces
    /// (apart from an explicit `retry_submission`).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is in progress,
    /// and `SessionError::InvalidSubmission` if the clock reads earlier than
    /// the start of the attempt.
    pub fn submit(&mut self) -> Result<Submission, SessionError> {
        self.ensure_in_progress(SessionAction::Submit)?;

        let answers = self.answers.clone().unwrap_or_default();
        let submission =
            Submission::new(self.quiz_id, answers, self.started_at, self.clock.now())?;

        self.status = SessionStatus::Submitted;
        self.submission_state = Some(SubmissionState::Pending);
        self.submission = Some(submission.clone());
        Ok(submission)
    }

    /// Abandon the attempt. Answers are discarded and nothing is emitted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is in progress.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress(SessionAction::Cancel)?;
        self.status = SessionStatus::Cancelled;
        self.answers = None;
        Ok(())
    }

    // ─── Collaborator hooks ────────────────────────────────────────────────────

    /// The submission sink accepted the emitted answers.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless a submission is pending.
    pub fn on_submit_ack(&mut self) -> Result<(), SessionError> {
        match self.submission_state {
            Some(SubmissionState::Pending) => {
                self.submission_state = Some(SubmissionState::Acknowledged);
                Ok(())
            }
            _ => Err(self.transition_error(SessionAction::SubmitAck)),
        }
    }

    /// The submission sink rejected the emitted answers. Status stays `Submitted`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless a submission is pending.
    pub fn on_submit_failed(&mut self, reason: impl Into<String>) -> Result<(), SessionError> {
        match self.submission_state {
            Some(SubmissionState::Pending) => {
                self.submission_state = Some(SubmissionState::Failed {
                    reason: reason.into(),
                });
                Ok(())
            }
            _ => Err(self.transition_error(SessionAction::SubmitFailed)),
        }
    }

    /// Re-emit the frozen submission after a reported failure.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` when resubmission is disabled
    /// or the last submission has not failed.
    pub fn retry_submission(&mut self) -> Result<Submission, SessionError> {
        let failed = matches!(self.submission_state, Some(SubmissionState::Failed { .. }));
        if !self.config.allow_resubmit_on_failure() || !failed {
            return Err(self.transition_error(SessionAction::RetrySubmission));
        }
        let submission = self
            .submission
            .clone()
            .ok_or_else(|| self.transition_error(SessionAction::RetrySubmission))?;
        self.submission_state = Some(SubmissionState::Pending);
        Ok(submission)
    }

    // ─── Queries ───────────────────────────────────────────────────────────────

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.cursor]
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.cursor == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.questions.len()
    }

    /// Current answers; `None` after cancellation.
    #[must_use]
    pub fn answers(&self) -> Option<&AnswerState> {
        self.answers.as_ref()
    }

    #[must_use]
    pub fn selection_for(&self, question_id: QuestionId) -> Option<Selection> {
        self.answers.as_ref().and_then(|a| a.get(question_id))
    }

    /// Selection for the question under the cursor.
    #[must_use]
    pub fn current_selection(&self) -> Selection {
        self.selection_for(self.current_question().id())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    #[must_use]
    pub fn submission_state(&self) -> Option<&SubmissionState> {
        self.submission_state.as_ref()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn time_budget(&self) -> TimeBudget {
        self.time_budget
    }

    /// Elapsed time as of `now`; frozen at submission time once submitted.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let until = self.submission.as_ref().map_or(now, Submission::submitted_at);
        self.time_budget.elapsed(self.started_at, until)
    }

    /// Remaining display time as of `now`, `None` when untimed.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let until = self.submission.as_ref().map_or(now, Submission::submitted_at);
        self.time_budget.remaining(self.started_at, until)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            answered: self.answers.as_ref().map_or(0, AnswerState::answered_count),
            cursor: self.cursor,
            status: self.status,
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz_id)
            .field("questions_len", &self.questions.len())
            .field("cursor", &self.cursor)
            .field("status", &self.status)
            .field("submission_state", &self.submission_state)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
