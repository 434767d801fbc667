use chrono::{DateTime, Utc};

use quiz_core::model::{Question, QuizId, Selection};
use quiz_core::session::{QuizSession, SessionStatus, SubmissionState};
use services::{AttemptId, QuizLoopService, QuizStepOutcome};

use super::time_fmt::format_clock;
use crate::views::ViewError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Select(usize),
    Next,
    Back,
    Jump(usize),
    Submit,
    Cancel,
    RetrySubmission,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizPhase {
    Answering,
    Submitted,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizOutcome {
    Continue,
    Submitted { attempt_id: AttemptId },
    Cancelled,
}

/// One entry of the question palette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteItemVm {
    pub index: usize,
    pub label: String,
    pub answered: bool,
    pub current: bool,
}

pub struct QuizVm {
    session: QuizSession,
    attempt_id: Option<AttemptId>,
}

impl QuizVm {
    #[must_use]
    pub fn new(session: QuizSession) -> Self {
        Self {
            session,
            attempt_id: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match self.session.status() {
            SessionStatus::InProgress => QuizPhase::Answering,
            SessionStatus::Submitted => QuizPhase::Submitted,
            SessionStatus::Cancelled => QuizPhase::Cancelled,
        }
    }

    #[must_use]
    pub fn attempt_id(&self) -> Option<AttemptId> {
        self.attempt_id
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        self.session.current_question()
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.session.current_selection()
    }

    #[must_use]
    pub fn progress_label(&self) -> String {
        let progress = self.session.progress();
        format!("Question {} of {}", progress.position(), progress.total)
    }

    #[must_use]
    pub fn answered_label(&self) -> String {
        let progress = self.session.progress();
        format!("{} / {} answered", progress.answered, progress.total)
    }

    /// Warning shown on the last question while some answers are still open.
    #[must_use]
    pub fn unanswered_notice(&self) -> Option<String> {
        if self.phase() != QuizPhase::Answering || !self.session.is_last() {
            return None;
        }
        let answers = self.session.answers()?;
        if answers.is_complete() {
            return None;
        }
        let open = answers.len() - answers.answered_count();
        Some(if open == 1 {
            "1 question is still unanswered".to_string()
        } else {
            format!("{open} questions are still unanswered")
        })
    }

    /// "Next" turns into "Submit" on the last question when the two are merged.
    #[must_use]
    pub fn next_label(&self) -> &'static str {
        if self.session.is_last() && self.session.config().merge_next_and_submit() {
            "Submit"
        } else {
            "Next"
        }
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.phase() == QuizPhase::Answering && !self.session.is_first()
    }

    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.phase() == QuizPhase::Answering
            && (!self.session.is_last() || self.session.config().merge_next_and_submit())
    }

    /// A separate Submit button is only offered when "Next" never submits.
    #[must_use]
    pub fn shows_submit_button(&self) -> bool {
        self.phase() == QuizPhase::Answering && !self.session.config().merge_next_and_submit()
    }

    /// `mm:ss` left in the display budget, `None` for untimed quizzes.
    #[must_use]
    pub fn remaining_label(&self, now: DateTime<Utc>) -> Option<String> {
        self.session.remaining(now).map(format_clock)
    }

    #[must_use]
    pub fn elapsed_label(&self, now: DateTime<Utc>) -> String {
        format_clock(self.session.elapsed(now))
    }

    #[must_use]
    pub fn palette(&self) -> Vec<PaletteItemVm> {
        let cursor = self.session.cursor();
        self.session
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| PaletteItemVm {
                index,
                label: (index + 1).to_string(),
                answered: self
                    .session
                    .selection_for(question.id())
                    .is_some_and(Selection::is_answered),
                current: index == cursor,
            })
            .collect()
    }

    #[must_use]
    pub fn submission_failure(&self) -> Option<&str> {
        match self.session.submission_state() {
            Some(SubmissionState::Failed { reason }) => Some(reason.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn can_retry_submission(&self) -> bool {
        self.submission_failure().is_some()
            && self.session.config().allow_resubmit_on_failure()
    }

    /// Apply an intent through the quiz loop.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::InvalidAction` for rejected transitions and
    /// `ViewError::SubmitFailed` when the answers could not be delivered.
    pub async fn apply(
        &mut self,
        quiz_loop: &QuizLoopService,
        intent: QuizIntent,
    ) -> Result<QuizOutcome, ViewError> {
        match intent {
            QuizIntent::Select(option_index) => {
                let question_id = self.question().id();
                quiz_loop.select(&mut self.session, question_id, option_index)?;
            }
            QuizIntent::Back => {
                quiz_loop.back(&mut self.session)?;
            }
            QuizIntent::Jump(index) => {
                quiz_loop.jump_to(&mut self.session, index)?;
            }
            QuizIntent::Next => {
                if let QuizStepOutcome::Submitted { attempt_id } =
                    quiz_loop.next(&mut self.session).await?
                {
                    return Ok(self.delivered(attempt_id));
                }
            }
            QuizIntent::Submit => {
                let attempt_id = quiz_loop.submit(&mut self.session).await?;
                return Ok(self.delivered(attempt_id));
            }
            QuizIntent::RetrySubmission => {
                let attempt_id = quiz_loop.retry_submission(&mut self.session).await?;
                return Ok(self.delivered(attempt_id));
            }
            QuizIntent::Cancel => {
                quiz_loop.cancel(&mut self.session)?;
                return Ok(QuizOutcome::Cancelled);
            }
        }
        Ok(QuizOutcome::Continue)
    }

    fn delivered(&mut self, attempt_id: AttemptId) -> QuizOutcome {
        self.attempt_id = Some(attempt_id);
        QuizOutcome::Submitted { attempt_id }
    }
}

/// # Errors
///
/// Returns `ViewError::LoadFailed` when the question supply fails.
pub async fn start_quiz(quiz_loop: &QuizLoopService, quiz_id: QuizId) -> Result<QuizVm, ViewError> {
    let session = quiz_loop.load(quiz_id).await?;
    Ok(QuizVm::new(session))
}
