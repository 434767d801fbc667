use chrono::{DateTime, Utc};
use std::sync::Arc;

use rand::seq::SliceRandom;

use quiz_core::model::{QuestionId, QuizId, QuizSet, Submission};
use quiz_core::session::{QuizLoader, QuizSession, SessionConfig, Step};
use storage::repository::{AttemptRepository, QuizRepository};

use super::history::AttemptId;
use crate::Clock;
use crate::error::QuizServiceError;

/// Result of pressing "Next" through the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStepOutcome {
    Moved { cursor: usize },
    Submitted { attempt_id: AttemptId },
}

/// Orchestrates quiz loading, navigation and delivery of the final answers.
///
/// The session itself stays synchronous; this service is where the
/// asynchronous collaborators (question supply, submission sink) are awaited
/// and their outcome is fed back through the session hooks.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    config: SessionConfig,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptRepository>,
    shuffle_questions: bool,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            config: SessionConfig::default(),
            quizzes,
            attempts,
            shuffle_questions: false,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Present questions in a random order. The shuffled order is fixed for
    /// the whole attempt.
    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle: bool) -> Self {
        self.shuffle_questions = shuffle;
        self
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fetch a quiz and start a session over it.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::LoadFailed` when the question supply fails;
    /// no session exists in that case.
    pub async fn load(&self, quiz_id: QuizId) -> Result<QuizSession, QuizServiceError> {
        let mut loader = QuizLoader::new(self.config, self.clock);
        loader.begin_load(quiz_id)?;

        let quiz = match self.quizzes.get_quiz(quiz_id).await {
            Ok(quiz) => quiz,
            Err(err) => {
                let reason = err.to_string();
                log::warn!("loading quiz {quiz_id} failed: {reason}");
                loader.on_load_failed(reason.clone())?;
                return Err(QuizServiceError::LoadFailed(reason));
            }
        };

        let quiz = if self.shuffle_questions {
            shuffled(&quiz).map_err(|e| QuizServiceError::LoadFailed(e.to_string()))?
        } else {
            quiz
        };

        loader.on_loaded(&quiz)?;
        let session = loader
            .take_session()
            .ok_or_else(|| QuizServiceError::LoadFailed("session was not started".into()))?;
        log::info!(
            "started quiz {} with {} questions",
            quiz.id(),
            session.question_count()
        );
        Ok(session)
    }

    /// Record a pick for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` when the session rejects it.
    pub fn select(
        &self,
        session: &mut QuizSession,
        question_id: QuestionId,
        option_index: usize,
    ) -> Result<(), QuizServiceError> {
        session.select_option(question_id, option_index)?;
        log::debug!("quiz {}: {question_id} -> option {option_index}", session.quiz_id());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` at the first question or after a terminal status.
    pub fn back(&self, session: &mut QuizSession) -> Result<usize, QuizServiceError> {
        Ok(session.back()?)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` for an out-of-range index or a terminal session.
    pub fn jump_to(&self, session: &mut QuizSession, index: usize) -> Result<usize, QuizServiceError> {
        Ok(session.jump_to(index)?)
    }

    /// Advance, delivering the answers when "Next" doubles as "Submit".
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` for a rejected transition and
    /// `QuizServiceError::SubmitFailed` when the sink rejects the answers (the
    /// session still ends up `Submitted`).
    pub async fn next(&self, session: &mut QuizSession) -> Result<QuizStepOutcome, QuizServiceError> {
        match session.next()? {
            Step::Moved { cursor } => Ok(QuizStepOutcome::Moved { cursor }),
            Step::Submitted(submission) => {
                let attempt_id = self.deliver(session, &submission).await?;
                Ok(QuizStepOutcome::Submitted { attempt_id })
            }
        }
    }

    /// Finish the attempt explicitly and deliver the answers.
    ///
    /// # Errors
    ///
    /// Same as `next` for the submitting case.
    pub async fn submit(&self, session: &mut QuizSession) -> Result<AttemptId, QuizServiceError> {
        let submission = session.submit()?;
        self.deliver(session, &submission).await
    }

    /// Deliver the frozen answers again after a failed submission.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` when resubmission is not permitted,
    /// `QuizServiceError::SubmitFailed` when the sink fails again.
    pub async fn retry_submission(
        &self,
        session: &mut QuizSession,
    ) -> Result<AttemptId, QuizServiceError> {
        let submission = session.retry_submission()?;
        log::info!("retrying submission for quiz {}", session.quiz_id());
        self.deliver(session, &submission).await
    }

    /// Abandon the attempt; nothing reaches the sink.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` unless the session is in progress.
    pub fn cancel(&self, session: &mut QuizSession) -> Result<(), QuizServiceError> {
        session.cancel()?;
        log::info!("quiz {} cancelled at question {}", session.quiz_id(), session.cursor() + 1);
        Ok(())
    }

    async fn deliver(
        &self,
        session: &mut QuizSession,
        submission: &Submission,
    ) -> Result<AttemptId, QuizServiceError> {
        match self.attempts.append_attempt(submission).await {
            Ok(attempt_id) => {
                session.on_submit_ack()?;
                log::info!(
                    "quiz {} submitted as attempt {attempt_id} ({}/{} answered)",
                    submission.quiz_id(),
                    submission.answers().answered_count(),
                    submission.answers().len()
                );
                Ok(attempt_id)
            }
            Err(err) => {
                let reason = err.to_string();
                log::warn!("submission for quiz {} failed: {reason}", submission.quiz_id());
                session.on_submit_failed(reason.clone())?;
                Err(QuizServiceError::SubmitFailed(reason))
            }
        }
    }
}

fn shuffled(quiz: &QuizSet) -> Result<QuizSet, quiz_core::model::QuizSetError> {
    let mut questions = quiz.questions().to_vec();
    let mut rng = rand::rng();
    questions.shuffle(&mut rng);
    QuizSet::new(quiz.id(), quiz.title(), questions, quiz.time_budget())
}
