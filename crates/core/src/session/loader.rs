use crate::model::{QuizId, QuizSet};
use crate::time::Clock;

use super::config::SessionConfig;
use super::error::{SessionAction, SessionError};
use super::quiz_session::QuizSession;

/// Where the loader stands in fetching a question set.
#[derive(Debug)]
pub enum LoadState {
    Idle,
    Loading { quiz_id: QuizId },
    Ready(QuizSession),
    LoadFailed { quiz_id: QuizId, reason: String },
}

/// Holds the session slot until the content collaborator reports back.
///
/// The collaborator calls `on_loaded` or `on_load_failed`; a failed load
/// leaves no session behind.
#[derive(Debug)]
pub struct QuizLoader {
    state: LoadState,
    config: SessionConfig,
    clock: Clock,
}

impl QuizLoader {
    #[must_use]
    pub fn new(config: SessionConfig, clock: Clock) -> Self {
        Self {
            state: LoadState::Idle,
            config,
            clock,
        }
    }

    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Mark a fetch as in flight. Allowed from `Idle` or after a failure.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidLoadTransition` while loading or once ready.
    pub fn begin_load(&mut self, quiz_id: QuizId) -> Result<(), SessionError> {
        match self.state {
            LoadState::Idle | LoadState::LoadFailed { .. } => {
                self.state = LoadState::Loading { quiz_id };
                Ok(())
            }
            _ => Err(SessionError::InvalidLoadTransition {
                action: SessionAction::BeginLoad,
            }),
        }
    }

    /// Hook for a completed fetch: starts the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidLoadTransition` unless a load is in flight.
    pub fn on_loaded(&mut self, quiz: &QuizSet) -> Result<&mut QuizSession, SessionError> {
        if !matches!(self.state, LoadState::Loading { .. }) {
            return Err(SessionError::InvalidLoadTransition {
                action: SessionAction::Loaded,
            });
        }
        let session = QuizSession::start(quiz, self.config, self.clock)?;
        self.state = LoadState::Ready(session);
        match &mut self.state {
            LoadState::Ready(session) => Ok(session),
            _ => Err(SessionError::InvalidLoadTransition {
                action: SessionAction::Loaded,
            }),
        }
    }

    /// Hook for a failed fetch.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidLoadTransition` unless a load is in flight.
    pub fn on_load_failed(&mut self, reason: impl Into<String>) -> Result<(), SessionError> {
        let LoadState::Loading { quiz_id } = self.state else {
            return Err(SessionError::InvalidLoadTransition {
                action: SessionAction::LoadFailed,
            });
        };
        self.state = LoadState::LoadFailed {
            quiz_id,
            reason: reason.into(),
        };
        Ok(())
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        match &self.state {
            LoadState::Ready(session) => Some(session),
            _ => None,
        }
    }

    /// Take ownership of the ready session, resetting the loader to `Idle`.
    pub fn take_session(&mut self) -> Option<QuizSession> {
        match std::mem::replace(&mut self.state, LoadState::Idle) {
            LoadState::Ready(session) => Some(session),
            other => {
                self.state = other;
                None
            }
        }
    }
}
