use std::fmt;

use thiserror::Error;

use crate::model::{QuestionId, QuizSetError, SubmissionError};

use super::quiz_session::SessionStatus;

/// User-facing operations, named in transition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Select,
    Next,
    Back,
    Jump,
    Submit,
    Cancel,
    SubmitAck,
    SubmitFailed,
    RetrySubmission,
    BeginLoad,
    Loaded,
    LoadFailed,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionAction::Select => "select an option",
            SessionAction::Next => "advance",
            SessionAction::Back => "go back",
            SessionAction::Jump => "jump to a question",
            SessionAction::Submit => "submit",
            SessionAction::Cancel => "cancel",
            SessionAction::SubmitAck => "acknowledge submission",
            SessionAction::SubmitFailed => "record submission failure",
            SessionAction::RetrySubmission => "retry submission",
            SessionAction::BeginLoad => "begin loading",
            SessionAction::Loaded => "accept loaded questions",
            SessionAction::LoadFailed => "record load failure",
        };
        f.write_str(label)
    }
}

/// Why a selection was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionFault {
    #[error("question {question_id} is not the current question ({current})")]
    NotCurrent {
        question_id: QuestionId,
        current: QuestionId,
    },

    #[error("option {index} is out of range for {option_count} options")]
    OutOfRange { index: usize, option_count: usize },
}

/// Errors emitted by the quiz state machine. None of them change state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid quiz input: {0}")]
    InvalidInput(#[from] QuizSetError),

    #[error("invalid selection: {0}")]
    InvalidSelection(SelectionFault),

    #[error("cannot {action} (session {status})")]
    InvalidTransition {
        action: SessionAction,
        status: SessionStatus,
    },

    #[error("cannot build submission: {0}")]
    InvalidSubmission(#[from] SubmissionError),

    #[error("cannot {action} in the current loader state")]
    InvalidLoadTransition { action: SessionAction },
}

impl From<SelectionFault> for SessionError {
    fn from(fault: SelectionFault) -> Self {
        SessionError::InvalidSelection(fault)
    }
}
