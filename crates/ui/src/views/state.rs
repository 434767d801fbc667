use dioxus::prelude::*;

use services::QuizServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    LoadFailed,
    SubmitFailed,
    InvalidAction,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::LoadFailed => "The quiz could not be loaded.",
            Self::SubmitFailed => "Your answers were recorded but could not be delivered.",
            Self::InvalidAction => "That action is not available right now.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<QuizServiceError> for ViewError {
    fn from(err: QuizServiceError) -> Self {
        match err {
            QuizServiceError::LoadFailed(_) => Self::LoadFailed,
            QuizServiceError::SubmitFailed(_) => Self::SubmitFailed,
            QuizServiceError::Session(_) => Self::InvalidAction,
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
