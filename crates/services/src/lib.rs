#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod quizzes;

pub use quiz_core::Clock;
pub use quiz_core::session::SessionConfig;

pub use app_services::AppServices;
pub use error::{AppServicesError, QuizServiceError};
pub use quizzes::{
    AttemptHistoryService, AttemptId, AttemptListItem, QuizLoopService, QuizStepOutcome,
};
