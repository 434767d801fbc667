//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::session::SessionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by quiz services.
///
/// `LoadFailed` and `SubmitFailed` report collaborator failures; neither is
/// retried here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("quiz could not be loaded: {0}")]
    LoadFailed(String),
    #[error("submission was not accepted: {0}")]
    SubmitFailed(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error("no quizzes are available")]
    NoQuizzes,
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
