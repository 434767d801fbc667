mod config;
mod error;
mod loader;
mod progress;
mod quiz_session;

pub use config::SessionConfig;
pub use error::{SelectionFault, SessionAction, SessionError};
pub use loader::{LoadState, QuizLoader};
pub use progress::SessionProgress;
pub use quiz_session::{QuizSession, SessionStatus, Step, SubmissionState};
