mod history;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizServiceError;
pub use history::{AttemptHistoryService, AttemptId, AttemptListItem};
pub use workflow::{QuizLoopService, QuizStepOutcome};
