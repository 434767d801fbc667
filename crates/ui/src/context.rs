use std::sync::Arc;

use quiz_core::model::QuizId;
use services::{AttemptHistoryService, QuizLoopService};

pub trait UiApp: Send + Sync {
    fn quiz_id(&self) -> QuizId;

    fn quiz_loop(&self) -> Arc<QuizLoopService>;
    fn attempt_history(&self) -> Arc<AttemptHistoryService>;
}

#[derive(Clone)]
pub struct AppContext {
    quiz_id: QuizId,
    quiz_loop: Arc<QuizLoopService>,
    attempt_history: Arc<AttemptHistoryService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            quiz_id: app.quiz_id(),
            quiz_loop: app.quiz_loop(),
            attempt_history: app.attempt_history(),
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn attempt_history(&self) -> Arc<AttemptHistoryService> {
        Arc::clone(&self.attempt_history)
    }
}

// Provided by the composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
