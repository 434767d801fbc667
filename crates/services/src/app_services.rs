use std::sync::Arc;

use quiz_core::model::QuizId;
use storage::repository::{QuizRepository, Storage, StorageError};

use crate::error::AppServicesError;
use crate::quizzes::{AttemptHistoryService, QuizLoopService};
use crate::{Clock, SessionConfig};

/// Assembles app-facing services and resolves a usable quiz id.
#[derive(Clone)]
pub struct AppServices {
    quiz_id: QuizId,
    quiz_loop: Arc<QuizLoopService>,
    attempt_history: Arc<AttemptHistoryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or no quiz exists.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        preferred_quiz_id: QuizId,
        config: SessionConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock, preferred_quiz_id, config).await
    }

    /// Build services over an already assembled `Storage`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::NoQuizzes` when storage holds no quiz at all.
    pub async fn from_storage(
        storage: Storage,
        clock: Clock,
        preferred_quiz_id: QuizId,
        config: SessionConfig,
    ) -> Result<Self, AppServicesError> {
        let quiz_id = resolve_quiz_id(storage.quizzes.as_ref(), preferred_quiz_id).await?;

        let quiz_loop = Arc::new(
            QuizLoopService::new(
                clock,
                Arc::clone(&storage.quizzes),
                Arc::clone(&storage.attempts),
            )
            .with_config(config),
        );
        let attempt_history = Arc::new(AttemptHistoryService::new(Arc::clone(&storage.attempts)));

        Ok(Self {
            quiz_id,
            quiz_loop,
            attempt_history,
        })
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

async fn resolve_quiz_id(
    quizzes: &dyn QuizRepository,
    preferred_id: QuizId,
) -> Result<QuizId, AppServicesError> {
    match quizzes.get_quiz(preferred_id).await {
        Ok(_) => return Ok(preferred_id),
        Err(StorageError::NotFound) => {}
        Err(err) => return Err(err.into()),
    }

    let existing = quizzes.list_quizzes(1).await?;
    match existing.first() {
        Some(first) => {
            log::warn!("quiz {preferred_id} not found; falling back to quiz {}", first.id());
            Ok(first.id())
        }
        None => Err(AppServicesError::NoQuizzes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionDraft, QuestionId, QuizSet, TimeBudget};
    use quiz_core::time::fixed_clock;

    fn quiz(id: u64) -> QuizSet {
        let q = QuestionDraft::new("Q", ["A", "B"])
            .validate(QuestionId::new(1))
            .unwrap();
        QuizSet::new(QuizId::new(id), "Quiz", vec![q], TimeBudget::untimed()).unwrap()
    }

    #[tokio::test]
    async fn preferred_quiz_is_used_when_present() {
        let storage = Storage::in_memory();
        storage.quizzes.upsert_quiz(&quiz(3)).await.unwrap();
        storage.quizzes.upsert_quiz(&quiz(8)).await.unwrap();

        let services =
            AppServices::from_storage(storage, fixed_clock(), QuizId::new(8), SessionConfig::default())
                .await
                .unwrap();
        assert_eq!(services.quiz_id(), QuizId::new(8));
    }

    #[tokio::test]
    async fn falls_back_to_first_quiz() {
        let storage = Storage::in_memory();
        storage.quizzes.upsert_quiz(&quiz(3)).await.unwrap();

        let services =
            AppServices::from_storage(storage, fixed_clock(), QuizId::new(1), SessionConfig::default())
                .await
                .unwrap();
        assert_eq!(services.quiz_id(), QuizId::new(3));
    }

    #[tokio::test]
    async fn empty_storage_reports_no_quizzes() {
        let result = AppServices::from_storage(
            Storage::in_memory(),
            fixed_clock(),
            QuizId::new(1),
            SessionConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(AppServicesError::NoQuizzes)));
    }

    #[tokio::test]
    async fn configured_split_submit_reaches_the_loop() {
        let storage = Storage::in_memory();
        storage.quizzes.upsert_quiz(&quiz(1)).await.unwrap();
        let config = SessionConfig::new().with_merge_next_and_submit(false);

        let services = AppServices::from_storage(storage, fixed_clock(), QuizId::new(1), config)
            .await
            .unwrap();
        assert!(!services.quiz_loop().config().merge_next_and_submit());
    }
}
