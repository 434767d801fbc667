use async_trait::async_trait;
use quiz_core::model::{QuizId, QuizSet, Submission};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A stored submission together with its storage-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRow {
    pub id: i64,
    pub submission: Submission,
}

impl AttemptRow {
    #[must_use]
    pub fn new(id: i64, submission: Submission) -> Self {
        Self { id, submission }
    }
}

/// Question supply: the content side of a quiz.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Persist or replace a quiz and its ordered questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn upsert_quiz(&self, quiz: &QuizSet) -> Result<(), StorageError>;

    /// Fetch a quiz with its questions in order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_quiz(&self, id: QuizId) -> Result<QuizSet, StorageError>;

    /// List quizzes ordered by id, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_quizzes(&self, limit: u32) -> Result<Vec<QuizSet>, StorageError>;
}

/// Submission sink: receives the finished answer map of each attempt.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Append a submitted attempt and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, submission: &Submission) -> Result<i64, StorageError>;

    /// Fetch a stored attempt by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_attempt(&self, id: i64) -> Result<Submission, StorageError>;

    /// Most recent attempts for a quiz, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_attempts(
        &self,
        quiz_id: QuizId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    quizzes: Arc<Mutex<HashMap<QuizId, QuizSet>>>,
    attempts: Arc<Mutex<Vec<AttemptRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn upsert_quiz(&self, quiz: &QuizSet) -> Result<(), StorageError> {
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(quiz.id(), quiz.clone());
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<QuizSet, StorageError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_quizzes(&self, limit: u32) -> Result<Vec<QuizSet>, StorageError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut quizzes: Vec<QuizSet> = guard.values().cloned().collect();
        quizzes.sort_by_key(QuizSet::id);
        quizzes.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(quizzes)
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempt(&self, submission: &Submission) -> Result<i64, StorageError> {
        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.len() + 1)
            .map_err(|_| StorageError::Serialization("attempt id overflow".into()))?;
        guard.push(AttemptRow::new(id, submission.clone()));
        Ok(id)
    }

    async fn get_attempt(&self, id: i64) -> Result<Submission, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.submission.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_attempts(
        &self,
        quiz_id: QuizId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<AttemptRow> = guard
            .iter()
            .filter(|row| row.submission.quiz_id() == quiz_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.submission
                .submitted_at()
                .cmp(&a.submission.submitted_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

/// Aggregates quiz and attempt repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quizzes: Arc<dyn QuizRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let quizzes: Arc<dyn QuizRepository> = Arc::new(repo.clone());
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo);
        Self { quizzes, attempts }
    }
}
