use quiz_core::model::{QuizId, Submission};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{encode_answers, id_i64, map_attempt_row, ser};
use crate::repository::{AttemptRepository, AttemptRow, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn append_attempt(&self, submission: &Submission) -> Result<i64, StorageError> {
        let quiz_id = id_i64("quiz_id", submission.quiz_id().value())?;
        let answered = i64::try_from(submission.answers().answered_count())
            .map_err(|_| StorageError::Serialization("answered overflow".into()))?;

        let res = sqlx::query(
            r"
                INSERT INTO attempts (quiz_id, started_at, submitted_at, answered, answers)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(quiz_id)
        .bind(submission.started_at())
        .bind(submission.submitted_at())
        .bind(answered)
        .bind(encode_answers(submission.answers())?)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn get_attempt(&self, id: i64) -> Result<Submission, StorageError> {
        let row = sqlx::query(
            r"
                SELECT quiz_id, started_at, submitted_at, answers
                FROM attempts
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_attempt_row(&row)
    }

    async fn list_attempts(
        &self,
        quiz_id: QuizId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, quiz_id, started_at, submitted_at, answers
                FROM attempts
                WHERE quiz_id = ?1
                ORDER BY submitted_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(id_i64("quiz_id", quiz_id.value())?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: i64 = row.try_get("id").map_err(ser)?;
            out.push(AttemptRow::new(id, map_attempt_row(row)?));
        }
        Ok(out)
    }
}
