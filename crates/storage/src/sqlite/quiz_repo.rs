use quiz_core::model::{QuizId, QuizSet, TimeBudget};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{encode_options, id_i64, map_question_row, quiz_id_from_i64, ser, u32_from_i64};
use crate::repository::{QuizRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl SqliteRepository {
    async fn load_quiz(&self, row: &SqliteRow) -> Result<QuizSet, StorageError> {
        let id = quiz_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
        let title: String = row.try_get("title").map_err(ser)?;
        let budget = u32_from_i64(
            "time_budget_secs",
            row.try_get::<i64, _>("time_budget_secs").map_err(ser)?,
        )?;

        let question_rows = sqlx::query(
            r"
                SELECT id, prompt, options, time_allotment_secs
                FROM questions
                WHERE quiz_id = ?1
                ORDER BY position ASC
            ",
        )
        .bind(id_i64("quiz_id", id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(question_rows.len());
        for row in &question_rows {
            questions.push(map_question_row(row)?);
        }

        QuizSet::new(id, title, questions, TimeBudget::from_secs(budget)).map_err(ser)
    }
}

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn upsert_quiz(&self, quiz: &QuizSet) -> Result<(), StorageError> {
        let quiz_id = id_i64("quiz_id", quiz.id().value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
                INSERT INTO quizzes (id, title, time_budget_secs)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    time_budget_secs = excluded.time_budget_secs
            ",
        )
        .bind(quiz_id)
        .bind(quiz.title())
        .bind(i64::from(quiz.time_budget().total_secs()))
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        // Questions are replaced wholesale so order changes cannot collide on position.
        sqlx::query("DELETE FROM questions WHERE quiz_id = ?1")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, question) in quiz.questions().iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("position overflow".into()))?;
            sqlx::query(
                r"
                    INSERT INTO questions (
                        id, quiz_id, position, prompt, options, time_allotment_secs
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(id_i64("question_id", question.id().value())?)
            .bind(quiz_id)
            .bind(position)
            .bind(question.prompt())
            .bind(encode_options(question.options())?)
            .bind(question.time_allotment_secs().map(i64::from))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        log::debug!("stored quiz {} with {} questions", quiz.id(), quiz.len());
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<QuizSet, StorageError> {
        let row = sqlx::query("SELECT id, title, time_budget_secs FROM quizzes WHERE id = ?1")
            .bind(id_i64("quiz_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        self.load_quiz(&row).await
    }

    async fn list_quizzes(&self, limit: u32) -> Result<Vec<QuizSet>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, title, time_budget_secs FROM quizzes ORDER BY id ASC LIMIT ?1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(self.load_quiz(row).await?);
        }
        Ok(out)
    }
}
