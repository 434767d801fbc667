use quiz_core::model::{AnswerState, Question, QuestionDraft, QuestionId, QuizId, Submission};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn quiz_id_from_i64(v: i64) -> Result<QuizId, StorageError> {
    Ok(QuizId::new(i64_to_u64("quiz_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn encode_options(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn encode_answers(answers: &AnswerState) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(ser)
}

/// Rebuild a question row through the same validation new content goes through.
pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let prompt: String = row.try_get("prompt").map_err(ser)?;
    let options_json: String = row.try_get("options").map_err(ser)?;
    let options: Vec<String> = serde_json::from_str(&options_json).map_err(ser)?;
    let allotment = row
        .try_get::<Option<i64>, _>("time_allotment_secs")
        .map_err(ser)?
        .map(|v| u32_from_i64("time_allotment_secs", v))
        .transpose()?;

    let mut draft = QuestionDraft::new(prompt, options);
    draft.time_allotment_secs = allotment;
    draft.validate(id).map_err(ser)
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<Submission, StorageError> {
    let quiz_id = quiz_id_from_i64(row.try_get::<i64, _>("quiz_id").map_err(ser)?)?;
    let started_at = row.try_get("started_at").map_err(ser)?;
    let submitted_at = row.try_get("submitted_at").map_err(ser)?;
    let answers_json: String = row.try_get("answers").map_err(ser)?;
    let answers: AnswerState = serde_json::from_str(&answers_json).map_err(ser)?;

    Submission::new(quiz_id, answers, started_at, submitted_at).map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_ids_are_rejected() {
        assert!(quiz_id_from_i64(-1).is_err());
        assert_eq!(question_id_from_i64(4).unwrap(), QuestionId::new(4));
    }

    #[test]
    fn u64_ids_beyond_i64_overflow() {
        assert!(id_i64("quiz_id", u64::MAX).is_err());
    }

    #[test]
    fn options_encode_as_json_array() {
        let encoded = encode_options(&["A".to_string(), "B".to_string()]).unwrap();
        assert_eq!(encoded, r#"["A","B"]"#);
    }
}
