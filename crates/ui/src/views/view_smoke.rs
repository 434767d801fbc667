use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use quiz_core::model::{AnswerState, QuestionId, QuizId, QuizSet, Selection, Submission};
use quiz_core::time::fixed_now;
use services::SessionConfig;
use storage::repository::{
    AttemptRepository, AttemptRow, QuizRepository, Storage, StorageError,
};

use super::test_harness::{
    ViewKind, setup_view_harness, setup_view_harness_with, setup_view_harness_with_quizzes,
};
use crate::vm::{QuizIntent, QuizPhase};

struct FailingQuizRepo;

#[async_trait]
impl QuizRepository for FailingQuizRepo {
    async fn upsert_quiz(&self, _quiz: &QuizSet) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn get_quiz(&self, _id: QuizId) -> Result<QuizSet, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn list_quizzes(&self, _limit: u32) -> Result<Vec<QuizSet>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

struct FailingSink;

#[async_trait]
impl AttemptRepository for FailingSink {
    async fn append_attempt(&self, _submission: &Submission) -> Result<i64, StorageError> {
        Err(StorageError::Connection("sink offline".to_string()))
    }

    async fn get_attempt(&self, _id: i64) -> Result<Submission, StorageError> {
        Err(StorageError::NotFound)
    }

    async fn list_attempts(
        &self,
        _quiz_id: QuizId,
        _limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        Ok(Vec::new())
    }
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_first_question() {
    let mut harness = setup_view_harness(ViewKind::Quiz).await;
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Question 1 of 3"), "missing progress in {html}");
    assert!(
        html.contains("Which keyword declares a constant?"),
        "missing prompt in {html}"
    );
    assert!(html.contains("Time left: 01:30"), "missing timer in {html}");
    assert!(html.contains(">Next<"), "missing next button in {html}");
    assert_eq!(harness.vm_phase(), Some(QuizPhase::Answering));
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_walks_to_submission() {
    let mut harness = setup_view_harness(ViewKind::Quiz).await;
    harness.rebuild();
    harness.drive_async().await;

    harness.dispatch(QuizIntent::Select(1)).await;
    let html = harness.render();
    assert!(html.contains("question-option--selected"), "no highlight in {html}");
    assert!(html.contains("1 / 3 answered"), "missing answered count in {html}");

    harness.dispatch(QuizIntent::Next).await;
    assert!(harness.render().contains("Question 2 of 3"));

    harness.dispatch(QuizIntent::Next).await;
    let html = harness.render();
    assert!(html.contains("Question 3 of 3"), "missing last question in {html}");
    assert!(html.contains(">Submit<"), "next should read Submit in {html}");
    assert!(
        html.contains("2 questions are still unanswered"),
        "missing open-answer notice in {html}"
    );

    harness.dispatch(QuizIntent::Next).await;
    let html = harness.render();
    assert!(html.contains("Quiz submitted"), "missing completion in {html}");
    assert_eq!(harness.vm_phase(), Some(QuizPhase::Submitted));

    let rows = harness
        .storage
        .attempts
        .list_attempts(harness.quiz_id, 10)
        .await
        .expect("list attempts");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].submission.selection_for(QuestionId::new(1)),
        Some(Selection::Chosen(1))
    );
    assert_eq!(
        rows[0].submission.selection_for(QuestionId::new(3)),
        Some(Selection::Unanswered)
    );
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_split_submit_shows_submit_button() {
    let storage = Storage::in_memory();
    let attempts = Arc::clone(&storage.attempts);
    let config = SessionConfig::new().with_merge_next_and_submit(false);
    let mut harness = setup_view_harness_with(ViewKind::Quiz, storage, attempts, config).await;
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("id=\"quiz-submit\""), "missing submit in {html}");

    harness.dispatch(QuizIntent::Submit).await;
    assert!(harness.render().contains("Quiz submitted"));
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_cancel_discards_attempt() {
    let mut harness = setup_view_harness(ViewKind::Quiz).await;
    harness.rebuild();
    harness.drive_async().await;

    harness.dispatch(QuizIntent::Select(0)).await;
    harness.dispatch(QuizIntent::Cancel).await;

    let html = harness.render();
    assert!(html.contains("Quiz cancelled"), "missing cancelled screen in {html}");
    let rows = harness
        .storage
        .attempts
        .list_attempts(harness.quiz_id, 10)
        .await
        .expect("list attempts");
    assert!(rows.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_load_failure() {
    let mut harness = setup_view_harness_with_quizzes(ViewKind::Quiz, Arc::new(FailingQuizRepo)).await;
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("could not be loaded"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_reports_failed_delivery() {
    let config = SessionConfig::new().with_allow_resubmit_on_failure(true);
    let mut harness =
        setup_view_harness_with(ViewKind::Quiz, Storage::in_memory(), Arc::new(FailingSink), config)
            .await;
    harness.rebuild();
    harness.drive_async().await;

    harness.dispatch(QuizIntent::Jump(2)).await;
    harness.dispatch(QuizIntent::Next).await;

    let html = harness.render();
    assert!(html.contains("Quiz submitted"), "status should stay submitted in {html}");
    assert!(html.contains("Delivery failed"), "missing failure in {html}");
    assert!(html.contains("Retry submission"), "missing retry in {html}");
    assert_eq!(harness.vm_phase(), Some(QuizPhase::Submitted));
}

#[tokio::test(flavor = "current_thread")]
async fn history_view_smoke_renders_attempts() {
    let mut harness = setup_view_harness(ViewKind::History).await;
    let now = fixed_now();
    let answers = AnswerState::from_entries(vec![
        (QuestionId::new(1), Selection::Chosen(1)),
        (QuestionId::new(2), Selection::Unanswered),
        (QuestionId::new(3), Selection::Chosen(0)),
    ]);
    let submission =
        Submission::new(harness.quiz_id, answers, now, now + Duration::seconds(75)).unwrap();
    harness
        .storage
        .attempts
        .append_attempt(&submission)
        .await
        .expect("append attempt");

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Answered: 2 / 3"), "missing attempt in {html}");
    assert!(html.contains("Time: 01:15"), "missing duration in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn history_view_smoke_renders_empty_state() {
    let mut harness = setup_view_harness(ViewKind::History).await;
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("No attempts yet."), "missing empty state in {html}");
}
