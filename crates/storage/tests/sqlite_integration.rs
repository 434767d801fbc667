use chrono::Duration;
use quiz_core::model::{
    AnswerState, QuestionDraft, QuestionId, QuizId, QuizSet, Selection, Submission, TimeBudget,
};
use quiz_core::time::fixed_now;
use storage::repository::{AttemptRepository, QuizRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_quiz(id: u64, prompts: &[(&str, &[&str])]) -> QuizSet {
    let questions = prompts
        .iter()
        .enumerate()
        .map(|(i, (prompt, options))| {
            QuestionDraft::new(*prompt, options.iter().copied())
                .with_time_allotment(30)
                .validate(QuestionId::new(u64::try_from(i).unwrap() + 10))
                .unwrap()
        })
        .collect();
    QuizSet::new(QuizId::new(id), "Sample", questions, TimeBudget::from_secs(90)).unwrap()
}

#[tokio::test]
async fn sqlite_roundtrips_quiz_in_question_order() {
    let repo = connect("memdb_quiz_roundtrip").await;
    let quiz = build_quiz(1, &[("First?", &["A", "B"]), ("Second?", &["A", "B", "C"])]);
    repo.upsert_quiz(&quiz).await.unwrap();

    let fetched = repo.get_quiz(QuizId::new(1)).await.unwrap();
    assert_eq!(fetched, quiz);
    assert_eq!(fetched.questions()[1].options(), ["A", "B", "C"]);
    assert_eq!(fetched.time_budget().total_secs(), 90);
}

#[tokio::test]
async fn sqlite_upsert_replaces_questions() {
    let repo = connect("memdb_quiz_replace").await;
    repo.upsert_quiz(&build_quiz(1, &[("Old?", &["A"]), ("Older?", &["B"])]))
        .await
        .unwrap();
    let replacement = build_quiz(1, &[("New?", &["X", "Y"])]);
    repo.upsert_quiz(&replacement).await.unwrap();

    let fetched = repo.get_quiz(QuizId::new(1)).await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched.questions()[0].prompt(), "New?");

    let listed = repo.list_quizzes(10).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn sqlite_missing_quiz_is_not_found() {
    let repo = connect("memdb_quiz_missing").await;
    let err = repo.get_quiz(QuizId::new(404)).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_appends_and_lists_attempts() {
    let repo = connect("memdb_attempts").await;
    repo.upsert_quiz(&build_quiz(1, &[("Q?", &["A", "B"]), ("R?", &["A", "B"])]))
        .await
        .unwrap();

    let now = fixed_now();
    let answers = AnswerState::from_entries(vec![
        (QuestionId::new(10), Selection::Chosen(1)),
        (QuestionId::new(11), Selection::Unanswered),
    ]);
    let early = Submission::new(QuizId::new(1), answers.clone(), now, now + Duration::minutes(1))
        .unwrap();
    let late =
        Submission::new(QuizId::new(1), answers, now, now + Duration::minutes(3)).unwrap();

    let early_id = repo.append_attempt(&early).await.unwrap();
    let late_id = repo.append_attempt(&late).await.unwrap();

    let stored = repo.get_attempt(early_id).await.unwrap();
    assert_eq!(stored, early);
    assert_eq!(
        stored.selection_for(QuestionId::new(11)),
        Some(Selection::Unanswered)
    );

    let rows = repo.list_attempts(QuizId::new(1), 10).await.unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![late_id, early_id]);
}

#[tokio::test]
async fn sqlite_rejects_attempt_for_unknown_quiz() {
    let repo = connect("memdb_attempt_orphan").await;
    let now = fixed_now();
    let orphan = Submission::new(QuizId::new(9), AnswerState::default(), now, now).unwrap();
    let err = repo.append_attempt(&orphan).await.unwrap_err();
    assert!(matches!(err, StorageError::Connection(_)));
}
