//! Demo content used by the `seed` entry points.

use quiz_core::model::{QuestionDraft, QuestionId, QuizId, QuizSet, TimeBudget};

const SAMPLES: &[(&str, &[&str], u32)] = &[
    (
        "Which keyword declares an immutable binding?",
        &["let", "mut", "static", "var"],
        30,
    ),
    (
        "What does the `?` operator do on an `Err` value?",
        &["Panics", "Returns it early", "Ignores it"],
        45,
    ),
    (
        "Which trait enables `{}` formatting?",
        &["Debug", "Display"],
        30,
    ),
    (
        "Who owns a value after `let b = a;` for a `String`?",
        &["a", "b", "Both"],
        40,
    ),
];

/// Build the demo quiz. Without `budget_secs` the budget is the sum of the
/// per-question allotments.
///
/// # Errors
///
/// Returns `quiz_core::Error` if the sample content fails validation.
pub fn demo_quiz(
    quiz_id: QuizId,
    title: impl Into<String>,
    budget_secs: Option<u32>,
) -> Result<QuizSet, quiz_core::Error> {
    let mut questions = Vec::with_capacity(SAMPLES.len());
    for (id, (prompt, options, allotment)) in (1_u64..).zip(SAMPLES) {
        let question = QuestionDraft::new(*prompt, options.iter().copied())
            .with_time_allotment(*allotment)
            .validate(QuestionId::new(id))?;
        questions.push(question);
    }

    let budget = budget_secs
        .map_or_else(|| TimeBudget::from_allotments(&questions), TimeBudget::from_secs);
    Ok(QuizSet::new(quiz_id, title, questions, budget)?)
}
