use std::fmt;

use quiz_core::model::QuizId;
use storage::demo::demo_quiz;
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    quiz_id: QuizId,
    title: String,
    budget_secs: Option<u32>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuizId { raw: String },
    InvalidQuizIdEnv { raw: String },
    InvalidBudget { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid --quiz-id value: {raw}"),
            ArgsError::InvalidQuizIdEnv { raw } => write!(f, "invalid QUIZ_ID value: {raw}"),
            ArgsError::InvalidBudget { raw } => write!(f, "invalid --budget-secs value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3?mode=rwc".into());
        let mut quiz_id = std::env::var("QUIZ_ID").map_or(Ok(QuizId::new(1)), |raw| {
            raw.parse::<QuizId>()
                .map_err(|_| ArgsError::InvalidQuizIdEnv { raw })
        });
        let mut title = std::env::var("QUIZ_TITLE").unwrap_or_else(|_| "Rust Basics".into());
        let mut budget_secs = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--quiz-id" => {
                    let value = require_value(&mut args, "--quiz-id")?;
                    quiz_id = Ok(value
                        .parse()
                        .map_err(|_| ArgsError::InvalidQuizId { raw: value.clone() })?);
                }
                "--title" => {
                    title = require_value(&mut args, "--title")?;
                }
                "--budget-secs" => {
                    let value = require_value(&mut args, "--budget-secs")?;
                    let parsed = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidBudget { raw: value.clone() })?;
                    budget_secs = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            quiz_id: quiz_id?,
            title,
            budget_secs,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3?mode=rwc)");
    eprintln!("  --quiz-id <id>            Quiz id to upsert (default: 1)");
    eprintln!("  --title <text>            Quiz title (default: Rust Basics)");
    eprintln!("  --budget-secs <n>         Time budget; defaults to the sum of question allotments");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL, QUIZ_ID, QUIZ_TITLE");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;

    let quiz = demo_quiz(args.quiz_id, args.title.clone(), args.budget_secs)?;
    storage.quizzes.upsert_quiz(&quiz).await?;

    println!(
        "Seeded quiz {} ({} questions, {}s budget) into {}",
        quiz.id(),
        quiz.len(),
        quiz.time_budget().total_secs(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
