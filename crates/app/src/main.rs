use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::model::QuizId;
use services::{AppServices, AttemptHistoryService, Clock, QuizLoopService, SessionConfig};
use storage::demo::demo_quiz;
use storage::repository::Storage;
use ui::{App, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite:dev.sqlite3";
const DEFAULT_SEED_TITLE: &str = "Rust Basics";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuizId { raw: String },
    InvalidQuizIdEnv { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid --quiz-id value: {raw}"),
            ArgsError::InvalidQuizIdEnv { raw } => write!(f, "invalid QUIZ_ID value: {raw}"),
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

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn quiz_id(&self) -> QuizId {
        self.services.quiz_id()
    }

    fn quiz_loop(&self) -> Arc<QuizLoopService> {
        self.services.quiz_loop()
    }

    fn attempt_history(&self) -> Arc<AttemptHistoryService> {
        self.services.attempt_history()
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    quiz_id: QuizId,
    config: SessionConfig,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui   [--db <sqlite_url>] [--quiz-id <id>] [--split-submit] [--allow-resubmit]");
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>] [--quiz-id <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --quiz-id 1");
    eprintln!();
    eprintln!("Flags (ui):");
    eprintln!("  --split-submit     keep Next and Submit as separate actions");
    eprintln!("  --allow-resubmit   offer a retry when the answers could not be delivered");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_ID, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

impl Args {
    fn parse(
        cmd: Command,
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("QUIZ_DB_URL")
            .map_or_else(|| normalize_sqlite_url(DEFAULT_DB_URL), |raw| normalize_sqlite_url(&raw));
        // A bad QUIZ_ID only matters when --quiz-id does not replace it.
        let mut quiz_id = env("QUIZ_ID").map_or(Ok(QuizId::new(1)), |raw| {
            raw.parse::<QuizId>()
                .map_err(|_| ArgsError::InvalidQuizIdEnv { raw })
        });
        let mut config = SessionConfig::default();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(&value);
                }
                "--quiz-id" => {
                    let value = require_value(&mut args, "--quiz-id")?;
                    quiz_id = Ok(value
                        .parse()
                        .map_err(|_| ArgsError::InvalidQuizId { raw: value.clone() })?);
                }
                "--split-submit" if cmd == Command::Ui => {
                    config = config.with_merge_next_and_submit(false);
                }
                "--allow-resubmit" if cmd == Command::Ui => {
                    config = config.with_allow_resubmit_on_failure(true);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            quiz_id: quiz_id?,
            config,
        })
    }
}

/// Turn relative `sqlite:` paths into absolute `sqlite://` URLs so the
/// database does not depend on the launch directory.
fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if argv.first().is_some_and(|first| !first.starts_with("--")) {
        argv.remove(0);
    }
    if argv.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return Ok(());
    }

    let parsed = Args::parse(cmd, argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    log::debug!("parsed arguments: {parsed:?}");

    prepare_sqlite_file(&parsed.db_url)?;

    match cmd {
        Command::Ui => {
            let services = AppServices::new_sqlite(
                &parsed.db_url,
                Clock::system(),
                parsed.quiz_id,
                parsed.config,
            )
            .await?;
            log::info!(
                "launching quiz {} from {}",
                services.quiz_id(),
                parsed.db_url
            );

            let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
            let context = build_app_context(&app);

            // Some dev setups default tao windows to always-on-top.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Quiz")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Seed => {
            let storage = Storage::sqlite(&parsed.db_url).await?;
            let quiz = demo_quiz(parsed.quiz_id, DEFAULT_SEED_TITLE, None)?;
            storage.quizzes.upsert_quiz(&quiz).await?;
            log::info!("seeded quiz {} into {}", quiz.id(), parsed.db_url);
            println!(
                "Seeded quiz {} ({} questions) into {}",
                quiz.id(),
                quiz.len(),
                parsed.db_url
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        log::error!("{err}");
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_use_merged_submit_and_quiz_one() {
        let parsed = Args::parse(Command::Ui, Vec::new(), no_env).unwrap();
        assert_eq!(parsed.quiz_id, QuizId::new(1));
        assert!(parsed.config.merge_next_and_submit());
        assert!(!parsed.config.allow_resubmit_on_failure());
        assert!(parsed.db_url.starts_with("sqlite://"));
        assert!(parsed.db_url.ends_with("dev.sqlite3"));
    }

    #[test]
    fn flags_override_environment() {
        let env = |key: &str| match key {
            "QUIZ_ID" => Some("4".to_string()),
            "QUIZ_DB_URL" => Some("sqlite:///tmp/env.sqlite3".to_string()),
            _ => None,
        };
        let parsed = Args::parse(
            Command::Ui,
            args(&["--quiz-id", "9", "--split-submit", "--allow-resubmit"]),
            env,
        )
        .unwrap();
        assert_eq!(parsed.quiz_id, QuizId::new(9));
        assert_eq!(parsed.db_url, "sqlite:///tmp/env.sqlite3");
        assert!(!parsed.config.merge_next_and_submit());
        assert!(parsed.config.allow_resubmit_on_failure());
    }

    #[test]
    fn session_flags_are_ui_only() {
        let err = Args::parse(Command::Seed, args(&["--split-submit"]), no_env).unwrap_err();
        assert!(matches!(err, ArgsError::UnknownArg(_)));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Args::parse(Command::Ui, args(&["--quiz-id", "abc"]), no_env),
            Err(ArgsError::InvalidQuizId { .. })
        ));
        assert!(matches!(
            Args::parse(Command::Ui, args(&["--db"]), no_env),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(
            Args::parse(Command::Ui, args(&["--db", "  "]), no_env),
            Err(ArgsError::InvalidDbUrl { .. })
        ));
    }

    #[test]
    fn unparsable_quiz_id_env_is_rejected_unless_overridden() {
        let env = |key: &str| (key == "QUIZ_ID").then(|| "seven".to_string());
        assert!(matches!(
            Args::parse(Command::Ui, Vec::new(), env),
            Err(ArgsError::InvalidQuizIdEnv { ref raw }) if raw == "seven"
        ));

        let parsed = Args::parse(Command::Ui, args(&["--quiz-id", "3"]), env).unwrap();
        assert_eq!(parsed.quiz_id, QuizId::new(3));
    }

    #[test]
    fn normalizes_relative_sqlite_paths() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(normalize_sqlite_url("sqlite:///abs/db.sqlite3"), "sqlite:///abs/db.sqlite3");
        let relative = normalize_sqlite_url("sqlite:data/quiz.sqlite3");
        assert!(relative.starts_with("sqlite:///"), "{relative}");
        assert!(relative.ends_with("data/quiz.sqlite3"), "{relative}");
    }
}
