mod attempt_vm;
mod quiz_vm;
mod time_fmt;

pub use attempt_vm::{AttemptCardVm, map_attempt_cards};
pub use quiz_vm::{PaletteItemVm, QuizIntent, QuizOutcome, QuizPhase, QuizVm, start_quiz};
pub use time_fmt::{format_clock, format_datetime};
