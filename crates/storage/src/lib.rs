#![forbid(unsafe_code)]

pub mod demo;
pub mod repository;
pub mod sqlite;

pub use repository::{
    AttemptRepository, AttemptRow, InMemoryRepository, QuizRepository, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
