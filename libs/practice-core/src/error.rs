//! Error types for practice-core.

use crate::level::Level;
use thiserror::Error;

/// Result type alias using StoreError.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Validation failures of card store operations.
///
/// None of these leave the store modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("answer must not be empty")]
    EmptyAnswer,

    #[error("folder name must not be empty")]
    EmptyFolderName,

    #[error("folder not found: {0}")]
    FolderNotFound(String),

    #[error("folder already exists: {0}")]
    FolderExists(String),

    #[error("folder {0} cannot be deleted or renamed")]
    ProtectedFolder(String),

    #[error("no card at index {index} in {folder}/{level}")]
    CardNotFound {
        folder: String,
        level: Level,
        index: usize,
    },
}

/// Errors that can occur while parsing a markdown import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing question at line {line}")]
    MissingQuestion { line: usize },

    #[error("missing answer at line {line}")]
    MissingAnswer { line: usize },
}
