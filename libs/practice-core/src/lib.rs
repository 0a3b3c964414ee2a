//! Core library for tiered flashcard practice.
//!
//! Provides:
//! - Card store organised as folder -> mastery level -> cards
//! - Weighted card selector with a recency window
//! - Level progression on correct/incorrect answers
//! - Persisted document format with legacy migration
//! - Markdown parser for bulk imports

pub mod document;
pub mod error;
pub mod level;
pub mod parser;
pub mod progression;
pub mod recency;
pub mod selector;
pub mod settings;
pub mod stats;
pub mod store;
pub mod types;

pub use document::{decode, encode, DocumentFormat, LoadReport, Snapshot};
pub use error::{ParseError, Result, StoreError};
pub use level::{DrawChances, Level};
pub use parser::parse;
pub use progression::{Outcome, Transition};
pub use recency::{RecencyWindow, DEFAULT_RECENCY_CAPACITY};
pub use selector::{Draw, Selector};
pub use settings::SamplingSettings;
pub use stats::{FolderStats, LevelCounts, Stats};
pub use store::{CardStore, Folder, FolderGroup, FolderScope, DEFAULT_FOLDER};
pub use types::{Card, CardEdit, CardId, CardImage, CardLocation, ImageEdit, RawCard};
