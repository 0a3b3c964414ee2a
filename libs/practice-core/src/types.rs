//! Core types for the practice application.

use crate::level::Level;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Stable opaque card identifier, assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Uuid);

impl CardId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CardId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque image payload, persisted as standard base64.
#[derive(Clone, PartialEq, Eq)]
pub struct CardImage(Vec<u8>);

impl CardImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        BASE64.decode(encoded.trim()).map(Self)
    }
}

impl fmt::Debug for CardImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardImage({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for CardImage {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for CardImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for CardImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

/// A question/answer flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub question: String,
    pub answer: String,
    pub question_image: Option<CardImage>,
    pub answer_image: Option<CardImage>,
}

impl Card {
    /// Build a card from untrimmed input.
    ///
    /// Returns None when the question or the answer is blank.
    pub fn new(
        question: &str,
        answer: &str,
        question_image: Option<CardImage>,
        answer_image: Option<CardImage>,
    ) -> Option<Self> {
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() || answer.is_empty() {
            return None;
        }
        Some(Self {
            id: CardId::new(),
            question: question.to_string(),
            answer: answer.to_string(),
            question_image,
            answer_image,
        })
    }

    /// Short single-line preview of the question.
    pub fn preview(&self, max_chars: usize) -> String {
        let line = self.question.lines().next().unwrap_or_default();
        if line.chars().count() <= max_chars {
            line.to_string()
        } else {
            let cut: String = line.chars().take(max_chars).collect();
            format!("{cut}...")
        }
    }
}

/// Edit instruction for one image field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "image")]
pub enum ImageEdit {
    #[default]
    Keep,
    Clear,
    Replace(CardImage),
}

impl ImageEdit {
    pub fn apply(self, slot: &mut Option<CardImage>) {
        match self {
            Self::Keep => {}
            Self::Clear => *slot = None,
            Self::Replace(image) => *slot = Some(image),
        }
    }
}

/// Full edit of a card's content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CardEdit {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub question_image: ImageEdit,
    #[serde(default)]
    pub answer_image: ImageEdit,
}

impl CardEdit {
    /// Text-only edit that keeps both images.
    pub fn text(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            ..Default::default()
        }
    }
}

/// Position of a card inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardLocation {
    pub folder: String,
    pub level: Level,
    pub index: usize,
}

impl CardLocation {
    pub fn new(folder: impl Into<String>, level: Level, index: usize) -> Self {
        Self {
            folder: folder.into(),
            level,
            index,
        }
    }
}

/// Card parsed from markdown, not yet placed in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCard {
    pub question: String,
    pub answer: String,
    pub line_number: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_card_trims_text() {
        let card = Card::new("  What is 2+2? ", "\n4\n", None, None).unwrap();
        assert_eq!(card.question, "What is 2+2?");
        assert_eq!(card.answer, "4");
    }

    #[test]
    fn blank_question_or_answer_is_rejected() {
        assert!(Card::new("   ", "answer", None, None).is_none());
        assert!(Card::new("question", "\t", None, None).is_none());
    }

    #[test]
    fn image_serializes_as_base64() {
        let image = CardImage::new(vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(json, "\"3q2+7w==\"");
        let back: CardImage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn image_edit_three_ways() {
        let original = Some(CardImage::new(vec![1]));

        let mut slot = original.clone();
        ImageEdit::Keep.apply(&mut slot);
        assert_eq!(slot, original);

        ImageEdit::Replace(CardImage::new(vec![2])).apply(&mut slot);
        assert_eq!(slot, Some(CardImage::new(vec![2])));

        ImageEdit::Clear.apply(&mut slot);
        assert_eq!(slot, None);
    }

    #[test]
    fn card_edit_from_json_defaults_to_keep() {
        let edit: CardEdit = serde_json::from_str(
            r#"{"question":"q","answer":"a","answer_image":{"action":"replace","image":"AQI="}}"#,
        )
        .unwrap();
        assert_eq!(edit.question_image, ImageEdit::Keep);
        assert_eq!(edit.answer_image, ImageEdit::Replace(CardImage::new(vec![1, 2])));

        let clear: ImageEdit = serde_json::from_str(r#"{"action":"clear"}"#).unwrap();
        assert_eq!(clear, ImageEdit::Clear);
    }

    #[test]
    fn preview_truncates_long_questions() {
        let card = Card::new("abcdefghij\nsecond line", "x", None, None).unwrap();
        assert_eq!(card.preview(4), "abcd...");
        assert_eq!(card.preview(50), "abcdefghij");
    }
}
