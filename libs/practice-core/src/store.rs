//! In-memory card store: folder -> level -> ordered cards.
//!
//! Folder names may contain `/` to suggest nesting ("Spanish/Verbs"); the
//! store itself stays flat and only [`FolderGroup`] interprets the separator.

use crate::error::{Result, StoreError};
use crate::level::Level;
use crate::types::{Card, CardEdit, CardId, CardImage, CardLocation, RawCard};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the folder that always exists.
pub const DEFAULT_FOLDER: &str = "All Cards";

/// Separator used for display nesting of folder names.
pub const FOLDER_SEPARATOR: char = '/';

/// Cards of one folder, one sequence per level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Folder {
    #[serde(rename = "level_1", default)]
    learning: Vec<Card>,
    #[serde(rename = "level_2", default)]
    familiar: Vec<Card>,
    #[serde(rename = "level_3", default)]
    confident: Vec<Card>,
    #[serde(rename = "level_4", default)]
    mastered: Vec<Card>,
}

impl Folder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self, level: Level) -> &[Card] {
        match level {
            Level::Learning => &self.learning,
            Level::Familiar => &self.familiar,
            Level::Confident => &self.confident,
            Level::Mastered => &self.mastered,
        }
    }

    pub(crate) fn cards_mut(&mut self, level: Level) -> &mut Vec<Card> {
        match level {
            Level::Learning => &mut self.learning,
            Level::Familiar => &mut self.familiar,
            Level::Confident => &mut self.confident,
            Level::Mastered => &mut self.mastered,
        }
    }

    pub fn len(&self) -> usize {
        Level::ALL.into_iter().map(|level| self.cards(level).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(level, index, card)` over every card, bottom level first.
    pub fn iter(&self) -> impl Iterator<Item = (Level, usize, &Card)> {
        Level::ALL.into_iter().flat_map(move |level| {
            self.cards(level)
                .iter()
                .enumerate()
                .map(move |(index, card)| (level, index, card))
        })
    }

    fn position(&self, id: CardId) -> Option<(Level, usize)> {
        self.iter()
            .find(|(_, _, card)| card.id == id)
            .map(|(level, index, _)| (level, index))
    }

    /// Move every card into Learning, keeping level-by-level order.
    fn reset(&mut self) {
        let mut all = std::mem::take(&mut self.learning);
        all.append(&mut self.familiar);
        all.append(&mut self.confident);
        all.append(&mut self.mastered);
        self.learning = all;
    }

    fn clear(&mut self) {
        for level in Level::ALL {
            self.cards_mut(level).clear();
        }
    }
}

/// Which folders a bulk operation touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "name")]
pub enum FolderScope {
    All,
    Folder(String),
}

/// Folder names sharing a top-level prefix, for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderGroup {
    pub root: String,
    pub folders: Vec<String>,
}

/// Top-level segment of a folder name.
pub fn folder_root(name: &str) -> &str {
    name.split(FOLDER_SEPARATOR).next().unwrap_or(name)
}

/// Last segment of a folder name.
pub fn folder_leaf(name: &str) -> &str {
    name.rsplit(FOLDER_SEPARATOR).next().unwrap_or(name)
}

/// Nesting depth implied by the separator (0 for top-level names).
pub fn folder_depth(name: &str) -> usize {
    name.matches(FOLDER_SEPARATOR).count()
}

/// All cards of the session, keyed by folder name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardStore {
    folders: BTreeMap<String, Folder>,
}

impl Default for CardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CardStore {
    /// Empty store holding only the default folder.
    pub fn new() -> Self {
        let mut folders = BTreeMap::new();
        folders.insert(DEFAULT_FOLDER.to_string(), Folder::new());
        Self { folders }
    }

    /// Build from already-validated folders, restoring the default folder.
    pub fn from_folders(folders: BTreeMap<String, Folder>) -> Self {
        let mut store = Self { folders };
        store.ensure_default();
        store
    }

    fn ensure_default(&mut self) {
        self.folders
            .entry(DEFAULT_FOLDER.to_string())
            .or_default();
    }

    pub fn folders(&self) -> &BTreeMap<String, Folder> {
        &self.folders
    }

    pub fn folder(&self, name: &str) -> Option<&Folder> {
        self.folders.get(name)
    }

    pub fn folder_names(&self) -> Vec<String> {
        self.folders.keys().cloned().collect()
    }

    pub fn contains_folder(&self, name: &str) -> bool {
        self.folders.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.folders.values().map(Folder::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn card(&self, folder: &str, level: Level, index: usize) -> Option<&Card> {
        self.folders.get(folder)?.cards(level).get(index)
    }

    pub fn card_at(&self, location: &CardLocation) -> Option<&Card> {
        self.card(&location.folder, location.level, location.index)
    }

    /// Find a card anywhere in the store by id.
    pub fn locate(&self, id: CardId) -> Option<CardLocation> {
        self.folders.iter().find_map(|(name, folder)| {
            folder
                .position(id)
                .map(|(level, index)| CardLocation::new(name.clone(), level, index))
        })
    }

    /// Folder names grouped by their top-level segment.
    pub fn folder_groups(&self) -> Vec<FolderGroup> {
        let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for name in self.folders.keys() {
            groups.entry(folder_root(name)).or_default().push(name.clone());
        }
        groups
            .into_iter()
            .map(|(root, folders)| FolderGroup {
                root: root.to_string(),
                folders,
            })
            .collect()
    }

    /// Add a card at the bottom level of `folder`, creating the folder if needed.
    pub fn add_card(
        &mut self,
        folder: &str,
        question: &str,
        answer: &str,
        question_image: Option<CardImage>,
        answer_image: Option<CardImage>,
    ) -> Result<CardLocation> {
        let folder = normalize_folder_name(folder)?;
        let card = validated_card(question, answer, question_image, answer_image)?;
        Ok(self.push_card(&folder, Level::BOTTOM, card))
    }

    /// Add parsed cards to `folder`; returns how many were added.
    pub fn import_cards(&mut self, folder: &str, cards: &[RawCard]) -> Result<usize> {
        let folder = normalize_folder_name(folder)?;
        let mut imported = 0;
        for raw in cards {
            if let Some(card) = Card::new(&raw.question, &raw.answer, None, None) {
                self.push_card(&folder, Level::BOTTOM, card);
                imported += 1;
            }
        }
        Ok(imported)
    }

    fn push_card(&mut self, folder: &str, level: Level, card: Card) -> CardLocation {
        let cards = self
            .folders
            .entry(folder.to_string())
            .or_default()
            .cards_mut(level);
        cards.push(card);
        CardLocation::new(folder, level, cards.len() - 1)
    }

    /// Remove and return the card at `location`.
    pub fn delete_card(&mut self, folder: &str, level: Level, index: usize) -> Result<Card> {
        let cards = self.bucket_mut(folder, level)?;
        if index >= cards.len() {
            return Err(card_not_found(folder, level, index));
        }
        Ok(cards.remove(index))
    }

    /// Replace text and apply image edits in place.
    pub fn edit_card(
        &mut self,
        folder: &str,
        level: Level,
        index: usize,
        edit: CardEdit,
    ) -> Result<&Card> {
        let question = edit.question.trim();
        let answer = edit.answer.trim();
        if question.is_empty() {
            return Err(StoreError::EmptyQuestion);
        }
        if answer.is_empty() {
            return Err(StoreError::EmptyAnswer);
        }
        let (question, answer) = (question.to_string(), answer.to_string());

        let card = self
            .bucket_mut(folder, level)?
            .get_mut(index)
            .ok_or_else(|| card_not_found(folder, level, index))?;
        card.question = question;
        card.answer = answer;
        edit.question_image.apply(&mut card.question_image);
        edit.answer_image.apply(&mut card.answer_image);
        Ok(card)
    }

    /// Move a card to another folder, keeping its level.
    pub fn move_card_to_folder(
        &mut self,
        src: &str,
        level: Level,
        index: usize,
        dst: &str,
    ) -> Result<CardLocation> {
        let dst = normalize_folder_name(dst)?;
        let len = self.bucket_mut(src, level)?.len();
        if index >= len {
            return Err(card_not_found(src, level, index));
        }
        if src == dst {
            return Ok(CardLocation::new(dst, level, index));
        }
        let card = self.bucket_mut(src, level)?.remove(index);
        Ok(self.push_card(&dst, level, card))
    }

    /// Move a card between levels of the same folder, appending at the end.
    pub(crate) fn relocate(&mut self, location: &CardLocation, to: Level) -> Result<CardLocation> {
        let cards = self.bucket_mut(&location.folder, location.level)?;
        if location.index >= cards.len() {
            return Err(card_not_found(&location.folder, location.level, location.index));
        }
        let card = cards.remove(location.index);
        Ok(self.push_card(&location.folder, to, card))
    }

    /// Put every card in scope back into Learning.
    pub fn reset(&mut self, scope: &FolderScope) -> Result<usize> {
        let mut moved = 0;
        for folder in self.scoped_mut(scope)? {
            moved += folder.len() - folder.cards(Level::Learning).len();
            folder.reset();
        }
        Ok(moved)
    }

    /// Empty every level of the folders in scope; folders themselves stay.
    pub fn delete_all_cards(&mut self, scope: &FolderScope) -> Result<usize> {
        let mut removed = 0;
        for folder in self.scoped_mut(scope)? {
            removed += folder.len();
            folder.clear();
        }
        Ok(removed)
    }

    pub fn create_folder(&mut self, name: &str) -> Result<String> {
        let name = normalize_folder_name(name)?;
        if self.folders.contains_key(&name) {
            return Err(StoreError::FolderExists(name));
        }
        self.folders.insert(name.clone(), Folder::new());
        Ok(name)
    }

    pub fn rename_folder(&mut self, old: &str, new: &str) -> Result<String> {
        let new = normalize_folder_name(new)?;
        if old == DEFAULT_FOLDER {
            return Err(StoreError::ProtectedFolder(old.to_string()));
        }
        if !self.folders.contains_key(old) {
            return Err(StoreError::FolderNotFound(old.to_string()));
        }
        if self.folders.contains_key(&new) {
            return Err(StoreError::FolderExists(new));
        }
        if let Some(folder) = self.folders.remove(old) {
            self.folders.insert(new.clone(), folder);
        }
        Ok(new)
    }

    /// Delete a folder together with its cards.
    pub fn delete_folder(&mut self, name: &str) -> Result<Folder> {
        if name == DEFAULT_FOLDER {
            return Err(StoreError::ProtectedFolder(name.to_string()));
        }
        self.folders
            .remove(name)
            .ok_or_else(|| StoreError::FolderNotFound(name.to_string()))
    }

    fn bucket_mut(&mut self, folder: &str, level: Level) -> Result<&mut Vec<Card>> {
        self.folders
            .get_mut(folder)
            .map(|f| f.cards_mut(level))
            .ok_or_else(|| StoreError::FolderNotFound(folder.to_string()))
    }

    fn scoped_mut(&mut self, scope: &FolderScope) -> Result<Vec<&mut Folder>> {
        match scope {
            FolderScope::All => Ok(self.folders.values_mut().collect()),
            FolderScope::Folder(name) => self
                .folders
                .get_mut(name)
                .map(|folder| vec![folder])
                .ok_or_else(|| StoreError::FolderNotFound(name.clone())),
        }
    }
}

fn normalize_folder_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(StoreError::EmptyFolderName)
    } else {
        Ok(trimmed.to_string())
    }
}

fn validated_card(
    question: &str,
    answer: &str,
    question_image: Option<CardImage>,
    answer_image: Option<CardImage>,
) -> Result<Card> {
    if question.trim().is_empty() {
        return Err(StoreError::EmptyQuestion);
    }
    Card::new(question, answer, question_image, answer_image).ok_or(StoreError::EmptyAnswer)
}

fn card_not_found(folder: &str, level: Level, index: usize) -> StoreError {
    StoreError::CardNotFound {
        folder: folder.to_string(),
        level,
        index,
    }
}
