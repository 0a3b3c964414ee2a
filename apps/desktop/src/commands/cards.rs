//! Card-related commands.

use practice_core::{parser, Card, CardEdit, CardImage, CardLocation, FolderScope, Level};
use std::fs;
use std::path::Path;

use crate::error::CommandError;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct AddCardRequest {
    pub folder: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub question_image: Option<CardImage>,
    #[serde(default)]
    pub answer_image: Option<CardImage>,
}

#[derive(Debug, serde::Serialize)]
pub struct ImportResult {
    pub imported: usize,
    pub folder: String,
}

/// Add a card to the Learning level of a folder.
pub fn add_card(state: &mut AppState, request: AddCardRequest) -> Result<CardLocation, CommandError> {
    let location = state.store.add_card(
        &request.folder,
        &request.question,
        &request.answer,
        request.question_image,
        request.answer_image,
    )?;
    state.persist()?;
    Ok(location)
}

/// Delete one card.
pub fn delete_card(
    state: &mut AppState,
    folder: &str,
    level: Level,
    index: usize,
) -> Result<Card, CommandError> {
    let card = state.store.delete_card(folder, level, index)?;
    state.recency.forget(card.id);
    state.refresh_current();
    state.persist()?;
    Ok(card)
}

/// Change a card's text and images in place.
pub fn edit_card(
    state: &mut AppState,
    folder: &str,
    level: Level,
    index: usize,
    edit: CardEdit,
) -> Result<Card, CommandError> {
    let card = state.store.edit_card(folder, level, index, edit)?.clone();
    state.refresh_current();
    state.persist()?;
    Ok(card)
}

/// Move a card to another folder, keeping its level.
pub fn move_card(
    state: &mut AppState,
    folder: &str,
    level: Level,
    index: usize,
    destination: &str,
) -> Result<CardLocation, CommandError> {
    let location = state
        .store
        .move_card_to_folder(folder, level, index, destination)?;
    state.refresh_current();
    state.persist()?;
    Ok(location)
}

/// Send every card in scope back to Learning. Returns how many cards moved.
pub fn reset_cards(state: &mut AppState, scope: FolderScope) -> Result<usize, CommandError> {
    let moved = state.store.reset(&scope)?;
    state.refresh_current();
    state.persist()?;
    tracing::info!(?scope, moved, "reset cards to Learning");
    Ok(moved)
}

/// Remove every card in scope; folders are kept.
pub fn delete_all_cards(state: &mut AppState, scope: FolderScope) -> Result<usize, CommandError> {
    let removed = state.store.delete_all_cards(&scope)?;
    if scope == FolderScope::All {
        state.recency.clear();
    }
    state.refresh_current();
    state.persist()?;
    tracing::info!(?scope, removed, "deleted cards");
    Ok(removed)
}

/// Import `Q:`/`A:` markdown into a folder.
pub fn import_markdown(
    state: &mut AppState,
    folder: &str,
    content: &str,
) -> Result<ImportResult, CommandError> {
    let raw_cards = parser::parse(content)?;
    let imported = state.store.import_cards(folder, &raw_cards)?;
    state.persist()?;

    Ok(ImportResult {
        imported,
        folder: folder.trim().to_string(),
    })
}

/// Import a markdown file; the folder defaults to the file name.
pub fn import_file(
    state: &mut AppState,
    file_path: &str,
    folder: Option<&str>,
) -> Result<ImportResult, CommandError> {
    let path = Path::new(file_path);
    let content = fs::read_to_string(path)?;

    // Derive folder from file name
    let folder = folder.map(str::to_string).unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Imported")
            .to_string()
    });

    import_markdown(state, &folder, &content)
}
