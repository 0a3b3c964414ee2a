//! Folder management commands.

use practice_core::store::{folder_depth, folder_leaf};
use practice_core::FolderGroup;

use crate::error::CommandError;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FolderSummary {
    pub name: String,
    /// Last path segment, for indented display.
    pub label: String,
    pub depth: usize,
    pub card_count: usize,
    pub weight: f64,
    pub active: bool,
}

/// List every folder with its card count and sampling weight.
pub fn list_folders(state: &AppState) -> Vec<FolderSummary> {
    state
        .store
        .folders()
        .iter()
        .map(|(name, folder)| FolderSummary {
            name: name.clone(),
            label: folder_leaf(name).to_string(),
            depth: folder_depth(name),
            card_count: folder.len(),
            weight: state.settings.folder_weight(name),
            active: state.active_folders.is_empty() || state.active_folders.contains(name),
        })
        .collect()
}

/// Folder names grouped by their top-level segment.
pub fn list_folder_groups(state: &AppState) -> Vec<FolderGroup> {
    state.store.folder_groups()
}

pub fn create_folder(state: &mut AppState, name: &str) -> Result<String, CommandError> {
    let name = state.store.create_folder(name)?;
    state.persist()?;
    Ok(name)
}

/// Rename a folder; its sampling weight and active flag follow it.
pub fn rename_folder(state: &mut AppState, old: &str, new: &str) -> Result<String, CommandError> {
    let new = state.store.rename_folder(old, new)?;
    state.settings.rename_folder(old, &new);
    for active in state.active_folders.iter_mut().filter(|name| name.as_str() == old) {
        *active = new.clone();
    }
    state.refresh_current();
    state.persist()?;
    tracing::info!(%old, %new, "renamed folder");
    Ok(new)
}

/// Delete a folder and its cards. Returns how many cards were removed.
pub fn delete_folder(state: &mut AppState, name: &str) -> Result<usize, CommandError> {
    let folder = state.store.delete_folder(name)?;
    for (_, _, card) in folder.iter() {
        state.recency.forget(card.id);
    }
    state.settings.remove_folder(name);
    state.active_folders.retain(|active| active != name);
    state.refresh_current();
    state.persist()?;
    tracing::info!(%name, cards = folder.len(), "deleted folder");
    Ok(folder.len())
}

/// Choose the folders to practice from. Unknown names are dropped; an empty
/// selection means every folder.
pub fn set_active_folders(state: &mut AppState, folders: Vec<String>) -> Vec<String> {
    let mut active: Vec<String> = Vec::new();
    for name in folders {
        if state.store.contains_folder(&name) && !active.contains(&name) {
            active.push(name);
        }
    }
    state.active_folders = active;
    state.active_folders.clone()
}
