//! Progress statistics.

use crate::error::{Result, StoreError};
use crate::level::Level;
use crate::store::{CardStore, Folder, FolderScope};
use serde::Serialize;

/// Card counts per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LevelCounts {
    pub learning: usize,
    pub familiar: usize,
    pub confident: usize,
    pub mastered: usize,
}

impl LevelCounts {
    pub fn get(&self, level: Level) -> usize {
        match level {
            Level::Learning => self.learning,
            Level::Familiar => self.familiar,
            Level::Confident => self.confident,
            Level::Mastered => self.mastered,
        }
    }

    pub fn total(&self) -> usize {
        self.learning + self.familiar + self.confident + self.mastered
    }

    fn add_folder(&mut self, folder: &Folder) {
        self.learning += folder.cards(Level::Learning).len();
        self.familiar += folder.cards(Level::Familiar).len();
        self.confident += folder.cards(Level::Confident).len();
        self.mastered += folder.cards(Level::Mastered).len();
    }
}

/// Counts for one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderStats {
    pub name: String,
    pub counts: LevelCounts,
}

/// Progress over a scope of folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub counts: LevelCounts,
    pub total: usize,
    pub folders: Vec<FolderStats>,
}

impl Stats {
    /// True when there is at least one card and every card is Mastered.
    pub fn all_mastered(&self) -> bool {
        self.total > 0 && self.counts.mastered == self.total
    }
}

impl CardStore {
    pub fn stats(&self, scope: &FolderScope) -> Result<Stats> {
        let folders: Vec<(&String, &Folder)> = match scope {
            FolderScope::All => self.folders().iter().collect(),
            FolderScope::Folder(name) => {
                let folder = self
                    .folder(name)
                    .ok_or_else(|| StoreError::FolderNotFound(name.clone()))?;
                vec![(name, folder)]
            }
        };

        let mut counts = LevelCounts::default();
        let folders = folders
            .into_iter()
            .map(|(name, folder)| {
                let mut folder_counts = LevelCounts::default();
                folder_counts.add_folder(folder);
                counts.add_folder(folder);
                FolderStats {
                    name: name.clone(),
                    counts: folder_counts,
                }
            })
            .collect();

        Ok(Stats {
            counts,
            total: counts.total(),
            folders,
        })
    }
}
