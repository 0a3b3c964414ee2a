//! User-adjustable sampling settings.

use crate::level::DrawChances;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weight used for folders without an explicit entry.
pub const DEFAULT_FOLDER_WEIGHT: f64 = 1.0;

/// Draw chances per level and weights per folder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SamplingSettings {
    #[serde(default)]
    pub draw_chances: DrawChances,
    #[serde(default)]
    pub folder_weights: BTreeMap<String, f64>,
}

impl SamplingSettings {
    /// Weight of a folder, defaulting to 1.0.
    pub fn folder_weight(&self, folder: &str) -> f64 {
        self.folder_weights
            .get(folder)
            .copied()
            .unwrap_or(DEFAULT_FOLDER_WEIGHT)
    }

    /// Set a folder weight; negative and non-finite values become 0.
    pub fn set_folder_weight(&mut self, folder: impl Into<String>, weight: f64) {
        self.folder_weights.insert(folder.into(), clamp_weight(weight));
    }

    /// Move a folder's explicit weight to a new name.
    ///
    /// Whatever was stored under `new` is discarded, so a folder without a
    /// weight keeps the default after the rename.
    pub fn rename_folder(&mut self, old: &str, new: &str) {
        if old == new {
            return;
        }
        self.folder_weights.remove(new);
        if let Some(weight) = self.folder_weights.remove(old) {
            self.folder_weights.insert(new.to_string(), weight);
        }
    }

    pub fn remove_folder(&mut self, folder: &str) {
        self.folder_weights.remove(folder);
    }

    /// Form written to disk: chances summing to one, weights non-negative.
    pub fn normalized(&self) -> Self {
        Self {
            draw_chances: self.draw_chances.normalized(),
            folder_weights: self
                .folder_weights
                .iter()
                .map(|(name, weight)| (name.clone(), clamp_weight(*weight)))
                .collect(),
        }
    }
}

fn clamp_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}
