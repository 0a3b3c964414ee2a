//! Weighted draw of the next card to practice.
//!
//! A draw picks a folder by folder weight, then a level by draw chance, then
//! a card of that bucket that is not in the recency window. Empty buckets
//! are retried a bounded number of times before falling back to a uniform
//! choice over every active card, so a draw only comes back empty when no
//! active folder holds any card.

use crate::level::{DrawChances, Level};
use crate::recency::RecencyWindow;
use crate::settings::SamplingSettings;
use crate::store::{CardStore, Folder};
use crate::types::{Card, CardLocation};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// One selected card and where it lives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Draw {
    pub location: CardLocation,
    pub card: Card,
}

/// Card sampler with a configurable retry budget.
#[derive(Debug, Clone)]
pub struct Selector {
    pub retry_budget: usize,
}

impl Default for Selector {
    fn default() -> Self {
        Self { retry_budget: 10 }
    }
}

impl Selector {
    /// Draw the next card from `active` folders (all folders when empty).
    ///
    /// The chosen card is recorded in `recency`.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        store: &CardStore,
        active: &[String],
        settings: &SamplingSettings,
        recency: &mut RecencyWindow,
        rng: &mut R,
    ) -> Option<Draw> {
        let folders = active_folders(store, active);
        if folders.is_empty() {
            return None;
        }

        let weights: Vec<f64> = folders
            .iter()
            .map(|(name, _)| settings.folder_weight(name))
            .collect();
        let chances = settings.draw_chances.normalized();

        for _ in 0..self.retry_budget {
            let (name, folder) = folders[pick_weighted(&weights, rng)];
            let level = pick_level(&chances, rng);
            let cards = folder.cards(level);
            if cards.is_empty() {
                continue;
            }
            let index = pick_card(cards, recency, rng);
            return Some(finish(name, level, index, &cards[index], recency));
        }

        tracing::debug!(
            retries = self.retry_budget,
            "weighted draw hit only empty buckets, falling back to uniform choice"
        );
        fallback(&folders, recency, rng)
    }
}

fn active_folders<'a>(store: &'a CardStore, active: &[String]) -> Vec<(&'a str, &'a Folder)> {
    if active.is_empty() {
        return store
            .folders()
            .iter()
            .map(|(name, folder)| (name.as_str(), folder))
            .collect();
    }
    let mut folders: Vec<(&str, &Folder)> = Vec::with_capacity(active.len());
    for name in active {
        if let Some((key, folder)) = store.folders().get_key_value(name.as_str()) {
            if !folders.iter().any(|(seen, _)| *seen == key.as_str()) {
                folders.push((key.as_str(), folder));
            }
        }
    }
    folders
}

/// Index chosen proportionally to `weights`.
///
/// Weights that are not strictly positive are never picked, unless all of
/// them are, in which case the choice is uniform.
fn pick_weighted<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    let usable = |w: f64| w.is_finite() && w > 0.0;
    let total: f64 = weights.iter().copied().filter(|w| usable(*w)).sum();
    if total <= 0.0 {
        return rng.gen_range(0..weights.len());
    }

    let point = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_usable = 0;
    for (index, weight) in weights.iter().copied().enumerate() {
        if !usable(weight) {
            continue;
        }
        cumulative += weight;
        last_usable = index;
        if point < cumulative {
            return index;
        }
    }
    last_usable
}

/// Walk the levels bottom to top accumulating chance mass.
fn pick_level<R: Rng + ?Sized>(chances: &DrawChances, rng: &mut R) -> Level {
    let point = rng.gen::<f64>();
    let mut cumulative = 0.0;
    for level in Level::ALL {
        let chance = chances.get(level);
        if chance <= 0.0 {
            continue;
        }
        cumulative += chance;
        if cumulative >= point {
            return level;
        }
    }
    Level::TOP
}

/// Uniform choice preferring cards outside the recency window.
fn pick_card<R: Rng + ?Sized>(cards: &[Card], recency: &RecencyWindow, rng: &mut R) -> usize {
    let fresh: Vec<usize> = (0..cards.len())
        .filter(|&index| !recency.contains(cards[index].id))
        .collect();
    if fresh.is_empty() {
        rng.gen_range(0..cards.len())
    } else {
        fresh[rng.gen_range(0..fresh.len())]
    }
}

fn fallback<R: Rng + ?Sized>(
    folders: &[(&str, &Folder)],
    recency: &mut RecencyWindow,
    rng: &mut R,
) -> Option<Draw> {
    let candidates: Vec<(&str, Level, usize, &Card)> = folders
        .iter()
        .flat_map(|(name, folder)| {
            folder
                .iter()
                .map(move |(level, index, card)| (*name, level, index, card))
        })
        .collect();

    let fresh: Vec<&(&str, Level, usize, &Card)> = candidates
        .iter()
        .filter(|(_, _, _, card)| !recency.contains(card.id))
        .collect();

    let chosen = if fresh.is_empty() {
        candidates.choose(rng)
    } else {
        fresh.choose(rng).copied()
    };

    let (name, level, index, card) = *chosen?;
    Some(finish(name, level, index, card, recency))
}

fn finish(
    folder: &str,
    level: Level,
    index: usize,
    card: &Card,
    recency: &mut RecencyWindow,
) -> Draw {
    recency.record(card.id);
    tracing::debug!(folder, %level, index, card = %card.id, "drew card");
    Draw {
        location: CardLocation::new(folder, level, index),
        card: card.clone(),
    }
}
