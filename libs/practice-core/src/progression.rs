//! Level transitions after a practice round.
//!
//! A correct answer moves the card one level up; an incorrect answer sends it
//! straight back to the bottom level. Both are no-ops at their boundary and
//! report that distinctly.

use crate::error::{Result, StoreError};
use crate::level::Level;
use crate::store::CardStore;
use crate::types::{CardId, CardLocation};
use serde::{Deserialize, Serialize};

/// Self-assessed result of one practice round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }
}

/// What a transition did to the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    Promoted { from: Level, to: Level, location: CardLocation },
    /// Correct answer on a card that is already at the top level.
    AlreadyMastered { location: CardLocation },
    Demoted { from: Level, location: CardLocation },
    /// Incorrect answer on a card that is already at the bottom level.
    KeepPracticing { location: CardLocation },
}

impl Transition {
    /// Whether the card changed level.
    pub fn moved(&self) -> bool {
        matches!(self, Self::Promoted { .. } | Self::Demoted { .. })
    }

    /// Where the card is after the transition.
    pub fn location(&self) -> &CardLocation {
        match self {
            Self::Promoted { location, .. }
            | Self::AlreadyMastered { location }
            | Self::Demoted { location, .. }
            | Self::KeepPracticing { location } => location,
        }
    }
}

/// Apply `outcome` to the card expected at `location`.
///
/// When the card at `location` no longer carries `id` the card is looked up
/// by id instead.
pub fn apply(
    store: &mut CardStore,
    location: &CardLocation,
    id: CardId,
    outcome: Outcome,
) -> Result<Transition> {
    let location = resolve(store, location, id)?;
    let from = location.level;

    let transition = match outcome {
        Outcome::Correct => match from.next() {
            Some(to) => Transition::Promoted {
                from,
                to,
                location: store.relocate(&location, to)?,
            },
            None => Transition::AlreadyMastered { location },
        },
        Outcome::Incorrect if from == Level::BOTTOM => Transition::KeepPracticing { location },
        Outcome::Incorrect => Transition::Demoted {
            from,
            location: store.relocate(&location, Level::BOTTOM)?,
        },
    };

    tracing::debug!(card = %id, ?outcome, moved = transition.moved(), "applied outcome");
    Ok(transition)
}

fn resolve(store: &CardStore, location: &CardLocation, id: CardId) -> Result<CardLocation> {
    match store.card_at(location) {
        Some(card) if card.id == id => Ok(location.clone()),
        _ => store.locate(id).ok_or_else(|| StoreError::CardNotFound {
            folder: location.folder.clone(),
            level: location.level,
            index: location.index,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_FOLDER;
    use pretty_assertions::assert_eq;

    fn single_card() -> (CardStore, CardLocation, CardId) {
        let mut store = CardStore::new();
        let location = store.add_card(DEFAULT_FOLDER, "q", "a", None, None).unwrap();
        let id = store.card_at(&location).unwrap().id;
        (store, location, id)
    }

    #[test]
    fn correct_climbs_one_level_at_a_time() {
        let (mut store, mut location, id) = single_card();
        for expected in [Level::Familiar, Level::Confident, Level::Mastered] {
            let transition = apply(&mut store, &location, id, Outcome::Correct).unwrap();
            assert!(transition.moved());
            location = transition.location().clone();
            assert_eq!(location.level, expected);
        }
    }

    #[test]
    fn correct_at_top_is_idempotent() {
        let (mut store, location, id) = single_card();
        let location = store.relocate(&location, Level::Mastered).unwrap();
        let before = store.clone();
        for _ in 0..3 {
            let transition = apply(&mut store, &location, id, Outcome::Correct).unwrap();
            assert_eq!(transition, Transition::AlreadyMastered { location: location.clone() });
            assert_eq!(store, before);
        }
    }

    #[test]
    fn incorrect_drops_to_bottom() {
        let (mut store, location, id) = single_card();
        let location = store.relocate(&location, Level::Confident).unwrap();
        let transition = apply(&mut store, &location, id, Outcome::Incorrect).unwrap();
        assert_eq!(
            transition,
            Transition::Demoted {
                from: Level::Confident,
                location: CardLocation::new(DEFAULT_FOLDER, Level::Learning, 0),
            }
        );
    }

    #[test]
    fn incorrect_at_bottom_is_idempotent() {
        let (mut store, location, id) = single_card();
        let before = store.clone();
        for _ in 0..3 {
            let transition = apply(&mut store, &location, id, Outcome::Incorrect).unwrap();
            assert!(!transition.moved());
            assert_eq!(store, before);
        }
    }

    #[test]
    fn promotion_preserves_fields_and_appends() {
        let mut store = CardStore::new();
        let first = store.add_card(DEFAULT_FOLDER, "q1", "a1", None, None).unwrap();
        let first_id = store.card_at(&first).unwrap().id;
        let second = store.add_card(DEFAULT_FOLDER, "q2", "a2", None, None).unwrap();
        let second_id = store.card_at(&second).unwrap().id;
        let snapshot = store.card_at(&second).unwrap().clone();

        apply(&mut store, &first, first_id, Outcome::Correct).unwrap();
        // second card shifted to index 0 after the first one left Learning
        let transition = apply(&mut store, &second, second_id, Outcome::Correct).unwrap();
        let location = transition.location().clone();
        assert_eq!(location, CardLocation::new(DEFAULT_FOLDER, Level::Familiar, 1));
        assert_eq!(store.card_at(&location), Some(&snapshot));
    }

    #[test]
    fn missing_card_is_an_error() {
        let (mut store, location, _) = single_card();
        let result = apply(&mut store, &location, CardId::new(), Outcome::Correct);
        assert!(result.is_err());
    }
}
