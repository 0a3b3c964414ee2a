//! Practice session commands.

use practice_core::{progression, Draw, Outcome, Transition};

use crate::error::{AppError, CommandError};
use crate::state::AppState;

#[derive(Debug, serde::Serialize)]
pub struct OutcomeResponse {
    pub transition: Transition,
    pub message: String,
}

/// Draw the next card to practice, or `None` when no active folder has cards.
pub fn next_card(state: &mut AppState) -> Option<Draw> {
    let draw = state.selector.draw(
        &state.store,
        &state.active_folders,
        &state.settings,
        &mut state.recency,
        &mut state.rng,
    );
    state.current = draw.clone();
    draw
}

/// The card currently shown, if any.
pub fn current_card(state: &AppState) -> Option<Draw> {
    state.current.clone()
}

/// Record the user's self-assessment for the current card and save.
pub fn report_outcome(state: &mut AppState, correct: bool) -> Result<OutcomeResponse, CommandError> {
    let draw = state.current.take().ok_or(AppError::NoCurrentCard)?;
    let outcome = Outcome::from_correct(correct);

    let transition = match progression::apply(&mut state.store, &draw.location, draw.card.id, outcome) {
        Ok(transition) => transition,
        Err(e) => {
            state.current = Some(draw);
            return Err(e.into());
        }
    };
    state.persist()?;

    Ok(OutcomeResponse {
        message: feedback(&transition),
        transition,
    })
}

fn feedback(transition: &Transition) -> String {
    match transition {
        Transition::Promoted { to, .. } => format!("Moved to '{}' level!", to.name()),
        Transition::AlreadyMastered { .. } => "Already at highest level - Mastered!".to_string(),
        Transition::Demoted { .. } => "Moved back to Learning level. Keep practicing!".to_string(),
        Transition::KeepPracticing { .. } => "Keep practicing! Same question next time.".to_string(),
    }
}
