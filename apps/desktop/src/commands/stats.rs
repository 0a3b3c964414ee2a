//! Statistics commands.

use practice_core::{FolderScope, Stats};

use crate::error::CommandError;
use crate::state::AppState;

/// Card counts per level for one folder or for all of them.
pub fn get_stats(state: &AppState, scope: FolderScope) -> Result<Stats, CommandError> {
    state.store.stats(&scope).map_err(Into::into)
}
