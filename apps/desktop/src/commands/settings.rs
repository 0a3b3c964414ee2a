//! Sampling settings and explicit save commands.

use chrono::{DateTime, Utc};
use practice_core::SamplingSettings;

use crate::error::CommandError;
use crate::state::AppState;
use crate::storage::MirrorStatus;

#[derive(Debug, serde::Serialize)]
pub struct SaveResponse {
    pub saved_at: DateTime<Utc>,
    pub bytes_written: usize,
    pub mirror: MirrorStatus,
}

/// Get the draw chances and folder weights.
pub fn get_sampling_settings(state: &AppState) -> SamplingSettings {
    state.settings.clone()
}

/// Replace the sampling settings; they are stored normalized.
pub fn save_sampling_settings(
    state: &mut AppState,
    settings: SamplingSettings,
) -> Result<SamplingSettings, CommandError> {
    state.settings = settings.normalized();
    state.persist()?;
    Ok(state.settings.clone())
}

/// Restore the baseline draw chances and drop every folder weight.
pub fn reset_sampling_settings(state: &mut AppState) -> Result<SamplingSettings, CommandError> {
    save_sampling_settings(state, SamplingSettings::default())
}

/// Save immediately, e.g. before the application exits.
pub fn save_now(state: &mut AppState) -> Result<SaveResponse, CommandError> {
    let saved = state.persist()?;
    Ok(SaveResponse {
        saved_at: saved.saved_at,
        bytes_written: saved.bytes_written,
        mirror: state.mirror_status(),
    })
}

/// Outcome of the most recent cloud upload.
pub fn mirror_status(state: &mut AppState) -> MirrorStatus {
    state.mirror_status()
}
