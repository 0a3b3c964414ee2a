//! Application state.

use chrono::{DateTime, Utc};
use practice_core::document::LoadReport;
use practice_core::{CardStore, Draw, RecencyWindow, SamplingSettings, Selector};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::Result;
use crate::storage::{MirrorStatus, MirrorTracker, Persistence, SaveReport};

/// A completed local save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Saved {
    pub saved_at: DateTime<Utc>,
    pub bytes_written: usize,
}

/// One practice session: the loaded document plus everything the selector
/// needs between draws.
pub struct AppState {
    pub store: CardStore,
    pub settings: SamplingSettings,
    pub recency: RecencyWindow,
    pub selector: Selector,
    /// Folders the selector draws from; empty means every folder.
    pub active_folders: Vec<String>,
    /// Card shown to the user and awaiting an outcome.
    pub current: Option<Draw>,
    pub load_report: LoadReport,
    pub(crate) rng: StdRng,
    persistence: Box<dyn Persistence>,
    mirror: MirrorTracker,
}

impl AppState {
    /// Load the document and start a fresh session.
    pub fn open(persistence: Box<dyn Persistence>, recency_capacity: usize) -> Self {
        let (snapshot, load_report) = persistence.load();
        tracing::info!(
            folders = snapshot.store.folders().len(),
            cards = snapshot.store.len(),
            "loaded practice data"
        );

        Self {
            store: snapshot.store,
            settings: snapshot.settings,
            recency: RecencyWindow::new(recency_capacity),
            selector: Selector::default(),
            active_folders: Vec::new(),
            current: None,
            load_report,
            rng: StdRng::from_entropy(),
            mirror: MirrorTracker::new(persistence.mirror_enabled()),
            persistence,
        }
    }

    /// Replace the random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Write the current store and settings.
    ///
    /// The cloud upload, if any, carries on in the background; its outcome
    /// shows up in [`AppState::mirror_status`].
    pub fn persist(&mut self) -> Result<Saved> {
        let SaveReport {
            saved_at,
            bytes_written,
            mirror,
        } = self.persistence.save(&self.store, &self.settings)?;
        self.mirror.track(mirror);
        Ok(Saved {
            saved_at,
            bytes_written,
        })
    }

    pub fn mirror_status(&mut self) -> MirrorStatus {
        self.mirror.status()
    }

    /// Block until the latest upload has finished.
    pub fn flush_mirror(&mut self) -> MirrorStatus {
        self.mirror.wait()
    }

    /// Point the current draw at wherever its card lives now.
    ///
    /// Clears it when the card no longer exists.
    pub(crate) fn refresh_current(&mut self) {
        let Some(draw) = self.current.take() else {
            return;
        };
        self.current = self.store.locate(draw.card.id).and_then(|location| {
            let card = self.store.card_at(&location)?.clone();
            Some(Draw { location, card })
        });
    }
}
