// Ties the pieces of one fetch cycle together: filter the snapshot, let the
// alert engine evaluate it, and keep the last feed around for display.
//
// Fetching itself is async and happens outside this type (and outside the
// state lock); a completed snapshot is applied here in one synchronous call,
// so filter -> evaluate -> mutation is atomic with respect to other ticks.

use thiserror::Error;

use super::alerts::engine::AlertEngine;
use super::alerts::filter::{filter_candidates, ExclusionRegion, PURO_PURO};
use super::alerts::model::{AlertedSighting, CategorySelection, ImplingKind};
use super::model::Sighting;
use super::session::SessionController;

/// Rejected category-selection changes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("category selection is locked while a session is active")]
    SessionActive,
    #[error("{0:?} is not a selectable category")]
    NotSelectable(ImplingKind),
}

/// Result of applying one feed snapshot.
pub struct TickOutput {
    /// The alert that fired this cycle, if any.
    pub fired: Option<AlertedSighting>,
}

/// The monitor state: alert engine, session budget, category selection, and
/// the exclusion region. Owned by a single instance behind the app's mutex.
pub struct Monitor {
    engine: AlertEngine,
    session: SessionController,
    selection: CategorySelection,
    region: ExclusionRegion,
    last_feed: Vec<Sighting>,
}

impl Monitor {
    pub fn new() -> Self {
        Self {
            engine: AlertEngine::new(),
            session: SessionController::new(),
            selection: CategorySelection::default(),
            region: PURO_PURO,
            last_feed: Vec::new(),
        }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn selection(&self) -> &CategorySelection {
        &self.selection
    }

    /// Raw snapshot from the most recent completed fetch.
    pub fn last_feed(&self) -> &[Sighting] {
        &self.last_feed
    }

    pub fn active_alert(&self) -> Option<&AlertedSighting> {
        self.engine.active_alert()
    }

    pub fn alert_seq(&self) -> u64 {
        self.engine.alert_seq()
    }

    pub fn recent_history(&self) -> Vec<AlertedSighting> {
        self.engine.recent_history()
    }

    /// Flip a category. Only allowed while no session is running; the
    /// `Unknown` classification bucket is never selectable.
    pub fn toggle_category(&mut self, kind: ImplingKind) -> Result<bool, SelectionError> {
        if self.session.is_active() {
            return Err(SelectionError::SessionActive);
        }
        if !ImplingKind::selectable().contains(&kind) {
            return Err(SelectionError::NotSelectable(kind));
        }
        Ok(self.selection.toggle(kind))
    }

    /// Replace the whole selection (used when loading saved settings).
    pub fn set_selection(&mut self, selection: CategorySelection) -> Result<(), SelectionError> {
        if self.session.is_active() {
            return Err(SelectionError::SessionActive);
        }
        self.selection = selection;
        Ok(())
    }

    /// Start a session. Returns the generation for background tasks.
    /// History and the seen cache deliberately survive across sessions.
    pub fn activate(&mut self, budget_secs: u32) -> u64 {
        self.session.activate(budget_secs)
    }

    pub fn deactivate(&mut self) {
        self.session.deactivate();
    }

    /// Apply one completed feed snapshot: filter, evaluate, remember the raw
    /// feed. Callers must have already discarded snapshots that outlived
    /// their session.
    pub fn tick(&mut self, snapshot: Vec<Sighting>) -> TickOutput {
        let candidates = filter_candidates(&snapshot, &self.selection, &self.region);
        let fired = self.engine.evaluate(&candidates);
        self.last_feed = snapshot;
        TickOutput { fired }
    }

    /// One second of session countdown. True when the budget just expired.
    pub fn tick_countdown(&mut self) -> bool {
        self.session.tick_countdown()
    }

    pub fn reset_alert(&mut self) {
        self.engine.reset_alert();
    }

    /// Dwell expiry for alert `seq`; stale sequence numbers are ignored.
    pub fn expire_alert(&mut self, seq: u64) -> bool {
        self.engine.expire_alert(seq)
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}
