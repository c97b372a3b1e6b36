// Alert engine - novelty detection over filtered candidates and the
// Idle/Active alert lifecycle.

use log::info;

use super::model::{AlertState, AlertedSighting};
use super::seen::{SeenCache, SEEN_CAPACITY};
use crate::core::model::Sighting;

/// How many history rows are ever handed to the presentation layer.
pub const HISTORY_DISPLAY_LIMIT: usize = 50;

/// Owns the seen cache, the current alert, and the alert history.
///
/// `evaluate` is the only path that arms an alert; `reset_alert` and
/// `expire_alert` are the only paths that clear one. None of them touch the
/// seen cache after insertion, so a dismissed alert can never re-fire for
/// the same sighting key.
pub struct AlertEngine {
    seen: SeenCache,
    state: AlertState,
    history: Vec<AlertedSighting>,
    /// Bumped on every Idle -> Active transition. Dwell timers remember the
    /// value they were started with and only expire their own alert.
    alert_seq: u64,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self {
            seen: SeenCache::new(SEEN_CAPACITY),
            state: AlertState::Idle,
            history: Vec::new(),
            alert_seq: 0,
        }
    }

    /// Scan candidates in input order and fire on the first whose key is not
    /// in the seen cache. First unseen wins; there is no re-ranking.
    ///
    /// Returns the annotated sighting when an alert fired, None when every
    /// candidate was already seen (in which case nothing is mutated).
    pub fn evaluate(&mut self, candidates: &[Sighting]) -> Option<AlertedSighting> {
        let fresh = candidates.iter().find(|s| !self.seen.contains(&s.key()))?;

        let alerted = AlertedSighting::annotate(fresh);
        info!(
            "new {} impling on world {} at ({}, {})",
            alerted.kind.display_name(),
            fresh.world,
            fresh.x,
            fresh.y
        );

        self.seen.insert(fresh.key());
        self.alert_seq += 1;
        self.state = AlertState::Active(alerted.clone());
        self.history.push(alerted.clone());
        Some(alerted)
    }

    /// Sequence number of the most recent alert. 0 until the first fires.
    pub fn alert_seq(&self) -> u64 {
        self.alert_seq
    }

    pub fn active_alert(&self) -> Option<&AlertedSighting> {
        self.state.active()
    }

    /// Manual dismissal. The sighting key stays in the seen cache.
    pub fn reset_alert(&mut self) {
        self.state = AlertState::Idle;
    }

    /// Dwell expiry for the alert with sequence number `seq`. Returns true
    /// if an alert was cleared; a stale `seq` (the alert was already reset,
    /// or a newer one replaced it) is a no-op.
    pub fn expire_alert(&mut self, seq: u64) -> bool {
        if seq == self.alert_seq && self.state.is_active() {
            self.state = AlertState::Idle;
            true
        } else {
            false
        }
    }

    /// The most recent alerts, newest first, capped for display.
    pub fn recent_history(&self) -> Vec<AlertedSighting> {
        self.history
            .iter()
            .rev()
            .take(HISTORY_DISPLAY_LIMIT)
            .cloned()
            .collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alerts::model::ImplingKind;
    use crate::core::model::World;

    fn make_sighting(entity_id: u32, n: i32) -> Sighting {
        Sighting {
            entity_id,
            x: 3000 + n,
            y: 3000 + n,
            world: World::Id(302),
            observed_at: format!("2025-06-01T12:00:00Z#{}", n),
        }
    }

    #[test]
    fn test_first_unseen_wins() {
        let mut engine = AlertEngine::new();
        let a = make_sighting(7233, 0);
        let b = make_sighting(1644, 1);

        let fired = engine.evaluate(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(fired.sighting, a);
        assert_eq!(fired.kind, ImplingKind::Lucky);
        assert!(engine.active_alert().is_some());

        // A is now seen, so the same snapshot alerts on B next tick
        let fired = engine.evaluate(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(fired.sighting, b);
        assert_eq!(fired.kind, ImplingKind::Dragon);
    }

    #[test]
    fn test_all_seen_mutates_nothing() {
        let mut engine = AlertEngine::new();
        let a = make_sighting(7233, 0);
        engine.evaluate(&[a.clone()]).unwrap();
        engine.reset_alert();

        assert!(engine.evaluate(&[a.clone()]).is_none());
        assert!(engine.active_alert().is_none());
        assert_eq!(engine.history_len(), 1);
        assert_eq!(engine.seen_len(), 1);
    }

    #[test]
    fn test_empty_candidates() {
        let mut engine = AlertEngine::new();
        assert!(engine.evaluate(&[]).is_none());
        assert_eq!(engine.alert_seq(), 0);
    }

    #[test]
    fn test_reset_does_not_refire() {
        let mut engine = AlertEngine::new();
        let a = make_sighting(7233, 0);
        engine.evaluate(&[a.clone()]).unwrap();

        engine.reset_alert();
        assert!(engine.active_alert().is_none());

        // Dismissed alert must not re-trigger for the same key on a later tick
        assert!(engine.evaluate(&[a]).is_none());
    }

    #[test]
    fn test_stale_dwell_expiry_ignored() {
        let mut engine = AlertEngine::new();
        engine.evaluate(&[make_sighting(7233, 0)]).unwrap();
        let first_seq = engine.alert_seq();

        // A second alert replaces the first before its dwell timer fires
        engine.evaluate(&[make_sighting(1644, 1)]).unwrap();
        assert!(!engine.expire_alert(first_seq));
        assert!(engine.active_alert().is_some());

        assert!(engine.expire_alert(engine.alert_seq()));
        assert!(engine.active_alert().is_none());

        // Expiring twice is a no-op
        assert!(!engine.expire_alert(engine.alert_seq()));
    }

    #[test]
    fn test_history_newest_first_and_capped() {
        let mut engine = AlertEngine::new();
        for n in 0..60 {
            engine.evaluate(&[make_sighting(7233, n)]).unwrap();
        }
        assert_eq!(engine.history_len(), 60);

        let recent = engine.recent_history();
        assert_eq!(recent.len(), HISTORY_DISPLAY_LIMIT);
        assert_eq!(recent[0].sighting.x, 3000 + 59);
        assert_eq!(recent[HISTORY_DISPLAY_LIMIT - 1].sighting.x, 3000 + 10);
    }
}
