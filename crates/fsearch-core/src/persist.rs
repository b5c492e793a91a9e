//! Debounced state persistence.
//!
//! Every state change rearms two timers: a short save window that batches
//! rapid typing into one durable write, and a long idle window that forgets
//! the remembered query once the user has clearly moved on. Both are
//! deadline-based and polled with an injected clock, so ticks are cheap and
//! tests are deterministic.

use fsearch_types::{SearchState, StatePatch};
use std::time::{Duration, Instant};
use tracing::debug;

pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(1000);
pub const IDLE_RESET: Duration = Duration::from_secs(30);

/// A trailing-edge debouncer: `trigger` (re)arms the deadline, `fire_due`
/// reports and disarms once it passes.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// What a persistence tick decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistEvents {
    /// The batched state should be written out now.
    pub save: bool,
    /// The idle window elapsed and the remembered query was cleared.
    pub idle_reset: bool,
}

pub struct StatePersistence {
    state: SearchState,
    save: Debouncer,
    idle: Debouncer,
}

impl StatePersistence {
    #[must_use]
    pub fn new(initial: SearchState) -> Self {
        Self {
            state: initial,
            save: Debouncer::new(SAVE_DEBOUNCE),
            idle: Debouncer::new(IDLE_RESET),
        }
    }

    #[must_use]
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    #[must_use]
    pub fn save_pending(&self) -> bool {
        self.save.is_armed()
    }

    /// Fold a partial update into the remembered state and rearm both
    /// timers.
    pub fn update(&mut self, patch: &StatePatch, now: Instant) {
        if patch.is_empty() {
            return;
        }
        self.state.apply(patch);
        self.save.trigger(now);
        self.idle.trigger(now);
    }

    /// Record the modal's final state wholesale when it closes.
    pub fn record_close(&mut self, final_state: &SearchState, now: Instant) {
        self.update(&final_state.as_patch(), now);
    }

    /// Poll both timers. An idle reset clears only the query; every other
    /// preference survives, and the cleared query is itself scheduled for a
    /// save.
    pub fn tick(&mut self, now: Instant) -> PersistEvents {
        let mut events = PersistEvents::default();
        if self.idle.fire_due(now) && !self.state.query.is_empty() {
            debug!("idle window elapsed, forgetting remembered query");
            self.state.query.clear();
            self.save.trigger(now);
            events.idle_reset = true;
        }
        events.save = self.save.fire_due(now);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsearch_types::SortOrder;

    fn patch_query(q: &str) -> StatePatch {
        StatePatch::query(q)
    }

    #[test]
    fn test_debouncer_rearm_extends_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        debouncer.trigger(start);
        debouncer.trigger(start + Duration::from_millis(900));
        assert!(!debouncer.fire_due(start + Duration::from_millis(1500)));
        assert!(debouncer.fire_due(start + Duration::from_millis(1900)));
        assert!(!debouncer.is_armed());
    }

    #[test]
    fn test_rapid_updates_collapse_to_one_save() {
        let start = Instant::now();
        let mut persist = StatePersistence::new(SearchState::default());

        let mut at = start;
        for q in ["n", "ne", "nee", "need"] {
            persist.update(&patch_query(q), at);
            at += Duration::from_millis(100);
        }
        assert_eq!(persist.tick(start + Duration::from_millis(800)), PersistEvents::default());

        let events = persist.tick(start + Duration::from_millis(1400));
        assert!(events.save);
        assert_eq!(persist.state().query, "need");

        // nothing further fires
        let events = persist.tick(start + Duration::from_secs(2));
        assert!(!events.save);
    }

    #[test]
    fn test_idle_reset_clears_only_query() {
        let start = Instant::now();
        let mut persist = StatePersistence::new(SearchState::default());

        let mut patch = patch_query("needle");
        patch.matching_case = Some(true);
        patch.sort_order = Some(SortOrder::ByCreatedTime);
        persist.update(&patch, start);
        persist.tick(start + Duration::from_secs(2));

        let events = persist.tick(start + IDLE_RESET + Duration::from_secs(1));
        assert!(events.idle_reset);
        assert_eq!(persist.state().query, "");
        assert!(persist.state().matching_case);
        assert_eq!(persist.state().sort_order, SortOrder::ByCreatedTime);

        // the cleared query gets its own durable write
        assert!(persist.save_pending());
    }

    #[test]
    fn test_idle_reset_noop_on_empty_query() {
        let start = Instant::now();
        let mut persist = StatePersistence::new(SearchState::default());
        persist.update(&StatePatch { collapse_all: Some(true), ..StatePatch::default() }, start);
        persist.tick(start + Duration::from_secs(2));

        let events = persist.tick(start + IDLE_RESET + Duration::from_secs(1));
        assert!(!events.idle_reset);
    }

    #[test]
    fn test_record_close_captures_full_state() {
        let start = Instant::now();
        let mut persist = StatePersistence::new(SearchState::default());

        let final_state = SearchState {
            query: "final".to_string(),
            collapse_all: true,
            ..SearchState::default()
        };
        persist.record_close(&final_state, start);
        assert_eq!(persist.state().query, "final");
        assert!(persist.state().collapse_all);
        assert!(persist.save_pending());
    }

    #[test]
    fn test_empty_patch_does_not_arm() {
        let start = Instant::now();
        let mut persist = StatePersistence::new(SearchState::default());
        persist.update(&StatePatch::default(), start);
        assert!(!persist.save_pending());
    }
}
