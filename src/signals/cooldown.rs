//! Per-instrument cooldown after entry signals.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Whether an instrument may currently emit an entry signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownState {
    Evaluable,
    CoolingDown { until: DateTime<Utc> },
}

/// Instrument -> timestamp of its last entry signal.
///
/// Check and update happen under one lock, so two concurrent entries for the
/// same instrument cannot both pass.
#[derive(Debug)]
pub struct CooldownTracker {
    window: Duration,
    last_entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl CooldownTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        // The map holds plain timestamps; a panic elsewhere cannot leave it torn.
        self.last_entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cooling(&self, last: Option<&DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        last.is_some_and(|last| now - *last < self.window)
    }

    pub fn is_cooling_down(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        self.cooling(self.entries().get(symbol), now)
    }

    pub fn state(&self, symbol: &str, now: DateTime<Utc>) -> CooldownState {
        match self.entries().get(symbol) {
            Some(last) if self.cooling(Some(last), now) => CooldownState::CoolingDown {
                until: *last + self.window,
            },
            _ => CooldownState::Evaluable,
        }
    }

    pub fn last_entry(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.entries().get(symbol).copied()
    }

    /// Record an entry at `now` unless the instrument is still cooling down.
    /// Returns whether the entry was accepted.
    pub fn try_record_entry(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries();
        if self.cooling(entries.get(symbol), now) {
            return false;
        }
        entries.insert(symbol.to_string(), now);
        true
    }
}
