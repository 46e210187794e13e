//! Minimum-interval request spacing per adapter.
//!
//! Each call reserves the next free slot for its adapter and sleeps until the
//! slot opens, so concurrent callers queue up instead of bursting.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

/// Per-adapter minimum spacing between calls.
#[derive(Default)]
pub struct RequestSpacer {
    /// Earliest instant the next call to each adapter may start.
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl RequestSpacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the slots mutex, recovering from poison if necessary.
    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.next_slot.lock().unwrap_or_else(|poisoned| {
            warn!("Request spacer mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Reserve a slot for `adapter` and wait until it opens.
    pub async fn acquire(&self, adapter: &str, spacing: Duration) {
        if spacing.is_zero() {
            return;
        }

        let wait = {
            let mut slots = self.lock_slots();
            let now = Instant::now();
            let slot = slots.get(adapter).copied().unwrap_or(now).max(now);
            slots.insert(adapter.to_string(), slot + spacing);
            slot - now
        };

        if !wait.is_zero() {
            debug!("Request spacer: waiting {:?} for '{}'", wait, adapter);
            tokio::time::sleep(wait).await;
        }
    }

    /// Push the next slot of `adapter` back by `penalty`.
    ///
    /// Called after the upstream pushed back (rate limit, timeout).
    pub fn penalize(&self, adapter: &str, penalty: Duration) {
        if penalty.is_zero() {
            return;
        }
        let mut slots = self.lock_slots();
        let now = Instant::now();
        let slot = slots.get(adapter).copied().unwrap_or(now).max(now);
        slots.insert(adapter.to_string(), slot + penalty);
        debug!("Request spacer: penalized '{}' by {:?}", adapter, penalty);
    }

    /// Time until the next call to `adapter` may start.
    pub fn time_until_available(&self, adapter: &str) -> Duration {
        let slots = self.lock_slots();
        let now = Instant::now();
        slots
            .get(adapter)
            .map(|slot| slot.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }
}
