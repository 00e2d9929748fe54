//! [`ManualClock`], a clock that only moves when the test says so.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use agora::clock::Clock;
use agora::types::Timestamp;

/// A manually stepped [`Clock`]. Clones share the same underlying time: tests keep one clone and
/// hand the other to the engine, then call [`set`](ManualClock::set) to walk the engine across
/// round boundaries deterministically.
#[derive(Clone)]
pub(crate) struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub(crate) fn new(start: Timestamp) -> ManualClock {
        ManualClock(Arc::new(AtomicU64::new(start)))
    }

    pub(crate) fn set(&self, now: Timestamp) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> Timestamp {
        self.0.load(Ordering::SeqCst)
    }
}
