//! Shared state primitives for the station loops.
//!
//! The only mutable state shared between threads on a station is the latest
//! snapshot value and the shutdown flag. Both are explicit handles here so
//! no loop ever touches bare shared fields.

use crate::types::SensorSnapshot;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Lock-guarded holder of the station's latest snapshot.
///
/// Single writer per station by convention (the acquisition thread on the
/// producer, the subscriber loop on the consumer); readers copy the value
/// out under the lock.
#[derive(Clone, Default)]
pub struct SnapshotCell {
    inner: Arc<Mutex<SensorSnapshot>>,
}

impl SnapshotCell {
    /// Create a cell holding the all-zero default snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot
    pub fn store(&self, snapshot: SensorSnapshot) {
        *self.inner.lock() = snapshot;
    }

    /// Copy out the current snapshot
    pub fn load(&self) -> SensorSnapshot {
        *self.inner.lock()
    }
}

/// Cooperative shutdown signal consulted at every suspension point.
#[derive(Clone, Default)]
pub struct ShutdownFlag {
    inner: Arc<AtomicBool>,
}

/// Granularity of interruptible sleeps; bounds how long a loop can lag
/// behind a shutdown request.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

impl ShutdownFlag {
    /// Create a flag in the running state
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every loop holding this flag to stop
    pub fn request_stop(&self) {
        self.inner.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested
    pub fn is_stopped(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }

    /// Sleep up to `duration`, returning early once a stop is requested.
    ///
    /// Sleeps in short slices so fixed publish/retry delays never pin a
    /// loop past a shutdown request.
    pub fn sleep_while_running(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.is_stopped() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_starts_at_zero_defaults() {
        let cell = SnapshotCell::new();
        assert_eq!(cell.load(), SensorSnapshot::default());
    }

    #[test]
    fn cell_store_load_round_trip() {
        let cell = SnapshotCell::new();
        let snapshot = SensorSnapshot {
            temperature: 21.5,
            humidity: 55.0,
            ..Default::default()
        };
        cell.store(snapshot);
        assert_eq!(cell.load(), snapshot);
    }

    #[test]
    fn sleep_returns_early_on_stop() {
        let flag = ShutdownFlag::new();
        flag.request_stop();

        let start = Instant::now();
        flag.sleep_while_running(Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
