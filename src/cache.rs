//! Time-boxed memoization of the most recent diagnosis pass.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::diagnose::GroupedStatus;

/// Time source seam so cache aging is testable without waiting.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Clock backed by the real monotonic clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    data: GroupedStatus,
    fetched_at: Instant,
}

/// Holds the most recent successful pass for the life of the process.
///
/// An entry younger than the window is served as-is; an aged entry is still
/// retained so a failed refresh can fall back on it (stale-serve). Aging is
/// detected lazily on read; nothing runs on a timer.
pub struct StatusCache {
    window: Duration,
    clock: Arc<dyn Clock>,
    entry: Mutex<Option<CacheEntry>>,
}

impl StatusCache {
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            clock,
            entry: Mutex::new(None),
        }
    }

    /// The cached result, only if it is younger than the window.
    pub async fn fresh(&self) -> Option<GroupedStatus> {
        let entry = self.entry.lock().await;
        entry
            .as_ref()
            .filter(|e| self.clock.now().duration_since(e.fetched_at) < self.window)
            .map(|e| e.data.clone())
    }

    /// The cached result regardless of age, for stale-serve.
    pub async fn any(&self) -> Option<GroupedStatus> {
        self.entry.lock().await.as_ref().map(|e| e.data.clone())
    }

    /// Replace the entry with a fresh result, restarting the age window.
    pub async fn store(&self, data: GroupedStatus) {
        let mut entry = self.entry.lock().await;
        *entry = Some(CacheEntry {
            data,
            fetched_at: self.clock.now(),
        });
    }
}
