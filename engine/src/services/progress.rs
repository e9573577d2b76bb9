//! Progress sink passed through the analysis context (`spec.md` §9).
//!
//! Progress writes are lock-free atomic increments; a separate rendering
//! task (owned by the embedding CLI, out of scope here) samples them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub trait ProgressSink: Send + Sync {
    fn tick(&self);
    fn set_total(&self, total: u64);
}

#[derive(Default)]
pub struct AtomicProgress {
    done: AtomicU64,
    total: AtomicU64,
}

impl AtomicProgress {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl ProgressSink for AtomicProgress {
    fn tick(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }
}

/// No-op sink for analyzer calls made without a caller-supplied progress
/// context (e.g. library tests).
#[derive(Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn tick(&self) {}
    fn set_total(&self, _total: u64) {}
}
