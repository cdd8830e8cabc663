//! Injectable wall-clock so Confirmer/Updater ticks are deterministic in tests.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

/// A source of unix time, injected into every component that stamps
/// `first_seen` or compares ages against it.
pub trait Clock: Send + Sync + 'static {
    fn now_unix(&self) -> u64;
}

/// Real wall-clock, backed by `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_secs()
    }
}

/// A settable clock for deterministic tests.
#[derive(Debug, Default)]
pub struct TestClock {
    now: AtomicU64,
}

impl TestClock {
    pub fn new(now_unix: u64) -> Self {
        Self { now: AtomicU64::new(now_unix) }
    }

    pub fn set(&self, now_unix: u64) {
        self.now.store(now_unix, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now_unix(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
