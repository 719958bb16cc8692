//! Time capability
//!
//! The one row of the platform abstraction that stays injectable in a Rust
//! rendition: session expiry and tool timing read the clock through this
//! trait so tests can drive time by hand instead of sleeping. Everything
//! else the original platform record carried (allocator, threads, mutexes,
//! sockets) is covered by the runtime and is not abstracted again.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Millisecond/microsecond wall clock
pub trait Clock: Send + Sync + fmt::Debug {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> u64;

    /// Microseconds since the Unix epoch
    fn now_micros(&self) -> u64;
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// The operating-system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// A shared handle to the system clock
    pub fn shared() -> SharedClock {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn now_micros(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0)
    }
}

/// A hand-driven clock for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    /// Create a manual clock starting at the given millisecond timestamp
    pub fn starting_at_millis(millis: u64) -> Arc<Self> {
        Arc::new(Self {
            micros: AtomicU64::new(millis * 1_000),
        })
    }

    /// Advance the clock by the given number of milliseconds
    pub fn advance_millis(&self, millis: u64) {
        self.micros.fetch_add(millis * 1_000, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.micros.load(Ordering::SeqCst) / 1_000
    }

    fn now_micros(&self) -> u64 {
        self.micros.load(Ordering::SeqCst)
    }
}
