//! Simulated hardware timestamp
//!
//! The board counts 32 ns clock ticks in a 24-bit register. The simulator
//! derives the register value from a monotonic clock on every read, so it is
//! a function of elapsed time rather than of how many events were generated:
//! two reads less than one tick apart return the same value, and the counter
//! wraps every 2^24 * 32 ns (about 536.9 ms).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::common::{CLOCK_PERIOD_NS, TIMESTAMP_MAX};

/// Monotonic time source in nanoseconds since an arbitrary epoch
pub trait MonotonicClock: Send + Sync {
    fn now_ns(&self) -> u64;
}

/// Steady clock measuring from the moment it was created
#[derive(Debug, Clone, Copy)]
pub struct SteadyClock {
    origin: Instant,
}

impl SteadyClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SteadyClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SteadyClock {
    fn now_ns(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(pub u64);

impl MonotonicClock for FixedClock {
    fn now_ns(&self) -> u64 {
        self.0
    }
}

/// Manually advanced clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(start_ns: u64) -> Self {
        Self(Arc::new(AtomicU64::new(start_ns)))
    }

    pub fn advance(&self, ns: u64) {
        self.0.fetch_add(ns, Ordering::Relaxed);
    }

    pub fn set(&self, ns: u64) {
        self.0.store(ns, Ordering::Relaxed);
    }
}

impl MonotonicClock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Convert nanoseconds into the 24-bit tick counter value
#[inline]
pub fn ticks_from_ns(ns: u64) -> u32 {
    ((ns / CLOCK_PERIOD_NS) & TIMESTAMP_MAX as u64) as u32
}

/// 24-bit wrapping timestamp source
pub struct TimestampSimulator {
    clock: Box<dyn MonotonicClock>,
}

impl TimestampSimulator {
    /// Simulator driven by a fresh [`SteadyClock`]
    pub fn new() -> Self {
        Self::with_clock(SteadyClock::new())
    }

    /// Simulator driven by a custom clock
    pub fn with_clock(clock: impl MonotonicClock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }

    /// Current counter value, in `0..=TIMESTAMP_MAX`
    pub fn next_timestamp(&self) -> u32 {
        ticks_from_ns(self.clock.now_ns())
    }
}

impl Default for TimestampSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TimestampSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampSimulator")
            .field("now_ns", &self.clock.now_ns())
            .finish()
    }
}
