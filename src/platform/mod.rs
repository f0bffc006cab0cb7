//! Platform abstraction layer
//!
//! The simulation only needs a monotonic millisecond timestamp per tick.
//! Hosts supply one through [`Clock`].

use std::time::Instant;

/// Monotonic millisecond source
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by [`Instant`], zeroed at construction
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Explicitly advanced clock for tests and scripted sessions
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn starting_at(now_ms: u64) -> Self {
        Self { now: now_ms }
    }

    pub fn advance(&mut self, ms: u64) -> u64 {
        self.now += ms;
        self.now
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }
}
