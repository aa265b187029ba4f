// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Wall-clock time as seen by the decision logic.
//!
//! Hazard records carry float timestamps in seconds. Controllers read them from a [Clock]
//! so that aging can be driven deterministically in tests via [ManualClock].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time in seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

/// Clock handle shared between a node's stages
pub type SharedClock = Arc<dyn Clock>;

/// Seconds since the UNIX epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        // A system clock before 1970 is reported as the epoch itself
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self(Arc::new(AtomicU64::new(start.to_bits())))
    }

    pub fn set(&self, now: f64) {
        self.0.store(now.to_bits(), Ordering::Release);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new(10.0);
        let other = clock.clone();
        clock.advance(2.5);
        assert_eq!(other.now(), 12.5);
        other.set(0.0);
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn system_clock_is_past_epoch() {
        assert!(SystemClock.now() > 1_600_000_000.0);
    }
}
