// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

use std::time::{Duration, Instant};

/// Periodic deadline on the monotonic clock
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period: Duration,
    next: Instant,
}

impl Interval {
    /// First due one `period` after `now`
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next: now + period,
        }
    }

    /// First due at `now`
    pub fn immediate(period: Duration, now: Instant) -> Self {
        Self { period, next: now }
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Returns whether the interval was due at `now` and, if so, re-arms it.
    ///
    /// Missed periods are not caught up on.
    pub fn fire(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + self.period;
        true
    }
}

/// Earliest of the given deadlines
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}
