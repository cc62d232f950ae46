// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Counting join barrier.
//!
//! `add` raises or lowers the counter, `wait` blocks until it reaches zero.
//! Every waiter blocked at the moment of a zero transition is released.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::trace;

use crate::error::TaskError;

#[derive(Debug, Default)]
pub struct JoinBarrier {
    count: Mutex<i64>,
    zero: Condvar,
}

impl JoinBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjust the counter by `delta`. Fails, leaving the counter unchanged,
    /// if the result would be negative.
    pub fn add(&self, delta: i64) -> Result<(), TaskError> {
        let mut count = self.count.lock();
        let next = count
            .checked_add(delta)
            .filter(|n| *n >= 0)
            .ok_or(TaskError::NegativeCounter { count: *count, delta })?;
        *count = next;
        trace!(count = next, delta, "join barrier adjusted");
        if next == 0 {
            self.zero.notify_all();
        }
        Ok(())
    }

    pub fn done(&self) -> Result<(), TaskError> {
        self.add(-1)
    }

    /// Block until the counter is zero. Returns immediately if it already is.
    pub fn wait(&self) {
        let mut count = self.count.lock();
        while *count != 0 {
            self.zero.wait(&mut count);
        }
    }

    /// Like `wait`, giving up after `timeout`. Returns whether the counter
    /// reached zero.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.count.lock();
        while *count != 0 {
            if self.zero.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }

    pub fn count(&self) -> i64 {
        *self.count.lock()
    }
}
