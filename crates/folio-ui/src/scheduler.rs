//! Deterministic timers.
//!
//! Fixed delays (settle, pause, host hide/reveal) are deferred events, never
//! blocking waits. The scheduler owns a virtual clock that the runtime
//! advances once per frame.

use std::collections::BTreeMap;
use std::time::Duration;

/// Scheduling order; breaks ties between timers due at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Seq(u64);

/// Timer queue ordered by due time, then by scheduling order.
#[derive(Debug)]
pub struct Scheduler<E> {
    now: Duration,
    next: u64,
    queue: BTreeMap<(Duration, Seq), E>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Deliver `event` once `delay` has elapsed from now.
    pub fn schedule(&mut self, delay: Duration, event: E) {
        self.next += 1;
        self.queue.insert((self.now + delay, Seq(self.next)), event);
    }

    /// Move the clock forward and return every event now due, in order.
    pub fn advance(&mut self, dt: Duration) -> Vec<E> {
        self.now += dt;
        let later = self.queue.split_off(&(self.now, Seq(u64::MAX)));
        let due = std::mem::replace(&mut self.queue, later);
        due.into_values().collect()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
