//! Deterministic timer queue.
//!
//! The core never reads a clock. Callers pass `now` into every operation and
//! the platform layer arms a single real timer for [`TimerQueue::next_deadline`].
//! Keeping every pending timer in one queue makes teardown checkable: an
//! empty queue means nothing is left to fire.

use web_time::{Duration, Instant};

#[derive(Clone, Debug)]
struct Entry<K> {
    deadline: Instant,
    seq: u64,
    key: K,
}

/// Pending timers keyed by `K`. At most one timer per key.
#[derive(Clone, Debug)]
pub struct TimerQueue<K> {
    entries: Vec<Entry<K>>,
    next_seq: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<K: Clone + PartialEq> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` to fire at `deadline`, replacing any pending timer for
    /// the same key.
    pub fn schedule_at(&mut self, key: K, deadline: Instant) {
        self.cancel(&key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { deadline, seq, key });
    }

    /// Schedule `key` to fire `delay` after `now`.
    pub fn schedule(&mut self, key: K, now: Instant, delay: Duration) {
        self.schedule_at(key, now + delay);
    }

    /// Schedule `key` only if it is not already pending.
    ///
    /// Returns whether a new timer was armed.
    pub fn schedule_if_absent(&mut self, key: K, now: Instant, delay: Duration) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.schedule(key, now, delay);
        true
    }

    /// Cancel the timer for `key`. Returns whether one was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.key != key);
        before != self.entries.len()
    }

    /// Cancel every timer matching `pred`.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&K) -> bool) {
        self.entries.retain(|e| !pred(&e.key));
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|e| &e.key == key)
    }

    pub fn deadline_of(&self, key: &K) -> Option<Instant> {
        self.entries
            .iter()
            .find(|e| &e.key == key)
            .map(|e| e.deadline)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Remove and return the earliest timer due at `now`.
    ///
    /// Timers with equal deadlines fire in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<K> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| (e.deadline, e.seq))
            .map(|(idx, _)| idx)?;
        Some(self.entries.swap_remove(idx).key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
