//! Debounce and throttle over a shared [`TimerQueue`].
//!
//! Both primitives only hold their configuration and pending value; the
//! deadline lives in the caller's queue under the primitive's key, so one
//! queue accounts for every timer a session owns.

use web_time::{Duration, Instant};

use crate::timer::TimerQueue;

/// Trailing debounce: fires `delay` after the most recent request.
#[derive(Clone, Debug)]
pub struct Debounce<K> {
    key: K,
    delay: Duration,
}

impl<K: Clone + PartialEq> Debounce<K> {
    pub fn new(key: K, delay: Duration) -> Self {
        Self { key, delay }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Push the deadline out to `now + delay`.
    pub fn request(&self, timers: &mut TimerQueue<K>, now: Instant) {
        timers.schedule(self.key.clone(), now, self.delay);
    }

    pub fn is_pending(&self, timers: &TimerQueue<K>) -> bool {
        timers.contains(&self.key)
    }

    pub fn cancel(&self, timers: &mut TimerQueue<K>) {
        timers.cancel(&self.key);
    }
}

/// Trailing-edge throttle carrying the most recent value.
///
/// The first request in an idle period opens a window of `interval`. Later
/// requests inside the window only replace the pending value. When the
/// window's timer fires, [`Throttle::fire`] yields the last value exactly
/// once, so a burst always ends with its final state reported.
#[derive(Clone, Debug)]
pub struct Throttle<K, T> {
    key: K,
    interval: Duration,
    pending: Option<T>,
}

impl<K: Clone + PartialEq, T> Throttle<K, T> {
    pub fn new(key: K, interval: Duration) -> Self {
        Self {
            key,
            interval,
            pending: None,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record `value` and open a window if none is open.
    pub fn request(&mut self, timers: &mut TimerQueue<K>, now: Instant, value: T) {
        self.pending = Some(value);
        timers.schedule_if_absent(self.key.clone(), now, self.interval);
    }

    /// Take the pending value. Call when this throttle's key fires.
    pub fn fire(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    pub fn cancel(&mut self, timers: &mut TimerQueue<K>) {
        self.pending = None;
        timers.cancel(&self.key);
    }
}
