//! Bounded lookup of the primary content node.
//!
//! The editing framework creates its content node asynchronously, so the
//! first query may come back empty. A lookup makes one immediate attempt and
//! then retries on a fixed interval up to a limit, ending in a definite
//! `Found` or `Exhausted` state instead of polling forever.

use web_time::{Duration, Instant};

use crate::timer::TimerQueue;
use crate::types::NodeKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupState {
    Idle,
    Searching { attempts: u32 },
    Found(NodeKey),
    Exhausted,
}

/// What the caller should do after an attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The node was located (possibly a replacement for the previous one).
    Found(NodeKey),
    /// Not there yet; a retry timer is armed.
    Retrying,
    /// Gave up; the previously known node (if any) is forgotten.
    Exhausted,
}

#[derive(Clone, Debug)]
pub struct ContentLookup<K> {
    state: LookupState,
    current: Option<NodeKey>,
    key: K,
    retry: Duration,
    max_attempts: u32,
}

impl<K: Clone + PartialEq> ContentLookup<K> {
    pub fn new(key: K, retry: Duration, max_attempts: u32) -> Self {
        Self {
            state: LookupState::Idle,
            current: None,
            key,
            retry,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn state(&self) -> LookupState {
        self.state
    }

    /// The last node found. Survives a restarted search until it resolves.
    pub fn current(&self) -> Option<NodeKey> {
        self.current
    }

    pub fn timer_key(&self) -> &K {
        &self.key
    }

    /// Begin a fresh search. The caller makes the first attempt right away.
    pub fn start(&mut self, timers: &mut TimerQueue<K>) {
        timers.cancel(&self.key);
        self.state = LookupState::Searching { attempts: 0 };
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.state, LookupState::Searching { .. })
    }

    /// Record the result of one query.
    pub fn record_attempt(
        &mut self,
        timers: &mut TimerQueue<K>,
        now: Instant,
        result: Option<NodeKey>,
    ) -> LookupOutcome {
        let attempts = match self.state {
            LookupState::Searching { attempts } => attempts + 1,
            _ => 1,
        };

        if let Some(node) = result {
            timers.cancel(&self.key);
            self.state = LookupState::Found(node);
            self.current = Some(node);
            return LookupOutcome::Found(node);
        }

        if attempts < self.max_attempts {
            self.state = LookupState::Searching { attempts };
            timers.schedule(self.key.clone(), now, self.retry);
            LookupOutcome::Retrying
        } else {
            timers.cancel(&self.key);
            self.state = LookupState::Exhausted;
            self.current = None;
            LookupOutcome::Exhausted
        }
    }

    /// Stop searching and forget the node.
    pub fn cancel(&mut self, timers: &mut TimerQueue<K>) {
        timers.cancel(&self.key);
        self.state = LookupState::Idle;
        self.current = None;
    }
}
