//! Height probe: throttled size tracking of one element.
//!
//! The probe decides *whether* a platform observation should exist and on
//! which node; the platform performs the actual `ResizeObserver` (or polling)
//! registration and feeds raw rects back through [`HeightProbe::observe`].
//! Rapid resizes coalesce through a trailing-edge [`Throttle`], so observers
//! see at most one notification per interval carrying the latest size.

use web_time::{Duration, Instant};

use crate::schedule::Throttle;
use crate::timer::TimerQueue;
use crate::types::{MeasuredRect, NodeKey, Retarget};

/// How the platform should watch the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProbeStrategy {
    /// Continuous resize observation (polling where unavailable).
    #[default]
    ResizeObserver,
    /// Measure once when attached, then only on explicit re-measure.
    OneShot,
}

#[derive(Clone, Debug)]
pub struct HeightProbe<K> {
    target: Option<NodeKey>,
    attached: Option<NodeKey>,
    enabled: bool,
    strategy: ProbeStrategy,
    rect: MeasuredRect,
    throttle: Throttle<K, MeasuredRect>,
}

impl<K: Clone + PartialEq> HeightProbe<K> {
    /// Create an idle probe. `key` names the probe's throttle timer.
    pub fn new(key: K, interval: Duration, strategy: ProbeStrategy) -> Self {
        Self {
            target: None,
            attached: None,
            enabled: false,
            strategy,
            rect: MeasuredRect::ZERO,
            throttle: Throttle::new(key, interval),
        }
    }

    pub fn strategy(&self) -> ProbeStrategy {
        self.strategy
    }

    /// Last coalesced measurement. `{0,0}` while there is no target.
    pub fn rect(&self) -> MeasuredRect {
        self.rect
    }

    /// Node the platform observation is currently attached to.
    pub fn attached(&self) -> Option<NodeKey> {
        self.attached
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn timer_key(&self) -> &K {
        self.throttle.key()
    }

    /// Point the probe at a (possibly different) node.
    pub fn set_target(&mut self, timers: &mut TimerQueue<K>, target: Option<NodeKey>) -> Retarget {
        self.target = target;
        if target.is_none() {
            self.rect = MeasuredRect::ZERO;
        }
        self.reconcile(timers)
    }

    pub fn set_enabled(&mut self, timers: &mut TimerQueue<K>, enabled: bool) -> Retarget {
        self.enabled = enabled;
        self.reconcile(timers)
    }

    fn reconcile(&mut self, timers: &mut TimerQueue<K>) -> Retarget {
        let desired = if self.enabled { self.target } else { None };
        let change = Retarget::between(self.attached, desired);
        if change.detached().is_some() {
            // Values measured on the old node are stale for the new one.
            self.throttle.cancel(timers);
        }
        self.attached = desired;
        change
    }

    /// Feed a raw measurement from the platform.
    ///
    /// Ignored unless attached to `node`; a late callback from a node we
    /// already moved away from must not leak into the new target's rect.
    pub fn observe(
        &mut self,
        timers: &mut TimerQueue<K>,
        now: Instant,
        node: NodeKey,
        rect: MeasuredRect,
    ) {
        if self.attached != Some(node) {
            return;
        }
        self.throttle.request(timers, now, rect);
    }

    /// Handle this probe's throttle timer firing.
    ///
    /// Returns the new rect if it differs from the last one.
    pub fn fire(&mut self) -> Option<MeasuredRect> {
        let rect = self.throttle.fire()?;
        self.commit(rect)
    }

    /// Record an immediate measurement, bypassing the throttle.
    ///
    /// Used for one-shot measurement at attach time.
    pub fn measured_now(&mut self, node: NodeKey, rect: MeasuredRect) -> Option<MeasuredRect> {
        if self.attached != Some(node) {
            return None;
        }
        self.commit(rect)
    }

    fn commit(&mut self, rect: MeasuredRect) -> Option<MeasuredRect> {
        if rect == self.rect {
            return None;
        }
        self.rect = rect;
        Some(rect)
    }

    /// Detach and drop any pending measurement.
    pub fn teardown(&mut self, timers: &mut TimerQueue<K>) -> Retarget {
        self.enabled = false;
        self.target = None;
        self.rect = MeasuredRect::ZERO;
        self.reconcile(timers)
    }
}
