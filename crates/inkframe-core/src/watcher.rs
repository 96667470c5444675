//! Mutation watcher: debounced DOM change detection on two subtrees.
//!
//! The container slot catches structural changes (nodes inserted or removed,
//! style/class flips). The content slot watches the primary content node with
//! `characterData` so in-place text edits that keep the element structure are
//! seen too. Each slot debounces separately.

use web_time::{Duration, Instant};

use crate::schedule::Debounce;
use crate::timer::TimerQueue;
use crate::types::{NodeKey, Retarget, WatchTarget};

/// Which mutation kinds a platform observer must subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MutationOptions {
    pub child_list: bool,
    pub subtree: bool,
    pub attributes: bool,
    pub character_data: bool,
    /// Restrict attribute mutations to these names. Empty means all.
    pub attribute_filter: &'static [&'static str],
}

impl MutationOptions {
    pub const CONTAINER: MutationOptions = MutationOptions {
        child_list: true,
        subtree: true,
        attributes: true,
        character_data: false,
        attribute_filter: &["style", "class"],
    };

    pub const CONTENT: MutationOptions = MutationOptions {
        child_list: true,
        subtree: true,
        attributes: true,
        character_data: true,
        attribute_filter: &[],
    };

    pub fn for_target(target: WatchTarget) -> MutationOptions {
        match target {
            WatchTarget::Container => MutationOptions::CONTAINER,
            WatchTarget::Content => MutationOptions::CONTENT,
        }
    }
}

#[derive(Clone, Debug)]
struct Slot<K> {
    attached: Option<NodeKey>,
    debounce: Debounce<K>,
}

impl<K: Clone + PartialEq> Slot<K> {
    fn new(key: K, delay: Duration) -> Self {
        Self {
            attached: None,
            debounce: Debounce::new(key, delay),
        }
    }

    fn retarget(&mut self, timers: &mut TimerQueue<K>, node: Option<NodeKey>) -> Retarget {
        let change = Retarget::between(self.attached, node);
        if change.detached().is_some() {
            self.debounce.cancel(timers);
        }
        self.attached = node;
        change
    }
}

#[derive(Clone, Debug)]
pub struct MutationWatcher<K> {
    container: Slot<K>,
    content: Slot<K>,
}

impl<K: Clone + PartialEq> MutationWatcher<K> {
    /// `*_key` name the debounce timers; `*_delay` are the debounce windows.
    pub fn new(container_key: K, container_delay: Duration, content_key: K, content_delay: Duration) -> Self {
        Self {
            container: Slot::new(container_key, container_delay),
            content: Slot::new(content_key, content_delay),
        }
    }

    fn slot(&self, target: WatchTarget) -> &Slot<K> {
        match target {
            WatchTarget::Container => &self.container,
            WatchTarget::Content => &self.content,
        }
    }

    fn slot_mut(&mut self, target: WatchTarget) -> &mut Slot<K> {
        match target {
            WatchTarget::Container => &mut self.container,
            WatchTarget::Content => &mut self.content,
        }
    }

    pub fn attached(&self, target: WatchTarget) -> Option<NodeKey> {
        self.slot(target).attached
    }

    pub fn timer_key(&self, target: WatchTarget) -> &K {
        self.slot(target).debounce.key()
    }

    /// Number of slots with a live platform observer.
    pub fn active_observers(&self) -> usize {
        [&self.container, &self.content]
            .iter()
            .filter(|s| s.attached.is_some())
            .count()
    }

    /// Move a slot's observer to `node` (or detach it with `None`).
    pub fn retarget(
        &mut self,
        timers: &mut TimerQueue<K>,
        target: WatchTarget,
        node: Option<NodeKey>,
    ) -> Retarget {
        self.slot_mut(target).retarget(timers, node)
    }

    /// Record a mutation reported by the platform observer on `node`.
    ///
    /// Returns whether the debounce was (re)armed.
    pub fn observed(
        &mut self,
        timers: &mut TimerQueue<K>,
        now: Instant,
        target: WatchTarget,
        node: NodeKey,
    ) -> bool {
        let slot = self.slot(target);
        if slot.attached != Some(node) {
            return false;
        }
        slot.debounce.request(timers, now);
        true
    }

    /// Detach both slots and cancel their debounces.
    pub fn disable(&mut self, timers: &mut TimerQueue<K>) -> [(WatchTarget, Retarget); 2] {
        [
            (WatchTarget::Container, self.container.retarget(timers, None)),
            (WatchTarget::Content, self.content.retarget(timers, None)),
        ]
    }
}
