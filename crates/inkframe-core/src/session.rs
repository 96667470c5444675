//! Frame session: mode gating, content load cycle, height reporting.
//!
//! One `FrameSession` drives a mounted frame. The platform layer forwards
//! every external event (parent messages, editor callbacks, observer
//! callbacks, timer wake-ups) into it together with the current time, and
//! arms a single wake-up timer for [`FrameSession::next_deadline`].
//!
//! Height tracking is active only while content has settled *and* the mode
//! tracks height (ReadOnly, or Editable with the tracking flag). Every height
//! message re-checks that condition at the moment it is sent, so nothing is
//! emitted before the first settle or after tracking is torn down.

use serde_json::Value;
use web_time::Instant;

use crate::config::FrameConfig;
use crate::error::FrameError;
use crate::height::build_report;
use crate::lookup::{ContentLookup, LookupOutcome};
use crate::message::{HeightEvent, InboundMessage, OutboundMessage};
use crate::platform::FrameHost;
use crate::probe::{HeightProbe, ProbeStrategy};
use crate::schedule::Throttle;
use crate::timer::TimerQueue;
use crate::types::{LoadState, MeasuredRect, Mode, NodeKey, Retarget, WatchTarget};
use crate::watcher::{MutationOptions, MutationWatcher};

/// Every timer a session can own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionTimer {
    Settle,
    /// Reply to the n-th `REQUEST_HEIGHT`.
    HeightRequest(u64),
    ContentRendered,
    ContentChange,
    EditSettle,
    Typing,
    DomMutation,
    ContentMutation,
    ContentProbe,
    ContainerProbe,
    Lookup,
}

/// What an inbound message asked the platform to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Push this content into the editing framework.
    LoadContent(String),
    /// A height reply was scheduled.
    HeightScheduled,
    /// Nothing to do.
    Ignored,
}

pub struct FrameSession<H> {
    host: H,
    config: FrameConfig,
    track_height: bool,
    mounted: bool,

    content: String,
    current_edit_content: String,
    has_content: bool,
    load: LoadState,
    rendered_pending: bool,

    timers: TimerQueue<SessionTimer>,
    content_probe: HeightProbe<SessionTimer>,
    container_probe: HeightProbe<SessionTimer>,
    watcher: MutationWatcher<SessionTimer>,
    lookup: ContentLookup<SessionTimer>,
    typing: Throttle<SessionTimer, HeightEvent>,
    next_request: u64,
}

impl<H: FrameHost> FrameSession<H> {
    pub fn new(host: H, config: FrameConfig) -> Self {
        Self::with_strategy(host, config, ProbeStrategy::ResizeObserver)
    }

    pub fn with_strategy(host: H, config: FrameConfig, strategy: ProbeStrategy) -> Self {
        let t = config.timings.clone();
        Self {
            host,
            track_height: config.track_height,
            mounted: false,
            content: String::new(),
            current_edit_content: String::new(),
            has_content: false,
            load: LoadState::Idle,
            rendered_pending: false,
            timers: TimerQueue::new(),
            content_probe: HeightProbe::new(
                SessionTimer::ContentProbe,
                t.content_probe_throttle(),
                strategy,
            ),
            container_probe: HeightProbe::new(
                SessionTimer::ContainerProbe,
                t.container_probe_throttle(),
                strategy,
            ),
            watcher: MutationWatcher::new(
                SessionTimer::DomMutation,
                t.dom_mutation_debounce(),
                SessionTimer::ContentMutation,
                t.content_mutation_debounce(),
            ),
            lookup: ContentLookup::new(SessionTimer::Lookup, t.lookup_retry(), t.lookup_attempts),
            typing: Throttle::new(SessionTimer::Typing, t.typing_throttle()),
            next_request: 0,
            config,
        }
    }

    // === Accessors ===

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn current_edit_content(&self) -> &str {
        &self.current_edit_content
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn is_content_loaded(&self) -> bool {
        self.load.is_loaded()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether this session tracks height at all in its current mode.
    pub fn tracks_height(&self) -> bool {
        self.config.mode.is_read_only() || self.track_height
    }

    /// Height tracking is live: content settled and mode tracks height.
    pub fn is_tracking_active(&self) -> bool {
        self.mounted && self.load.is_loaded() && self.tracks_height()
    }

    pub fn content_node(&self) -> Option<NodeKey> {
        self.lookup.current()
    }

    pub fn content_rect(&self) -> MeasuredRect {
        self.content_probe.rect()
    }

    pub fn container_rect(&self) -> MeasuredRect {
        self.container_probe.rect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Platform observers (resize and mutation) this session holds open.
    pub fn active_observers(&self) -> usize {
        self.watcher.active_observers()
            + usize::from(self.content_probe.attached().is_some())
            + usize::from(self.container_probe.attached().is_some())
    }

    // === Lifecycle ===

    /// Mount the frame and announce readiness to the parent.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        tracing::debug!(mode = ?self.config.mode, tracks_height = self.tracks_height(), "frame mounted");
        self.post(OutboundMessage::IframeReady);
    }

    /// Release every observer and timer. The session is inert afterwards.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.deactivate_tracking();
        self.typing.cancel(&mut self.timers);
        self.timers.clear();
        self.mounted = false;
        tracing::debug!("frame unmounted");
    }

    /// Toggle height tracking for Editable mode at runtime.
    ///
    /// ReadOnly always tracks; the call is ignored there.
    pub fn set_height_tracking(&mut self, now: Instant, enabled: bool) {
        if self.config.mode.is_read_only() || self.track_height == enabled {
            return;
        }
        self.track_height = enabled;
        if !self.mounted {
            return;
        }

        if enabled {
            match self.load {
                LoadState::Idle if self.has_content => self.begin_load(now),
                LoadState::Loaded => self.activate_tracking(now),
                _ => {}
            }
        } else {
            self.deactivate_tracking();
        }
    }

    // === Inbound messages ===

    /// Decode and dispatch a raw `message` event payload.
    pub fn handle_raw_inbound(&mut self, now: Instant, payload: Value) -> Result<Dispatch, FrameError> {
        match InboundMessage::decode(payload)? {
            Some(message) => Ok(self.handle_inbound(now, message)),
            None => Ok(Dispatch::Ignored),
        }
    }

    pub fn handle_inbound(&mut self, now: Instant, message: InboundMessage) -> Dispatch {
        if !self.mounted {
            return Dispatch::Ignored;
        }

        match message {
            InboundMessage::SetInitialContent { content } => {
                tracing::debug!(len = content.len(), "initial content received");
                self.content = content.clone();
                if self.config.mode.is_editable() {
                    self.current_edit_content = content.clone();
                }
                self.has_content = true;

                if self.tracks_height() {
                    match self.load {
                        LoadState::Idle => self.begin_load(now),
                        // First settle deadline stands; the flag flips once.
                        LoadState::Loading => {}
                        LoadState::Loaded => self.schedule_content_change(now),
                    }
                }
                Dispatch::LoadContent(content)
            }
            InboundMessage::RequestHeight => {
                if !self.is_tracking_active() {
                    tracing::trace!("height requested while tracking inactive");
                    return Dispatch::Ignored;
                }
                let id = self.next_request;
                self.next_request += 1;
                self.timers.schedule(
                    SessionTimer::HeightRequest(id),
                    now,
                    self.config.timings.height_request(),
                );
                Dispatch::HeightScheduled
            }
        }
    }

    // === Editor callbacks ===

    /// The editing framework finished rendering content.
    pub fn content_rendered(&mut self, now: Instant) {
        if !self.mounted || !self.tracks_height() {
            return;
        }
        if !self.load.is_loaded() {
            self.rendered_pending = true;
            return;
        }
        if self.is_tracking_active() {
            self.restart_lookup(now);
            self.timers.schedule(
                SessionTimer::ContentRendered,
                now,
                self.config.timings.content_rendered(),
            );
        }
    }

    /// A local edit in the editing framework.
    pub fn local_edit(&mut self, now: Instant, content: String) {
        if !self.mounted {
            return;
        }
        if self.config.mode.is_read_only() {
            tracing::debug!("ignoring edit event in read-only mode");
            return;
        }

        self.current_edit_content = content.clone();
        self.post(OutboundMessage::EditorContentChanged { content });

        if self.is_tracking_active() {
            self.typing
                .request(&mut self.timers, now, HeightEvent::HeightChanged);
            self.timers.schedule(
                SessionTimer::EditSettle,
                now,
                self.config.timings.edit_settle(),
            );
        }
    }

    // === Observer callbacks ===

    pub fn resize_observed(&mut self, now: Instant, target: WatchTarget, node: NodeKey, rect: MeasuredRect) {
        if !self.mounted {
            return;
        }
        let probe = match target {
            WatchTarget::Content => &mut self.content_probe,
            WatchTarget::Container => &mut self.container_probe,
        };
        probe.observe(&mut self.timers, now, node, rect);
    }

    pub fn mutation_observed(&mut self, now: Instant, target: WatchTarget, node: NodeKey) {
        if !self.mounted {
            return;
        }
        self.watcher.observed(&mut self.timers, now, target, node);
    }

    /// Fire every timer due at `now`.
    pub fn advance(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        while let Some(timer) = self.timers.pop_due(now) {
            self.fire(now, timer);
        }
    }

    fn fire(&mut self, now: Instant, timer: SessionTimer) {
        tracing::trace!(?timer, "timer fired");
        match timer {
            SessionTimer::Settle => self.settle(now),
            SessionTimer::HeightRequest(_) => self.emit_height(HeightEvent::HeightResponse),
            SessionTimer::ContentRendered => self.emit_height(HeightEvent::ContentRendered),
            SessionTimer::ContentChange | SessionTimer::ContentMutation => {
                self.emit_height(HeightEvent::ContentHeightUpdate)
            }
            SessionTimer::DomMutation => self.emit_height(HeightEvent::DomMutated),
            SessionTimer::EditSettle => {
                if self.is_tracking_active() && !self.current_edit_content.is_empty() {
                    self.typing
                        .request(&mut self.timers, now, HeightEvent::ContentHeightUpdate);
                }
            }
            SessionTimer::Typing => {
                if let Some(event) = self.typing.fire() {
                    self.emit_height(event);
                }
            }
            SessionTimer::ContentProbe => {
                if let Some(rect) = self.content_probe.fire() {
                    self.content_resized(rect);
                }
            }
            SessionTimer::ContainerProbe => {
                if let Some(rect) = self.container_probe.fire() {
                    tracing::trace!(height = rect.height, "container resized");
                    if self.is_tracking_active() {
                        self.restart_lookup(now);
                    }
                }
            }
            SessionTimer::Lookup => self.attempt_lookup(now),
        }
    }

    // === Load cycle ===

    fn begin_load(&mut self, now: Instant) {
        self.load = LoadState::Loading;
        self.timers
            .schedule_if_absent(SessionTimer::Settle, now, self.config.timings.settle());
    }

    fn settle(&mut self, now: Instant) {
        if self.load != LoadState::Loading {
            return;
        }
        self.load = LoadState::Loaded;
        tracing::debug!("content settled, height tracking active");
        self.activate_tracking(now);
    }

    fn schedule_content_change(&mut self, now: Instant) {
        if self.content.is_empty() {
            return;
        }
        self.timers.schedule(
            SessionTimer::ContentChange,
            now,
            self.config.timings.content_change(),
        );
    }

    fn activate_tracking(&mut self, now: Instant) {
        if !self.is_tracking_active() {
            return;
        }

        let container = self.host.container_node();
        let change = self.container_probe.set_target(&mut self.timers, container);
        self.apply_resize(WatchTarget::Container, change);
        let change = self.container_probe.set_enabled(&mut self.timers, true);
        self.apply_resize(WatchTarget::Container, change);
        let change = self
            .watcher
            .retarget(&mut self.timers, WatchTarget::Container, container);
        self.apply_mutations(WatchTarget::Container, change);

        let change = self.content_probe.set_enabled(&mut self.timers, true);
        self.apply_resize(WatchTarget::Content, change);
        self.restart_lookup(now);

        self.schedule_content_change(now);
        if std::mem::take(&mut self.rendered_pending) {
            self.timers.schedule(
                SessionTimer::ContentRendered,
                now,
                self.config.timings.content_rendered(),
            );
        }
    }

    fn deactivate_tracking(&mut self) {
        if self.load == LoadState::Loading {
            self.load = LoadState::Idle;
        }
        self.rendered_pending = false;

        let change = self.content_probe.teardown(&mut self.timers);
        self.apply_resize(WatchTarget::Content, change);
        let change = self.container_probe.teardown(&mut self.timers);
        self.apply_resize(WatchTarget::Container, change);
        for (target, change) in self.watcher.disable(&mut self.timers) {
            self.apply_mutations(target, change);
        }
        self.lookup.cancel(&mut self.timers);
        self.typing.cancel(&mut self.timers);
        self.timers.cancel_where(|t| {
            matches!(
                t,
                SessionTimer::Settle
                    | SessionTimer::HeightRequest(_)
                    | SessionTimer::ContentRendered
                    | SessionTimer::ContentChange
                    | SessionTimer::EditSettle
            )
        });
    }

    // === Content node ===

    fn restart_lookup(&mut self, now: Instant) {
        self.lookup.start(&mut self.timers);
        self.attempt_lookup(now);
    }

    fn attempt_lookup(&mut self, now: Instant) {
        if !self.is_tracking_active() {
            return;
        }
        let found = self.host.find_content_node();
        match self.lookup.record_attempt(&mut self.timers, now, found) {
            LookupOutcome::Found(node) => self.set_content_node(Some(node)),
            LookupOutcome::Retrying => {
                tracing::trace!("content node not rendered yet, retrying");
            }
            LookupOutcome::Exhausted => {
                tracing::debug!("content node lookup exhausted");
                self.set_content_node(None);
            }
        }
    }

    fn set_content_node(&mut self, node: Option<NodeKey>) {
        let change = self.content_probe.set_target(&mut self.timers, node);
        self.apply_resize(WatchTarget::Content, change);
        let change = self
            .watcher
            .retarget(&mut self.timers, WatchTarget::Content, node);
        self.apply_mutations(WatchTarget::Content, change);
    }

    fn content_resized(&mut self, rect: MeasuredRect) {
        if rect.height > 0.0 {
            self.emit_height(HeightEvent::HeightChanged);
        }
    }

    fn apply_resize(&mut self, target: WatchTarget, change: Retarget) {
        if let Some(old) = change.detached() {
            self.host.unobserve_resize(target, old);
        }
        let Some(node) = change.attached() else {
            return;
        };

        let probe = match target {
            WatchTarget::Content => &self.content_probe,
            WatchTarget::Container => &self.container_probe,
        };
        let strategy = probe.strategy();
        if let Err(e) = self.host.observe_resize(target, node, strategy) {
            tracing::warn!(?target, "resize observation failed: {}", e);
        }

        if strategy == ProbeStrategy::OneShot {
            let Some(rect) = self.host.measure_rect(node) else {
                return;
            };
            let notified = match target {
                WatchTarget::Content => self.content_probe.measured_now(node, rect),
                WatchTarget::Container => self.container_probe.measured_now(node, rect),
            };
            if let (WatchTarget::Content, Some(rect)) = (target, notified) {
                self.content_resized(rect);
            }
        }
    }

    fn apply_mutations(&mut self, target: WatchTarget, change: Retarget) {
        if let Some(old) = change.detached() {
            self.host.unobserve_mutations(target, old);
        }
        if let Some(node) = change.attached() {
            let options = MutationOptions::for_target(target);
            if let Err(e) = self.host.observe_mutations(target, node, options) {
                tracing::warn!(?target, "mutation observation failed: {}", e);
            }
        }
    }

    // === Outbound ===

    fn emit_height(&mut self, event: HeightEvent) {
        if !self.is_tracking_active() {
            tracing::trace!(kind = event.as_str(), "height report suppressed, tracking inactive");
            return;
        }
        if !self.host.has_parent() {
            return;
        }

        let rect = self.content_probe.rect();
        let layout = self.host.measure_layout();
        let report = build_report(&layout, rect.height);
        tracing::debug!(kind = event.as_str(), height = report.height, "reporting height");
        self.post(event.into_message(report, rect.width));
    }

    fn post(&mut self, message: OutboundMessage) {
        if !self.host.has_parent() {
            tracing::trace!(kind = message.kind(), "no parent window, skipping send");
            return;
        }
        if let Err(e) = self.host.post_to_parent(&message) {
            tracing::warn!(kind = message.kind(), "postMessage failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests;
