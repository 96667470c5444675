use std::collections::{HashMap, HashSet};

use serde_json::json;
use web_time::{Duration, Instant};

use super::*;
use crate::height::{BoxPadding, ContainerMetrics, ContentMetrics, LayoutSnapshot};
use crate::lookup::LookupState;
use crate::platform::PlatformError;

const CONTAINER: NodeKey = NodeKey(1);
const PROSE: NodeKey = NodeKey(2);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[derive(Default)]
struct MockHost {
    parent: bool,
    posted: Vec<OutboundMessage>,
    layout: LayoutSnapshot,
    container: Option<NodeKey>,
    content: Option<NodeKey>,
    rects: HashMap<NodeKey, MeasuredRect>,
    resize: HashSet<(WatchTarget, NodeKey)>,
    mutations: HashSet<(WatchTarget, NodeKey)>,
    double_registrations: usize,
    unbalanced_releases: usize,
    lookups: usize,
}

impl FrameHost for MockHost {
    fn has_parent(&self) -> bool {
        self.parent
    }

    fn post_to_parent(&mut self, message: &OutboundMessage) -> Result<(), PlatformError> {
        self.posted.push(message.clone());
        Ok(())
    }

    fn measure_layout(&self) -> LayoutSnapshot {
        self.layout.clone()
    }

    fn measure_rect(&self, node: NodeKey) -> Option<MeasuredRect> {
        self.rects.get(&node).copied()
    }

    fn container_node(&mut self) -> Option<NodeKey> {
        self.container
    }

    fn find_content_node(&mut self) -> Option<NodeKey> {
        self.lookups += 1;
        self.content
    }

    fn observe_resize(
        &mut self,
        target: WatchTarget,
        node: NodeKey,
        _strategy: ProbeStrategy,
    ) -> Result<(), PlatformError> {
        if !self.resize.insert((target, node)) {
            self.double_registrations += 1;
        }
        Ok(())
    }

    fn unobserve_resize(&mut self, target: WatchTarget, node: NodeKey) {
        if !self.resize.remove(&(target, node)) {
            self.unbalanced_releases += 1;
        }
    }

    fn observe_mutations(
        &mut self,
        target: WatchTarget,
        node: NodeKey,
        _options: MutationOptions,
    ) -> Result<(), PlatformError> {
        if !self.mutations.insert((target, node)) {
            self.double_registrations += 1;
        }
        Ok(())
    }

    fn unobserve_mutations(&mut self, target: WatchTarget, node: NodeKey) {
        if !self.mutations.remove(&(target, node)) {
            self.unbalanced_releases += 1;
        }
    }
}

impl MockHost {
    fn kinds(&self) -> Vec<&'static str> {
        self.posted.iter().map(OutboundMessage::kind).collect()
    }

    fn height_messages(&self) -> Vec<&OutboundMessage> {
        self.posted.iter().filter(|m| m.is_height_message()).collect()
    }

    fn count(&self, kind: &str) -> usize {
        self.posted.iter().filter(|m| m.kind() == kind).count()
    }
}

/// 100px of content inside 16+16 and 0+8 of wrapper padding.
fn rendered_layout(scroll_height: f64) -> LayoutSnapshot {
    LayoutSnapshot {
        content: Some(ContentMetrics {
            scroll_height,
            rect_height: scroll_height,
        }),
        content_wrapper_padding: Some(BoxPadding::new(16.0, 16.0)),
        outer_wrapper_padding: Some(BoxPadding::new(0.0, 8.0)),
        container: Some(ContainerMetrics {
            offset_height: 140.0,
            scroll_height: 140.0,
        }),
        document_scroll_height: 150.0,
        body_scroll_height: 150.0,
    }
}

fn embedded_host() -> MockHost {
    MockHost {
        parent: true,
        layout: rendered_layout(100.0),
        container: Some(CONTAINER),
        content: Some(PROSE),
        ..MockHost::default()
    }
}

fn mounted(config: FrameConfig) -> FrameSession<MockHost> {
    let mut session = FrameSession::new(embedded_host(), config);
    session.mount();
    session
}

fn set_content(session: &mut FrameSession<MockHost>, now: Instant, content: &str) -> Dispatch {
    session.handle_inbound(
        now,
        InboundMessage::SetInitialContent {
            content: content.to_string(),
        },
    )
}

/// A session that has settled and flushed its post-settle report.
/// Returns the time at which it is quiet.
fn settled(config: FrameConfig, t0: Instant) -> (FrameSession<MockHost>, Instant) {
    let mut session = mounted(config);
    set_content(&mut session, t0, "<p>Hi</p>");
    session.advance(t0 + ms(100));
    assert!(session.is_tracking_active());
    session.advance(t0 + ms(300));
    session.host_mut().posted.clear();
    assert_eq!(session.pending_timers(), 0);
    (session, t0 + ms(300))
}

#[test]
fn test_ready_sent_on_mount() {
    let session = mounted(FrameConfig::read_only());
    assert_eq!(session.host().kinds(), vec!["IFRAME_READY"]);
}

#[test]
fn test_mount_is_idempotent() {
    let mut session = mounted(FrameConfig::read_only());
    session.mount();
    assert_eq!(session.host().count("IFRAME_READY"), 1);
}

#[test]
fn test_read_only_content_rendered_report() {
    let t0 = Instant::now();
    let mut session = mounted(FrameConfig::read_only());

    let dispatch = set_content(&mut session, t0, "<p>Hi</p>");
    assert_eq!(dispatch, Dispatch::LoadContent("<p>Hi</p>".to_string()));
    assert_eq!(session.load_state(), LoadState::Loading);

    // The editor finishes rendering before the settle delay elapses.
    session.content_rendered(t0 + ms(60));
    session.advance(t0 + ms(100));
    assert!(session.is_content_loaded());
    assert_eq!(session.host().kinds(), vec!["IFRAME_READY"]);

    session.advance(t0 + ms(150));
    assert_eq!(session.host().kinds(), vec!["IFRAME_READY", "CONTENT_RENDERED"]);
    let report = session.host().posted[1].height_report().unwrap();
    assert_eq!(report.height, 100.0 + 32.0 + 8.0);
    assert_eq!(report.has_prose_mirror_element, Some(true));

    session.advance(t0 + ms(300));
    assert_eq!(session.host().count("CONTENT_HEIGHT_UPDATE"), 1);
}

#[test]
fn test_observers_attached_after_settle() {
    let t0 = Instant::now();
    let (session, _) = settled(FrameConfig::read_only(), t0);
    let host = session.host();

    assert!(host.mutations.contains(&(WatchTarget::Container, CONTAINER)));
    assert!(host.mutations.contains(&(WatchTarget::Content, PROSE)));
    assert!(host.resize.contains(&(WatchTarget::Container, CONTAINER)));
    assert!(host.resize.contains(&(WatchTarget::Content, PROSE)));
    assert_eq!(session.active_observers(), 4);
    assert_eq!(session.content_node(), Some(PROSE));
}

#[test]
fn test_settle_happens_once_and_not_early() {
    let t0 = Instant::now();
    let mut session = mounted(FrameConfig::read_only());
    set_content(&mut session, t0, "<p>a</p>");
    set_content(&mut session, t0 + ms(60), "<p>b</p>");

    session.advance(t0 + ms(99));
    assert!(!session.is_content_loaded());

    session.advance(t0 + ms(100));
    assert!(session.is_content_loaded());
    assert_eq!(session.content(), "<p>b</p>");

    // Content arriving after settle does not restart the cycle.
    set_content(&mut session, t0 + ms(120), "<p>c</p>");
    assert_eq!(session.load_state(), LoadState::Loaded);
}

#[test]
fn test_no_height_messages_before_load() {
    let t0 = Instant::now();
    let mut session = mounted(FrameConfig::read_only());
    set_content(&mut session, t0, "<p>Hi</p>");

    assert_eq!(
        session.handle_inbound(t0 + ms(10), InboundMessage::RequestHeight),
        Dispatch::Ignored
    );
    session.mutation_observed(t0 + ms(20), WatchTarget::Container, CONTAINER);
    session.resize_observed(t0 + ms(20), WatchTarget::Content, PROSE, MeasuredRect::new(10.0, 10.0));
    session.advance(t0 + ms(99));

    assert!(session.host().height_messages().is_empty());
}

#[test]
fn test_request_height_ignored_when_untracked_editable() {
    let t0 = Instant::now();
    let mut session = mounted(FrameConfig::editable(false));
    set_content(&mut session, t0, "<p>Hi</p>");
    assert_eq!(
        session.handle_inbound(t0 + ms(200), InboundMessage::RequestHeight),
        Dispatch::Ignored
    );
    session.advance(t0 + ms(5_000));

    assert_eq!(session.host().kinds(), vec!["IFRAME_READY"]);
    assert_eq!(session.load_state(), LoadState::Idle);
    assert_eq!(session.current_edit_content(), "<p>Hi</p>");
}

#[test]
fn test_request_height_response() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);

    assert_eq!(
        session.handle_inbound(now, InboundMessage::RequestHeight),
        Dispatch::HeightScheduled
    );
    session.advance(now + ms(49));
    assert!(session.host().posted.is_empty());
    session.advance(now + ms(50));
    assert_eq!(session.host().kinds(), vec!["HEIGHT_RESPONSE"]);
}

#[test]
fn test_each_height_request_answered() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);
    session.handle_inbound(now, InboundMessage::RequestHeight);
    session.handle_inbound(now + ms(10), InboundMessage::RequestHeight);
    session.advance(now + ms(100));
    assert_eq!(session.host().count("HEIGHT_RESPONSE"), 2);
}

#[test]
fn test_fallback_height_from_rect() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);
    session.host_mut().layout = LayoutSnapshot {
        content: Some(ContentMetrics::default()),
        container: Some(ContainerMetrics {
            offset_height: 150.0,
            scroll_height: 150.0,
        }),
        ..LayoutSnapshot::default()
    };

    session.resize_observed(now, WatchTarget::Content, PROSE, MeasuredRect::new(300.0, 200.0));
    session.advance(now + ms(50));

    let posted = &session.host().posted;
    assert_eq!(posted.len(), 1);
    match &posted[0] {
        OutboundMessage::HeightChanged { report, width } => {
            assert_eq!(report.height, 200.0);
            assert_eq!(report.rect_height, 200.0);
            assert_eq!(*width, 300.0);
        }
        other => panic!("expected HEIGHT_CHANGED, got {other:?}"),
    }
}

#[test]
fn test_resize_burst_sends_one_height_changed() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);

    for (i, offset) in [0, 5, 10, 25, 40].into_iter().enumerate() {
        let rect = MeasuredRect::new(300.0 + i as f64, 100.0 + i as f64);
        session.resize_observed(now + ms(offset), WatchTarget::Content, PROSE, rect);
    }
    session.advance(now + ms(49));
    assert!(session.host().posted.is_empty());
    session.advance(now + ms(500));

    assert_eq!(session.host().kinds(), vec!["HEIGHT_CHANGED"]);
    match &session.host().posted[0] {
        OutboundMessage::HeightChanged { report, width } => {
            assert_eq!(*width, 304.0);
            assert_eq!(report.rect_height, 104.0);
        }
        other => panic!("expected HEIGHT_CHANGED, got {other:?}"),
    }
}

#[test]
fn test_zero_height_resize_not_reported() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);
    session.resize_observed(now, WatchTarget::Content, PROSE, MeasuredRect::new(300.0, 0.0));
    session.advance(now + ms(100));
    assert!(session.host().posted.is_empty());
}

#[test]
fn test_content_mutations_collapse_to_one_update() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);

    session.mutation_observed(now, WatchTarget::Content, PROSE);
    session.mutation_observed(now + ms(15), WatchTarget::Content, PROSE);
    session.mutation_observed(now + ms(30), WatchTarget::Content, PROSE);

    session.advance(now + ms(79));
    assert!(session.host().posted.is_empty());
    session.advance(now + ms(80));
    assert_eq!(session.host().kinds(), vec!["CONTENT_HEIGHT_UPDATE"]);
    session.advance(now + ms(1_000));
    assert_eq!(session.host().posted.len(), 1);
}

#[test]
fn test_container_mutation_reports_dom_mutated() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);
    session.mutation_observed(now, WatchTarget::Container, CONTAINER);
    session.advance(now + ms(99));
    assert!(session.host().posted.is_empty());
    session.advance(now + ms(100));
    assert_eq!(session.host().kinds(), vec!["DOM_MUTATED"]);
}

#[test]
fn test_untracked_edit_reports_content_only() {
    let t0 = Instant::now();
    let mut session = mounted(FrameConfig::editable(false));
    set_content(&mut session, t0, "<p>a</p>");

    session.local_edit(t0 + ms(10), "<p>ab</p>".to_string());
    session.advance(t0 + ms(10_000));

    assert_eq!(
        session.host().posted,
        vec![
            OutboundMessage::IframeReady,
            OutboundMessage::EditorContentChanged {
                content: "<p>ab</p>".to_string()
            },
        ]
    );
    assert!(session.host().height_messages().is_empty());
    assert_eq!(session.active_observers(), 0);
}

#[test]
fn test_tracked_typing_is_throttled() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::editable(true), t0);

    for offset in [0, 50, 100, 150, 200] {
        session.local_edit(now + ms(offset), format!("<p>{offset}</p>"));
    }
    assert_eq!(session.host().count("EDITOR_CONTENT_CHANGED"), 5);
    assert_eq!(session.current_edit_content(), "<p>200</p>");

    session.advance(now + ms(299));
    assert!(session.host().height_messages().is_empty());

    session.advance(now + ms(300));
    let heights: Vec<_> = session
        .host()
        .height_messages()
        .iter()
        .map(|m| m.kind())
        .collect();
    assert_eq!(heights, vec!["HEIGHT_CHANGED"]);

    // The post-edit settle rides the next throttle window.
    session.advance(now + ms(600));
    let heights: Vec<_> = session
        .host()
        .height_messages()
        .iter()
        .map(|m| m.kind())
        .collect();
    assert_eq!(heights, vec!["HEIGHT_CHANGED", "CONTENT_HEIGHT_UPDATE"]);
    assert_eq!(session.pending_timers(), 0);
}

#[test]
fn test_read_only_ignores_local_edits() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);
    session.local_edit(now, "<p>nope</p>".to_string());
    assert!(session.host().posted.is_empty());
    assert_eq!(session.current_edit_content(), "");
}

#[test]
fn test_without_parent_nothing_is_posted() {
    let t0 = Instant::now();
    let mut host = embedded_host();
    host.parent = false;
    let mut session = FrameSession::new(host, FrameConfig::read_only());
    session.mount();
    set_content(&mut session, t0, "<p>Hi</p>");
    session.content_rendered(t0 + ms(10));
    session.advance(t0 + ms(1_000));
    session.handle_inbound(t0 + ms(1_000), InboundMessage::RequestHeight);
    session.advance(t0 + ms(2_000));

    assert!(session.is_tracking_active());
    assert!(session.host().posted.is_empty());
}

#[test]
fn test_unmount_releases_everything() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);
    session.mutation_observed(now, WatchTarget::Container, CONTAINER);
    session.mutation_observed(now, WatchTarget::Content, PROSE);
    session.resize_observed(now, WatchTarget::Content, PROSE, MeasuredRect::new(1.0, 1.0));
    session.handle_inbound(now, InboundMessage::RequestHeight);
    assert!(session.pending_timers() > 0);

    session.unmount();

    assert_eq!(session.active_observers(), 0);
    assert_eq!(session.pending_timers(), 0);
    assert_eq!(session.next_deadline(), None);
    let host = session.host();
    assert!(host.resize.is_empty());
    assert!(host.mutations.is_empty());
    assert_eq!(host.unbalanced_releases, 0);

    session.advance(now + ms(1_000));
    assert!(session.host().posted.is_empty());
}

#[test]
fn test_runtime_tracking_toggle() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::editable(true), t0);

    session.set_height_tracking(now, false);
    assert!(!session.is_tracking_active());
    assert_eq!(session.active_observers(), 0);
    assert!(session.host().mutations.is_empty());
    assert_eq!(
        session.handle_inbound(now, InboundMessage::RequestHeight),
        Dispatch::Ignored
    );

    session.set_height_tracking(now + ms(10), true);
    assert!(session.is_tracking_active());
    assert_eq!(session.active_observers(), 4);
    assert_eq!(session.host().double_registrations, 0);
    assert_eq!(session.host().unbalanced_releases, 0);
}

#[test]
fn test_enabling_tracking_starts_load_for_received_content() {
    let t0 = Instant::now();
    let mut session = mounted(FrameConfig::editable(false));
    set_content(&mut session, t0, "<p>Hi</p>");
    assert_eq!(session.load_state(), LoadState::Idle);

    session.set_height_tracking(t0 + ms(10), true);
    assert_eq!(session.load_state(), LoadState::Loading);
    session.advance(t0 + ms(110));
    assert!(session.is_tracking_active());
}

#[test]
fn test_read_only_ignores_tracking_toggle() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);
    session.set_height_tracking(now, false);
    assert!(session.is_tracking_active());
}

#[test]
fn test_replaced_content_node_is_reattached() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);
    let replacement = NodeKey(3);
    session.host_mut().content = Some(replacement);

    session.resize_observed(now, WatchTarget::Container, CONTAINER, MeasuredRect::new(300.0, 400.0));
    session.advance(now + ms(100));

    let host = session.host();
    assert!(host.mutations.contains(&(WatchTarget::Content, replacement)));
    assert!(!host.mutations.contains(&(WatchTarget::Content, PROSE)));
    assert!(host.resize.contains(&(WatchTarget::Content, replacement)));
    assert_eq!(host.double_registrations, 0);
    assert_eq!(host.unbalanced_releases, 0);
    assert_eq!(session.content_node(), Some(replacement));
}

#[test]
fn test_content_node_lookup_retries() {
    let t0 = Instant::now();
    let mut session = mounted(FrameConfig::read_only());
    session.host_mut().content = None;
    set_content(&mut session, t0, "<p>Hi</p>");
    session.advance(t0 + ms(100));
    assert_eq!(session.content_node(), None);

    session.host_mut().content = Some(PROSE);
    session.advance(t0 + ms(200));
    assert_eq!(session.content_node(), Some(PROSE));
    assert!(session.host().mutations.contains(&(WatchTarget::Content, PROSE)));
}

#[test]
fn test_content_node_lookup_is_bounded() {
    let t0 = Instant::now();
    let mut session = mounted(FrameConfig::read_only());
    session.host_mut().content = None;
    set_content(&mut session, t0, "<p>Hi</p>");
    session.advance(t0 + ms(100));
    for step in 1..=10 {
        session.advance(t0 + ms(100 + step * 100));
    }

    assert_eq!(session.host().lookups, 5);
    assert_eq!(session.lookup.state(), LookupState::Exhausted);
    assert_eq!(session.content_node(), None);
}

#[test]
fn test_content_node_lookup_spends_one_attempt_per_retry() {
    let t0 = Instant::now();
    let config = FrameConfig::read_only();
    assert!(config.validate().is_ok());
    let mut session = mounted(config);
    session.host_mut().content = None;
    set_content(&mut session, t0, "<p>Hi</p>");

    session.advance(t0 + ms(100));
    assert_eq!(session.host().lookups, 1);
    session.advance(t0 + ms(150));
    assert_eq!(session.host().lookups, 1);
    session.advance(t0 + ms(200));
    assert_eq!(session.host().lookups, 2);
}

#[test]
fn test_one_shot_strategy_measures_on_attach() {
    let t0 = Instant::now();
    let mut host = embedded_host();
    host.rects.insert(PROSE, MeasuredRect::new(320.0, 100.0));
    let mut session =
        FrameSession::with_strategy(host, FrameConfig::read_only(), ProbeStrategy::OneShot);
    session.mount();
    set_content(&mut session, t0, "<p>Hi</p>");
    session.advance(t0 + ms(100));

    assert_eq!(session.content_rect(), MeasuredRect::new(320.0, 100.0));
    assert_eq!(session.host().count("HEIGHT_CHANGED"), 1);
}

#[test]
fn test_content_change_after_load_is_debounced() {
    let t0 = Instant::now();
    let (mut session, now) = settled(FrameConfig::read_only(), t0);
    set_content(&mut session, now, "<p>one</p>");
    set_content(&mut session, now + ms(100), "<p>two</p>");

    session.advance(now + ms(299));
    assert!(session.host().posted.is_empty());
    session.advance(now + ms(300));
    assert_eq!(session.host().kinds(), vec!["CONTENT_HEIGHT_UPDATE"]);
}

#[test]
fn test_empty_content_skips_content_change_report() {
    let t0 = Instant::now();
    let mut session = mounted(FrameConfig::read_only());
    set_content(&mut session, t0, "");
    session.advance(t0 + ms(1_000));
    assert!(session.is_content_loaded());
    assert!(session.host().height_messages().is_empty());
}

#[test]
fn test_raw_inbound_dispatch() {
    let t0 = Instant::now();
    let mut session = mounted(FrameConfig::read_only());

    let ignored = session
        .handle_raw_inbound(t0, json!({"source": "react-devtools"}))
        .unwrap();
    assert_eq!(ignored, Dispatch::Ignored);

    assert!(session
        .handle_raw_inbound(t0, json!({"type": "SET_INITIAL_CONTENT"}))
        .is_err());
    assert_eq!(session.load_state(), LoadState::Idle);

    let loaded = session
        .handle_raw_inbound(t0, json!({"type": "SET_INITIAL_CONTENT", "content": "<p>x</p>"}))
        .unwrap();
    assert_eq!(loaded, Dispatch::LoadContent("<p>x</p>".to_string()));
}

#[test]
fn test_events_before_mount_are_ignored() {
    let t0 = Instant::now();
    let mut session = FrameSession::new(embedded_host(), FrameConfig::read_only());
    assert_eq!(set_content(&mut session, t0, "<p>Hi</p>"), Dispatch::Ignored);
    session.advance(t0 + ms(1_000));
    assert!(session.host().posted.is_empty());
    assert_eq!(session.pending_timers(), 0);
}
