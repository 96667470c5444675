//! `FrameHost` implementation over the live DOM.
//!
//! All queries are scoped to the frame's measuring container: the editing
//! framework renders its wrappers and content node inside it. Observer
//! callbacks are not handled here; they are turned into [`HostEvent`]s and
//! handed to the sink supplied by whoever drives the session.

use std::collections::HashMap;
use std::rc::Rc;

use web_sys::{Document, Element, HtmlElement, Window};

use inkframe_core::dom_hooks::{
    CONTENT_NODE_SELECTOR, CONTENT_WRAPPER_SELECTOR, OUTER_WRAPPER_SELECTOR,
};
use inkframe_core::{
    BoxPadding, ContainerMetrics, ContentMetrics, FrameHost, LayoutSnapshot, MeasuredRect,
    MutationOptions, NodeKey, OutboundMessage, PlatformError, ProbeStrategy, SyncTimings,
    WatchTarget,
};

use crate::messaging;
use crate::observe::{MutationHandle, ResizeHandle};

/// An observer callback, tagged with the observation it came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    Resized {
        target: WatchTarget,
        node: NodeKey,
        rect: MeasuredRect,
    },
    Mutated {
        target: WatchTarget,
        node: NodeKey,
    },
}

pub type EventSink = Rc<dyn Fn(HostEvent)>;

const DEFAULT_POLL_MS: u32 = 100;

/// Keys for DOM elements.
///
/// An element keeps its key while it is registered; a replacement element
/// gets a fresh one even if it matches the same selector. Elements that have
/// left the document are pruned whenever a new one is registered.
#[derive(Default)]
pub struct NodeRegistry {
    nodes: Vec<(NodeKey, Element)>,
    next: u64,
}

impl NodeRegistry {
    pub fn key_for(&mut self, element: &Element) -> NodeKey {
        if let Some((key, _)) = self.nodes.iter().find(|(_, e)| e == element) {
            return *key;
        }
        self.nodes.retain(|(_, e)| e.is_connected());
        self.next += 1;
        let key = NodeKey(self.next);
        self.nodes.push((key, element.clone()));
        key
    }

    pub fn get(&self, key: NodeKey) -> Option<&Element> {
        self.nodes.iter().find(|(k, _)| *k == key).map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub struct BrowserHost {
    window: Window,
    document: Document,
    parent: Option<Window>,
    container: HtmlElement,
    nodes: NodeRegistry,
    // A one-shot observation has no live handle but still owns the slot.
    resize: HashMap<WatchTarget, (NodeKey, Option<ResizeHandle>)>,
    mutations: HashMap<WatchTarget, (NodeKey, MutationHandle)>,
    sink: EventSink,
    poll_ms: HashMap<WatchTarget, u32>,
}

impl BrowserHost {
    pub fn new(window: Window, document: Document, container: HtmlElement, sink: EventSink) -> Self {
        let parent = messaging::parent_window(&window);
        if parent.is_none() {
            tracing::debug!("not embedded, outbound messages will be skipped");
        }

        Self {
            window,
            document,
            parent,
            container,
            nodes: NodeRegistry::default(),
            resize: HashMap::new(),
            mutations: HashMap::new(),
            sink,
            poll_ms: HashMap::new(),
        }
    }

    /// Use the probe throttle intervals as polling periods where
    /// `ResizeObserver` is unavailable.
    pub fn with_poll_intervals(mut self, timings: &SyncTimings) -> Self {
        let clamp = |ms: u64| u32::try_from(ms).unwrap_or(u32::MAX);
        self.poll_ms
            .insert(WatchTarget::Content, clamp(timings.content_probe_throttle_ms));
        self.poll_ms
            .insert(WatchTarget::Container, clamp(timings.container_probe_throttle_ms));
        self
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// Number of live platform observers.
    pub fn live_observers(&self) -> usize {
        self.resize.values().filter(|(_, h)| h.is_some()).count() + self.mutations.len()
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.container.query_selector(selector).ok().flatten()
    }

    fn padding_of(&self, selector: &str) -> Option<BoxPadding> {
        let element = self.query(selector)?;
        let style = self.window.get_computed_style(&element).ok().flatten()?;
        let top = style.get_property_value("padding-top").unwrap_or_default();
        let bottom = style.get_property_value("padding-bottom").unwrap_or_default();
        Some(BoxPadding::from_computed(&top, &bottom))
    }

    fn element(&self, node: NodeKey) -> Result<&Element, PlatformError> {
        self.nodes
            .get(node)
            .ok_or_else(|| PlatformError::from(format!("unknown node {:?}", node)))
    }
}

impl FrameHost for BrowserHost {
    fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    fn post_to_parent(&mut self, message: &OutboundMessage) -> Result<(), PlatformError> {
        match &self.parent {
            Some(parent) => messaging::post_to(parent, message),
            None => Ok(()),
        }
    }

    fn measure_layout(&self) -> LayoutSnapshot {
        let content = self.query(CONTENT_NODE_SELECTOR).map(|el| ContentMetrics {
            scroll_height: f64::from(el.scroll_height()),
            rect_height: el.get_bounding_client_rect().height(),
        });
        let container = self.container.is_connected().then(|| ContainerMetrics {
            offset_height: f64::from(self.container.offset_height()),
            scroll_height: f64::from(self.container.scroll_height()),
        });

        LayoutSnapshot {
            content,
            content_wrapper_padding: self.padding_of(CONTENT_WRAPPER_SELECTOR),
            outer_wrapper_padding: self.padding_of(OUTER_WRAPPER_SELECTOR),
            container,
            document_scroll_height: self
                .document
                .document_element()
                .map(|e| f64::from(e.scroll_height()))
                .unwrap_or(0.0),
            body_scroll_height: self
                .document
                .body()
                .map(|b| f64::from(b.scroll_height()))
                .unwrap_or(0.0),
        }
    }

    fn measure_rect(&self, node: NodeKey) -> Option<MeasuredRect> {
        let rect = self.nodes.get(node)?.get_bounding_client_rect();
        Some(MeasuredRect::new(rect.width(), rect.height()))
    }

    fn container_node(&mut self) -> Option<NodeKey> {
        if !self.container.is_connected() {
            return None;
        }
        let container: Element = self.container.clone().into();
        Some(self.nodes.key_for(&container))
    }

    fn find_content_node(&mut self) -> Option<NodeKey> {
        let element = self.query(CONTENT_NODE_SELECTOR)?;
        Some(self.nodes.key_for(&element))
    }

    fn observe_resize(
        &mut self,
        target: WatchTarget,
        node: NodeKey,
        strategy: ProbeStrategy,
    ) -> Result<(), PlatformError> {
        let handle = match strategy {
            ProbeStrategy::OneShot => None,
            ProbeStrategy::ResizeObserver => {
                let sink = self.sink.clone();
                let poll_ms = self
                    .poll_ms
                    .get(&target)
                    .copied()
                    .unwrap_or(DEFAULT_POLL_MS);
                Some(ResizeHandle::observe(self.element(node)?, poll_ms, move |rect| {
                    sink(HostEvent::Resized { target, node, rect })
                })?)
            }
        };
        // Replacing an entry drops (and disconnects) any stale handle.
        self.resize.insert(target, (node, handle));
        Ok(())
    }

    fn unobserve_resize(&mut self, target: WatchTarget, node: NodeKey) {
        if self.resize.get(&target).is_some_and(|(n, _)| *n == node) {
            self.resize.remove(&target);
        }
    }

    fn observe_mutations(
        &mut self,
        target: WatchTarget,
        node: NodeKey,
        options: MutationOptions,
    ) -> Result<(), PlatformError> {
        let sink = self.sink.clone();
        let handle = MutationHandle::observe(self.element(node)?, options, move || {
            sink(HostEvent::Mutated { target, node })
        })?;
        self.mutations.insert(target, (node, handle));
        Ok(())
    }

    fn unobserve_mutations(&mut self, target: WatchTarget, node: NodeKey) {
        if self.mutations.get(&target).is_some_and(|(n, _)| *n == node) {
            self.mutations.remove(&target);
        }
    }
}
