//! Platform abstraction for the frame session.
//!
//! The session never touches the DOM or the parent window directly. A
//! `FrameHost` implementation (the browser one lives in `inkframe-browser`)
//! measures layout, owns the real observers and posts messages. Observers are
//! registered and released only through the session, which guarantees every
//! `observe_*` is balanced by an `unobserve_*` on each deactivation path.

use crate::height::LayoutSnapshot;
use crate::message::OutboundMessage;
use crate::probe::ProbeStrategy;
use crate::types::{MeasuredRect, NodeKey, WatchTarget};
use crate::watcher::MutationOptions;

/// Error type for platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Host environment of an embedded frame.
pub trait FrameHost {
    /// Whether the frame is embedded in a distinct parent window.
    fn has_parent(&self) -> bool;

    /// Post a message to the parent window. Fire-and-forget.
    fn post_to_parent(&mut self, message: &OutboundMessage) -> Result<(), PlatformError>;

    /// Pull a fresh layout snapshot from the live DOM.
    fn measure_layout(&self) -> LayoutSnapshot;

    /// Measure one node's bounding rect right now.
    fn measure_rect(&self, node: NodeKey) -> Option<MeasuredRect>;

    /// The frame's own measuring container, if rendered.
    fn container_node(&mut self) -> Option<NodeKey>;

    /// Query for the primary content node.
    ///
    /// Must return a new key when the element has been replaced since the
    /// last call.
    fn find_content_node(&mut self) -> Option<NodeKey>;

    /// Start size observation of `node`.
    fn observe_resize(
        &mut self,
        target: WatchTarget,
        node: NodeKey,
        strategy: ProbeStrategy,
    ) -> Result<(), PlatformError>;

    /// Stop size observation of `node`.
    fn unobserve_resize(&mut self, target: WatchTarget, node: NodeKey);

    /// Start mutation observation of `node`'s subtree.
    fn observe_mutations(
        &mut self,
        target: WatchTarget,
        node: NodeKey,
        options: MutationOptions,
    ) -> Result<(), PlatformError>;

    /// Stop mutation observation of `node`.
    fn unobserve_mutations(&mut self, target: WatchTarget, node: NodeKey);
}
