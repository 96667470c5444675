//! Core frame types: modes, node identity, measured rectangles.
//!
//! These types are platform-agnostic; the browser layer maps DOM elements
//! onto [`NodeKey`]s and feeds [`MeasuredRect`]s into the session.

use serde::{Deserialize, Serialize};

/// Editing mode of the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// Accepts local edits and reports them to the parent.
    #[default]
    Editable,
    /// Inert display; always tracks height.
    ReadOnly,
}

impl Mode {
    pub fn is_read_only(self) -> bool {
        matches!(self, Mode::ReadOnly)
    }

    pub fn is_editable(self) -> bool {
        matches!(self, Mode::Editable)
    }
}

/// Opaque identity of a DOM node as seen by the core.
///
/// The platform hands out a fresh key whenever the underlying element is
/// replaced, so key inequality means "re-attach observers".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

/// Which tracked element an observation refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WatchTarget {
    /// The frame's own measuring container.
    Container,
    /// The primary content node rendered by the editing framework.
    Content,
}

/// Last observed size of a tracked element.
///
/// Width and height are always replaced together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasuredRect {
    pub width: f64,
    pub height: f64,
}

impl MeasuredRect {
    pub const ZERO: MeasuredRect = MeasuredRect {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Content load cycle of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    /// No content has arrived yet.
    #[default]
    Idle,
    /// Content was set; waiting for the settle delay before measuring.
    Loading,
    /// Content rendered and settled. Terminal for a given load.
    Loaded,
}

impl LoadState {
    pub fn is_loaded(self) -> bool {
        matches!(self, LoadState::Loaded)
    }
}

/// How an observation must move when its desired target changes.
///
/// Computed from the currently attached node and the desired node, so
/// applying it never leaves two observers on one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retarget {
    Unchanged,
    Attach(NodeKey),
    Detach(NodeKey),
    Reattach { from: NodeKey, to: NodeKey },
}

impl Retarget {
    pub fn between(current: Option<NodeKey>, desired: Option<NodeKey>) -> Self {
        match (current, desired) {
            (None, None) => Retarget::Unchanged,
            (None, Some(to)) => Retarget::Attach(to),
            (Some(from), None) => Retarget::Detach(from),
            (Some(from), Some(to)) if from == to => Retarget::Unchanged,
            (Some(from), Some(to)) => Retarget::Reattach { from, to },
        }
    }

    /// Node to disconnect from, if any.
    pub fn detached(self) -> Option<NodeKey> {
        match self {
            Retarget::Detach(from) | Retarget::Reattach { from, .. } => Some(from),
            Retarget::Unchanged | Retarget::Attach(_) => None,
        }
    }

    /// Node to connect to, if any.
    pub fn attached(self) -> Option<NodeKey> {
        match self {
            Retarget::Attach(to) | Retarget::Reattach { to, .. } => Some(to),
            Retarget::Unchanged | Retarget::Detach(_) => None,
        }
    }
}
