//! Cross-frame message envelopes.
//!
//! Every message exchanged with the parent window is a JSON object keyed by
//! a `type` discriminant. Outbound and inbound directions are separate closed
//! enums so dispatch is exhaustive at the handler boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FrameError;

/// Snapshot of layout measurements sent with every height-bearing message.
///
/// All values are CSS pixels. The `prose_mirror_*` fields are present only
/// when the primary content node was resolvable at measurement time.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightReport {
    pub height: f64,
    pub rect_height: f64,
    pub container_height: f64,
    pub container_scroll_height: f64,
    pub document_scroll_height: f64,
    pub body_scroll_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prose_mirror_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prose_mirror_offset_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_prose_mirror_element: Option<bool>,
}

/// Messages posted from the frame to its parent.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    /// Sent once on mount, independent of content.
    IframeReady,
    /// A local edit in Editable mode.
    EditorContentChanged { content: String },
    HeightChanged {
        #[serde(flatten)]
        report: HeightReport,
        width: f64,
    },
    ContentHeightUpdate {
        #[serde(flatten)]
        report: HeightReport,
    },
    ContentRendered {
        #[serde(flatten)]
        report: HeightReport,
    },
    DomMutated {
        #[serde(flatten)]
        report: HeightReport,
    },
    HeightResponse {
        #[serde(flatten)]
        report: HeightReport,
    },
}

impl OutboundMessage {
    /// The wire discriminant of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::IframeReady => "IFRAME_READY",
            OutboundMessage::EditorContentChanged { .. } => "EDITOR_CONTENT_CHANGED",
            OutboundMessage::HeightChanged { .. } => HeightEvent::HeightChanged.as_str(),
            OutboundMessage::ContentHeightUpdate { .. } => {
                HeightEvent::ContentHeightUpdate.as_str()
            }
            OutboundMessage::ContentRendered { .. } => HeightEvent::ContentRendered.as_str(),
            OutboundMessage::DomMutated { .. } => HeightEvent::DomMutated.as_str(),
            OutboundMessage::HeightResponse { .. } => HeightEvent::HeightResponse.as_str(),
        }
    }

    /// The height report carried by this message, if it is height-bearing.
    pub fn height_report(&self) -> Option<&HeightReport> {
        match self {
            OutboundMessage::IframeReady | OutboundMessage::EditorContentChanged { .. } => None,
            OutboundMessage::HeightChanged { report, .. }
            | OutboundMessage::ContentHeightUpdate { report }
            | OutboundMessage::ContentRendered { report }
            | OutboundMessage::DomMutated { report }
            | OutboundMessage::HeightResponse { report } => Some(report),
        }
    }

    pub fn is_height_message(&self) -> bool {
        self.height_report().is_some()
    }
}

/// The five height-bearing outbound kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeightEvent {
    /// The content node was resized, or the user is typing.
    HeightChanged,
    /// Content changed or the content node mutated.
    ContentHeightUpdate,
    /// The editing framework finished rendering new content.
    ContentRendered,
    /// The container subtree mutated.
    DomMutated,
    /// Reply to an explicit `REQUEST_HEIGHT`.
    HeightResponse,
}

impl HeightEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            HeightEvent::HeightChanged => "HEIGHT_CHANGED",
            HeightEvent::ContentHeightUpdate => "CONTENT_HEIGHT_UPDATE",
            HeightEvent::ContentRendered => "CONTENT_RENDERED",
            HeightEvent::DomMutated => "DOM_MUTATED",
            HeightEvent::HeightResponse => "HEIGHT_RESPONSE",
        }
    }

    /// Wrap a report in the envelope for this kind.
    ///
    /// `width` is only carried by `HEIGHT_CHANGED`.
    pub fn into_message(self, report: HeightReport, width: f64) -> OutboundMessage {
        match self {
            HeightEvent::HeightChanged => OutboundMessage::HeightChanged { report, width },
            HeightEvent::ContentHeightUpdate => OutboundMessage::ContentHeightUpdate { report },
            HeightEvent::ContentRendered => OutboundMessage::ContentRendered { report },
            HeightEvent::DomMutated => OutboundMessage::DomMutated { report },
            HeightEvent::HeightResponse => OutboundMessage::HeightResponse { report },
        }
    }
}

/// Messages received from the parent window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundMessage {
    /// Load serialized content into the editor.
    SetInitialContent { content: String },
    /// Ask for a one-off height report.
    RequestHeight,
}

#[derive(Deserialize)]
struct SetInitialContentPayload {
    content: String,
}

impl InboundMessage {
    /// Decode a raw `message` event payload.
    ///
    /// Payloads that are not objects, lack a string `type`, or name a type we
    /// do not handle decode to `Ok(None)`; the parent page and browser
    /// extensions post plenty of unrelated traffic. A known type with a
    /// malformed body is an error.
    pub fn decode(value: Value) -> Result<Option<Self>, FrameError> {
        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return Ok(None);
        };

        match kind {
            "SET_INITIAL_CONTENT" => {
                let payload: SetInitialContentPayload =
                    serde_json::from_value(value).map_err(|source| FrameError::Decode {
                        kind: "SET_INITIAL_CONTENT",
                        source,
                    })?;
                Ok(Some(InboundMessage::SetInitialContent {
                    content: payload.content,
                }))
            }
            "REQUEST_HEIGHT" => Ok(Some(InboundMessage::RequestHeight)),
            _ => Ok(None),
        }
    }
}
