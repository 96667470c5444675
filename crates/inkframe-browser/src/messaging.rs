//! Parent-window `postMessage` transport.

use gloo_events::EventListener;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{MessageEvent, Window};

use inkframe_core::{OutboundMessage, PlatformError};

/// The parent window, if this document is embedded in one.
///
/// A top-level window is its own parent.
pub fn parent_window(window: &Window) -> Option<Window> {
    let parent = window.parent().ok().flatten()?;
    (parent != *window).then_some(parent)
}

/// Encode a message as a plain JS object.
///
/// The JSON-compatible serializer turns the flattened height report into
/// object properties rather than a `Map`.
pub fn encode(message: &OutboundMessage) -> Result<JsValue, PlatformError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    message
        .serialize(&serializer)
        .map_err(|e| PlatformError::from(format!("failed to encode {}: {}", message.kind(), e)))
}

/// Post to `parent` with a wildcard target origin.
pub fn post_to(parent: &Window, message: &OutboundMessage) -> Result<(), PlatformError> {
    let value = encode(message)?;
    parent
        .post_message(&value, "*")
        .map_err(|e| PlatformError::from(format!("postMessage failed: {:?}", e)))
}

/// Listen for `message` events on `window`, handing each payload over as
/// JSON. Payloads that cannot be represented as JSON are dropped.
pub fn listen(
    window: &Window,
    mut on_message: impl FnMut(serde_json::Value) + 'static,
) -> EventListener {
    EventListener::new(window, "message", move |event| {
        let Some(event) = event.dyn_ref::<MessageEvent>() else {
            return;
        };
        match serde_wasm_bindgen::from_value::<serde_json::Value>(event.data()) {
            Ok(value) => on_message(value),
            Err(e) => tracing::trace!("ignoring non-JSON message: {}", e),
        }
    })
}
