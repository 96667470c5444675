//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use inkframe_core::{Affordances, FrameConfig, Mode, SyncTimings};

/// Options passed to the `InkFrame` constructor.
///
/// Applied on top of the configuration read from the page URL; absent fields
/// keep the URL's value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameOptions {
    #[tsify(optional)]
    pub read_only: Option<bool>,
    #[tsify(optional)]
    pub track_height: Option<bool>,
    #[tsify(optional)]
    pub placeholder: Option<String>,
    /// Millisecond overrides; unspecified timings keep their defaults.
    #[tsify(optional, type = "Partial<Record<string, number>>")]
    pub timings: Option<SyncTimings>,
}

impl FrameOptions {
    pub fn apply(self, config: &mut FrameConfig) {
        if let Some(read_only) = self.read_only {
            config.mode = if read_only {
                Mode::ReadOnly
            } else {
                Mode::Editable
            };
        }
        if let Some(track_height) = self.track_height {
            config.track_height = track_height;
        }
        if self.placeholder.is_some() {
            config.placeholder = self.placeholder;
        }
        if let Some(timings) = self.timings {
            config.timings = timings;
        }
    }
}

/// What the editing framework should enable for this frame.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsAffordances {
    pub editable: bool,
    pub toolbar: bool,
    pub emit_content_changes: bool,
    pub placeholder: Option<String>,
    pub open_links_on_click: bool,
    pub link_click_selection: bool,
    pub image_upload: bool,
    pub selection_highlight: bool,
    pub collapsible_click_toggle: bool,
    pub measuring_container: bool,
    pub editor_class: String,
    pub wrapper_class: String,
    pub content_class: String,
}

impl From<&Affordances> for JsAffordances {
    fn from(a: &Affordances) -> Self {
        Self {
            editable: a.editable,
            toolbar: a.toolbar,
            emit_content_changes: a.emit_content_changes,
            placeholder: a.placeholder.clone(),
            open_links_on_click: a.open_links_on_click,
            link_click_selection: a.link_click_selection,
            image_upload: a.image_upload,
            selection_highlight: a.selection_highlight,
            collapsible_click_toggle: a.collapsible_click_toggle,
            measuring_container: a.measuring_container,
            editor_class: a.editor_class.to_string(),
            wrapper_class: a.wrapper_class.to_string(),
            content_class: a.content_class.to_string(),
        }
    }
}
