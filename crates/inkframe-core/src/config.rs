//! Frame configuration: mode, tracking flag, timings, editor affordances.

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::FrameError;
use crate::types::Mode;

/// Every fixed delay used by the session, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncTimings {
    /// Wait after content is set before measurement begins.
    pub settle_ms: u64,
    /// Delay before answering `REQUEST_HEIGHT`.
    pub height_request_ms: u64,
    /// Delay after the editor reports a finished render.
    pub content_rendered_ms: u64,
    /// Delay after content state changes before a `CONTENT_HEIGHT_UPDATE`.
    pub content_change_ms: u64,
    pub dom_mutation_debounce_ms: u64,
    pub content_mutation_debounce_ms: u64,
    /// Pacing of height reports while the user is typing.
    pub typing_throttle_ms: u64,
    /// Quiet period after the last edit before a content height update.
    pub edit_settle_ms: u64,
    pub content_probe_throttle_ms: u64,
    pub container_probe_throttle_ms: u64,
    pub lookup_retry_ms: u64,
    pub lookup_attempts: u32,
}

impl Default for SyncTimings {
    fn default() -> Self {
        Self {
            settle_ms: 100,
            height_request_ms: 50,
            content_rendered_ms: 50,
            content_change_ms: 200,
            dom_mutation_debounce_ms: 100,
            content_mutation_debounce_ms: 50,
            typing_throttle_ms: 300,
            edit_settle_ms: 100,
            content_probe_throttle_ms: 50,
            container_probe_throttle_ms: 100,
            lookup_retry_ms: 100,
            lookup_attempts: 5,
        }
    }
}

impl SyncTimings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn height_request(&self) -> Duration {
        Duration::from_millis(self.height_request_ms)
    }

    pub fn content_rendered(&self) -> Duration {
        Duration::from_millis(self.content_rendered_ms)
    }

    pub fn content_change(&self) -> Duration {
        Duration::from_millis(self.content_change_ms)
    }

    pub fn dom_mutation_debounce(&self) -> Duration {
        Duration::from_millis(self.dom_mutation_debounce_ms)
    }

    pub fn content_mutation_debounce(&self) -> Duration {
        Duration::from_millis(self.content_mutation_debounce_ms)
    }

    pub fn typing_throttle(&self) -> Duration {
        Duration::from_millis(self.typing_throttle_ms)
    }

    pub fn edit_settle(&self) -> Duration {
        Duration::from_millis(self.edit_settle_ms)
    }

    pub fn content_probe_throttle(&self) -> Duration {
        Duration::from_millis(self.content_probe_throttle_ms)
    }

    pub fn container_probe_throttle(&self) -> Duration {
        Duration::from_millis(self.container_probe_throttle_ms)
    }

    pub fn lookup_retry(&self) -> Duration {
        Duration::from_millis(self.lookup_retry_ms)
    }
}

/// Configuration of one frame session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameConfig {
    pub mode: Mode,
    /// Height tracking in Editable mode. ReadOnly always tracks.
    pub track_height: bool,
    pub placeholder: Option<String>,
    pub timings: SyncTimings,
}

impl FrameConfig {
    pub fn read_only() -> Self {
        Self {
            mode: Mode::ReadOnly,
            ..Self::default()
        }
    }

    pub fn editable(track_height: bool) -> Self {
        Self {
            mode: Mode::Editable,
            track_height,
            ..Self::default()
        }
    }

    /// Build from URL query pairs.
    ///
    /// - `isReadOnly=1` selects ReadOnly mode
    /// - `isCalHeight=1` enables height tracking in Editable mode
    /// - `placeholder=<text>` sets the empty-document placeholder
    ///
    /// Other keys are ignored.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "isReadOnly" if value == "1" => config.mode = Mode::ReadOnly,
                "isCalHeight" if value == "1" => config.track_height = true,
                "placeholder" if !value.is_empty() => {
                    config.placeholder = Some(value.to_string())
                }
                _ => {}
            }
        }
        config
    }

    /// Whether this configuration ever tracks height.
    pub fn tracks_height(&self) -> bool {
        self.mode.is_read_only() || self.track_height
    }

    pub fn validate(&self) -> Result<(), FrameError> {
        if self.timings.lookup_attempts == 0 {
            return Err(FrameError::Config(
                "lookupAttempts must be at least 1".to_string(),
            ));
        }
        // Retry, debounce and throttle windows. A zero window fires every
        // pending timer in the same advance.
        let t = &self.timings;
        let intervals = [
            ("typingThrottleMs", t.typing_throttle_ms),
            ("lookupRetryMs", t.lookup_retry_ms),
            ("contentProbeThrottleMs", t.content_probe_throttle_ms),
            ("containerProbeThrottleMs", t.container_probe_throttle_ms),
            ("domMutationDebounceMs", t.dom_mutation_debounce_ms),
            ("contentMutationDebounceMs", t.content_mutation_debounce_ms),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, ms)| *ms == 0) {
            return Err(FrameError::Config(format!("{} must be positive", name)));
        }
        Ok(())
    }

    pub fn affordances(&self) -> Affordances {
        Affordances::for_config(self)
    }
}

/// Editing surface exposed to the external editing framework.
///
/// Only the gating booleans live here; the framework decides how to honour
/// them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordances {
    pub editable: bool,
    pub toolbar: bool,
    pub emit_content_changes: bool,
    pub placeholder: Option<String>,
    pub open_links_on_click: bool,
    pub link_click_selection: bool,
    pub image_upload: bool,
    pub selection_highlight: bool,
    /// Clicking a collapsible block's summary toggles it.
    pub collapsible_click_toggle: bool,
    /// Render the transparent measuring container around the editor.
    pub measuring_container: bool,
    pub editor_class: &'static str,
    pub wrapper_class: &'static str,
    pub content_class: &'static str,
}

impl Affordances {
    pub fn for_config(config: &FrameConfig) -> Self {
        let editable = config.mode.is_editable();
        Self {
            editable,
            toolbar: editable,
            emit_content_changes: editable,
            placeholder: if editable {
                config.placeholder.clone()
            } else {
                None
            },
            open_links_on_click: !editable,
            link_click_selection: editable,
            image_upload: editable,
            selection_highlight: editable,
            collapsible_click_toggle: !editable,
            measuring_container: config.tracks_height(),
            editor_class: if editable {
                "simple-editor"
            } else {
                "simple-editor readonly-editor"
            },
            wrapper_class: if editable {
                "simple-editor-wrapper editable-wrapper"
            } else {
                "simple-editor-wrapper readonly-wrapper"
            },
            content_class: if editable {
                "simple-editor-content"
            } else {
                "simple-editor-content readonly-content"
            },
        }
    }
}
