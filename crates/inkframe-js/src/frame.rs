//! InkFrame - the frame controller exposed to JavaScript.

use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use inkframe_browser::{FrameConfig, FrameDriver, config_from_location};

use crate::types::{FrameOptions, JsAffordances};

/// One embedded editor frame.
///
/// Configuration is read from the page URL (`isReadOnly`, `isCalHeight`,
/// `placeholder`) and may be overridden by constructor options.
#[wasm_bindgen]
pub struct InkFrame {
    config: FrameConfig,
    driver: Option<FrameDriver>,
}

#[wasm_bindgen]
impl InkFrame {
    /// Create a frame. `options` may be `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<InkFrame, JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("No window"))?;
        let mut config = config_from_location(&window)
            .map_err(|e| JsError::new(&format!("Invalid URL query: {}", e)))?;

        if !options.is_undefined() && !options.is_null() {
            let options: FrameOptions = serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsError::new(&format!("Invalid options: {}", e)))?;
            options.apply(&mut config);
        }
        config
            .validate()
            .map_err(|e| JsError::new(&e.to_string()))?;

        Ok(Self {
            config,
            driver: None,
        })
    }

    #[wasm_bindgen(js_name = isReadOnly)]
    pub fn is_read_only(&self) -> bool {
        self.config.mode.is_read_only()
    }

    /// Which editor features the hosting page should enable.
    #[wasm_bindgen]
    pub fn affordances(&self) -> JsAffordances {
        JsAffordances::from(&self.config.affordances())
    }

    // === Mounting ===

    /// Mount into the measuring container and announce readiness.
    ///
    /// `onContent` is called with the serialized content of every
    /// `SET_INITIAL_CONTENT` message; it should load it into the editor.
    #[wasm_bindgen]
    pub fn mount(
        &mut self,
        container: &HtmlElement,
        on_content: Option<js_sys::Function>,
    ) -> Result<(), JsError> {
        if self.driver.is_some() {
            return Err(JsError::new("Frame is already mounted"));
        }

        let driver = FrameDriver::mount(container.clone(), self.config.clone())
            .map_err(|e| JsError::new(&format!("Mount failed: {}", e)))?;

        if let Some(callback) = on_content {
            driver.set_content_loader(move |content| {
                let this = JsValue::null();
                if let Err(e) = callback.call1(&this, &JsValue::from_str(content)) {
                    tracing::warn!("onContent threw: {:?}", e);
                }
            });
        }

        self.driver = Some(driver);
        Ok(())
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.driver.is_some()
    }

    /// Release observers, timers and listeners.
    #[wasm_bindgen]
    pub fn unmount(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.unmount();
        }
    }

    // === Editor callbacks ===

    /// The editor finished rendering newly loaded content.
    #[wasm_bindgen(js_name = contentRendered)]
    pub fn content_rendered(&self) {
        if let Some(driver) = &self.driver {
            driver.content_rendered();
        }
    }

    /// The user edited the document; `content` is its serialized form.
    #[wasm_bindgen(js_name = localEdit)]
    pub fn local_edit(&self, content: String) {
        if let Some(driver) = &self.driver {
            driver.local_edit(content);
        }
    }

    /// Toggle height tracking in an editable frame.
    #[wasm_bindgen(js_name = setHeightTracking)]
    pub fn set_height_tracking(&mut self, enabled: bool) {
        self.config.track_height = enabled;
        if let Some(driver) = &self.driver {
            driver.set_height_tracking(enabled);
        }
    }

    #[wasm_bindgen(js_name = isTrackingActive)]
    pub fn is_tracking_active(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|driver| driver.is_tracking_active())
    }
}
