//! Owned `ResizeObserver` / `MutationObserver` registrations.
//!
//! Each handle keeps its JS callback alive for as long as the observer is
//! connected and disconnects on drop, so releasing an observation is just
//! dropping the handle.

use gloo_timers::callback::Interval;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MutationObserver, MutationObserverInit, ResizeObserver, ResizeObserverEntry};

use inkframe_core::{MeasuredRect, MutationOptions, PlatformError};

/// Size observation of one element.
///
/// Uses `ResizeObserver` where the browser has it and falls back to polling
/// the bounding rect on an interval otherwise.
pub enum ResizeHandle {
    Observer {
        observer: ResizeObserver,
        _callback: Closure<dyn FnMut(js_sys::Array)>,
    },
    Polling(Interval),
}

impl ResizeHandle {
    /// Start observing `element`, calling `on_resize` with its size.
    pub fn observe(
        element: &Element,
        poll_interval_ms: u32,
        on_resize: impl FnMut(MeasuredRect) + 'static,
    ) -> Result<Self, PlatformError> {
        if !resize_observer_supported() {
            tracing::debug!(poll_interval_ms, "ResizeObserver missing, polling element size");
            return Ok(Self::poll(element, poll_interval_ms, on_resize));
        }
        Self::observer(element, on_resize)
    }

    fn observer(
        element: &Element,
        mut on_resize: impl FnMut(MeasuredRect) + 'static,
    ) -> Result<Self, PlatformError> {
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            // One element per observer: the last entry of a batch is current.
            let Some(entry) = entries.iter().last() else {
                return;
            };
            let entry: ResizeObserverEntry = entry.unchecked_into();
            let rect = entry.content_rect();
            on_resize(MeasuredRect::new(rect.width(), rect.height()));
        });

        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| PlatformError::from(format!("ResizeObserver unavailable: {:?}", e)))?;
        observer.observe(element);

        Ok(Self::Observer {
            observer,
            _callback: callback,
        })
    }

    fn poll(
        element: &Element,
        interval_ms: u32,
        mut on_resize: impl FnMut(MeasuredRect) + 'static,
    ) -> Self {
        let element = element.clone();
        let mut last = None;
        Self::Polling(Interval::new(interval_ms.max(1), move || {
            let rect = element.get_bounding_client_rect();
            let rect = MeasuredRect::new(rect.width(), rect.height());
            if last != Some(rect) {
                last = Some(rect);
                on_resize(rect);
            }
        }))
    }
}

impl Drop for ResizeHandle {
    fn drop(&mut self) {
        // Intervals cancel themselves on drop.
        if let Self::Observer { observer, .. } = self {
            observer.disconnect();
        }
    }
}

fn resize_observer_supported() -> bool {
    js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("ResizeObserver")).unwrap_or(false)
}

pub struct MutationHandle {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl MutationHandle {
    /// Start observing the subtree of `node` with `options`.
    pub fn observe(
        node: &web_sys::Node,
        options: MutationOptions,
        mut on_mutation: impl FnMut() + 'static,
    ) -> Result<Self, PlatformError> {
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |records: js_sys::Array| {
            if records.length() > 0 {
                on_mutation();
            }
        });

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| PlatformError::from(format!("MutationObserver unavailable: {:?}", e)))?;
        observer
            .observe_with_options(node, &observer_init(options))
            .map_err(|e| PlatformError::from(format!("MutationObserver.observe failed: {:?}", e)))?;

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for MutationHandle {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

fn observer_init(options: MutationOptions) -> MutationObserverInit {
    let init = MutationObserverInit::new();
    init.set_child_list(options.child_list);
    init.set_subtree(options.subtree);
    init.set_attributes(options.attributes);
    init.set_character_data(options.character_data);
    if !options.attribute_filter.is_empty() {
        let filter: js_sys::Array = options
            .attribute_filter
            .iter()
            .map(|name| JsValue::from_str(name))
            .collect();
        init.set_attribute_filter(&filter);
    }
    init
}
