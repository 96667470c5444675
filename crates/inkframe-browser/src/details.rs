//! Click-to-toggle for collapsible blocks in read-only frames.
//!
//! One delegated listener on the container handles every block, including
//! ones rendered after mount.

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use inkframe_core::details::{
    DETAILS_CHEVRON, DETAILS_CONTENT, DETAILS_NODE, DETAILS_SUMMARY, OPEN_ATTR, OPEN_CLASS,
};
use inkframe_core::{Toggled, toggle_open_attr};

pub fn listen(container: &HtmlElement) -> EventListener {
    EventListener::new_with_options(
        container,
        "click",
        EventListenerOptions::enable_prevent_default(),
        |event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Some(summary) = target.closest(DETAILS_SUMMARY).ok().flatten() else {
                return;
            };
            let Some(block) = summary.closest(DETAILS_NODE).ok().flatten() else {
                return;
            };
            event.prevent_default();
            event.stop_propagation();

            let toggled = toggle(&block);
            tracing::trace!(open = toggled.open, "collapsible block toggled");
        },
    )
}

/// Flip the open state of a `.details-node` element in place.
pub fn toggle(block: &Element) -> Toggled {
    let toggled = toggle_open_attr(block.get_attribute(OPEN_ATTR).as_deref());
    let _ = block.set_attribute(OPEN_ATTR, toggled.attr);

    if let Some(chevron) = block.query_selector(DETAILS_CHEVRON).ok().flatten() {
        let _ = chevron
            .class_list()
            .toggle_with_force(OPEN_CLASS, toggled.open);
    }
    if let Some(body) = block.query_selector(DETAILS_CONTENT).ok().flatten() {
        let classes = body.class_list();
        let _ = classes.remove_1(toggled.remove_class);
        let _ = classes.add_1(toggled.add_class);
    }
    toggled
}
