//! Height calculation from a layout snapshot.
//!
//! The editing framework renders the document into a primary content node
//! nested inside two wrapper elements. Padding lives on the wrappers, not on
//! the content node, so it is added explicitly. When the content node has no
//! height yet (not rendered, detached), the container scroll height and the
//! last probed rect stand in.

use crate::message::HeightReport;

/// Structural class hooks of the external editing framework.
///
/// The calculator depends on these bit-for-bit; swapping the framework means
/// reproducing them.
pub mod dom_hooks {
    /// The element rendering the rich-text document body.
    pub const CONTENT_NODE_SELECTOR: &str = ".ProseMirror";
    /// Wrapper directly around the content node.
    pub const CONTENT_WRAPPER_SELECTOR: &str = ".simple-editor-content";
    /// Outer editor wrapper.
    pub const OUTER_WRAPPER_SELECTOR: &str = ".simple-editor-wrapper";
}

/// Parse a computed CSS length the way `parseInt` does.
///
/// Leading whitespace and an optional sign are accepted, then digits up to
/// the first non-digit. Anything unparsable is 0, never NaN.
pub fn parse_css_px(value: &str) -> f64 {
    let s = value.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return 0.0;
    }

    let magnitude = rest[..digits]
        .bytes()
        .fold(0.0_f64, |acc, b| acc * 10.0 + f64::from(b - b'0'));

    if negative { -magnitude } else { magnitude }
}

/// Vertical padding of a wrapper element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxPadding {
    pub top: f64,
    pub bottom: f64,
}

impl BoxPadding {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Build from computed-style strings (`"16px"`).
    pub fn from_computed(top: &str, bottom: &str) -> Self {
        Self {
            top: parse_css_px(top),
            bottom: parse_css_px(bottom),
        }
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Measurements of the primary content node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContentMetrics {
    /// Full scrollable height.
    pub scroll_height: f64,
    /// Height of the bounding client rect.
    pub rect_height: f64,
}

/// Measurements of the frame's own container element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerMetrics {
    pub offset_height: f64,
    pub scroll_height: f64,
}

/// Everything the calculator reads from the live layout.
///
/// Always freshly pulled right before a report is built; never cached.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutSnapshot {
    pub content: Option<ContentMetrics>,
    pub content_wrapper_padding: Option<BoxPadding>,
    pub outer_wrapper_padding: Option<BoxPadding>,
    pub container: Option<ContainerMetrics>,
    pub document_scroll_height: f64,
    pub body_scroll_height: f64,
}

impl LayoutSnapshot {
    pub fn has_content_node(&self) -> bool {
        self.content.is_some()
    }

    fn padding(&self) -> f64 {
        self.content_wrapper_padding
            .map(|p| p.vertical())
            .unwrap_or(0.0)
            + self
                .outer_wrapper_padding
                .map(|p| p.vertical())
                .unwrap_or(0.0)
    }
}

/// Total content height: content node scroll height plus wrapper padding,
/// falling back to `max(container scroll height, last rect height)` when
/// that sum is not positive.
pub fn calculate_total_height(layout: &LayoutSnapshot, last_rect_height: f64) -> f64 {
    let content_height = layout.content.map(|c| c.scroll_height).unwrap_or(0.0);
    let total = content_height + layout.padding();

    if total > 0.0 {
        return total;
    }

    let container_scroll = layout.container.map(|c| c.scroll_height).unwrap_or(0.0);
    container_scroll.max(last_rect_height)
}

/// Build the full report sent with every height-bearing message.
pub fn build_report(layout: &LayoutSnapshot, last_rect_height: f64) -> HeightReport {
    let container = layout.container.unwrap_or_default();

    HeightReport {
        height: calculate_total_height(layout, last_rect_height),
        rect_height: last_rect_height,
        container_height: container.offset_height,
        container_scroll_height: container.scroll_height,
        document_scroll_height: layout.document_scroll_height,
        body_scroll_height: layout.body_scroll_height,
        prose_mirror_height: layout.content.map(|c| c.scroll_height),
        prose_mirror_offset_height: layout.content.map(|c| c.rect_height),
        has_prose_mirror_element: layout.content.map(|_| true),
    }
}
