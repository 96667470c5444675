//! Collapsible block state in read-only frames.
//!
//! The editing framework renders collapsible blocks closed, with their open
//! state held in a `data-open` attribute on the block element. In read-only
//! mode the framework's own click handling is disabled, so the platform layer
//! toggles the attribute (and the classes of the chevron and body) directly.
//! The attribute write is an ordinary DOM mutation and reaches the mutation
//! watcher like any other.

pub const DETAILS_NODE: &str = ".details-node";
pub const DETAILS_SUMMARY: &str = ".details-summary";
pub const DETAILS_CHEVRON: &str = ".details-chevron";
pub const DETAILS_CONTENT: &str = ".details-content";
pub const OPEN_ATTR: &str = "data-open";

/// Class toggled on the chevron and body when open.
pub const OPEN_CLASS: &str = "open";
/// Class carried by the body when closed.
pub const CLOSED_CLASS: &str = "closed";

/// Open state as read from `data-open`. Anything but `"true"` is closed.
pub fn is_open(attr: Option<&str>) -> bool {
    attr == Some("true")
}

/// Result of toggling a collapsible block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Toggled {
    pub open: bool,
    /// New `data-open` value.
    pub attr: &'static str,
    /// Body class to add.
    pub add_class: &'static str,
    /// Body class to remove.
    pub remove_class: &'static str,
}

/// Flip the state stored in a `data-open` attribute.
pub fn toggle_open_attr(attr: Option<&str>) -> Toggled {
    if is_open(attr) {
        Toggled {
            open: false,
            attr: "false",
            add_class: CLOSED_CLASS,
            remove_class: OPEN_CLASS,
        }
    } else {
        Toggled {
            open: true,
            attr: "true",
            add_class: OPEN_CLASS,
            remove_class: CLOSED_CLASS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attr_is_closed() {
        assert!(!is_open(None));
        assert!(!is_open(Some("")));
        assert!(!is_open(Some("TRUE")));
    }

    #[test]
    fn test_toggle_opens_closed_block() {
        let toggled = toggle_open_attr(Some("false"));
        assert!(toggled.open);
        assert_eq!(toggled.attr, "true");
        assert_eq!(toggled.add_class, "open");
        assert_eq!(toggled.remove_class, "closed");
    }

    #[test]
    fn test_toggle_twice_returns_to_closed() {
        let first = toggle_open_attr(None);
        let second = toggle_open_attr(Some(first.attr));
        assert!(!second.open);
        assert_eq!(second.attr, "false");
        assert_eq!(second.add_class, "closed");
    }
}
