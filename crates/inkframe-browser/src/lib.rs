//! Browser DOM layer for the inkframe editor frame.
//!
//! Implements the core's `FrameHost` over `web-sys` and runs a
//! `FrameSession` on the browser event loop. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `host`: DOM measurement, node keys, observer ownership
//! - `observe`: RAII `ResizeObserver` / `MutationObserver` handles
//! - `messaging`: `postMessage` encoding and the `message` listener
//! - `driver`: session ownership, event forwarding, wake-up timer
//! - `details`: collapsible block click handling for read-only frames
//! - `query`: configuration from the page URL
//!
//! # Re-exports
//!
//! This crate re-exports `inkframe-core` for convenience, so consumers
//! only need to depend on `inkframe-browser`.

// Re-export core crate
pub use inkframe_core;
pub use inkframe_core::*;

pub mod details;
pub mod driver;
pub mod host;
pub mod messaging;
pub mod observe;
pub mod query;

pub use driver::FrameDriver;
pub use host::{BrowserHost, EventSink, HostEvent, NodeRegistry};
pub use query::{config_from_location, config_from_search};
