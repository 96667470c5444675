//! inkframe-core: height synchronisation and cross-frame messaging for an
//! embedded rich-text editor frame, without browser dependencies.
//!
//! This crate provides:
//! - `OutboundMessage` / `InboundMessage` - the `postMessage` protocol
//! - `calculate_total_height` - the content height rule over a `LayoutSnapshot`
//! - `TimerQueue`, `Debounce`, `Throttle` - deterministic scheduling
//! - `HeightProbe`, `MutationWatcher`, `ContentLookup` - observer bookkeeping
//! - `FrameSession<H>` - the mode/session controller, generic over `FrameHost`
//!
//! Callers pass the current time into every entry point; nothing here reads a
//! clock or spawns a timer.

pub mod config;
pub mod details;
pub mod error;
pub mod height;
pub mod lookup;
pub mod message;
pub mod platform;
pub mod probe;
pub mod schedule;
pub mod session;
pub mod timer;
pub mod types;
pub mod watcher;

pub use config::{Affordances, FrameConfig, SyncTimings};
pub use details::{Toggled, toggle_open_attr};
pub use error::FrameError;
pub use height::{
    BoxPadding, ContainerMetrics, ContentMetrics, LayoutSnapshot, build_report,
    calculate_total_height, dom_hooks, parse_css_px,
};
pub use lookup::{ContentLookup, LookupOutcome, LookupState};
pub use message::{HeightEvent, HeightReport, InboundMessage, OutboundMessage};
pub use platform::{FrameHost, PlatformError};
pub use probe::{HeightProbe, ProbeStrategy};
pub use schedule::{Debounce, Throttle};
pub use session::{Dispatch, FrameSession, SessionTimer};
pub use timer::TimerQueue;
pub use types::{LoadState, MeasuredRect, Mode, NodeKey, Retarget, WatchTarget};
pub use watcher::{MutationOptions, MutationWatcher};
pub use web_time::{Duration, Instant};
