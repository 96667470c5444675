//! Runs a `FrameSession` on the browser event loop.
//!
//! The driver owns the session and the listeners feeding it. Every entry
//! point (parent message, observer callback, editor callback, timer wake-up)
//! borrows the session, forwards the event with the current time, and then
//! re-arms a single `setTimeout` for the session's next deadline.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use web_sys::HtmlElement;
use web_time::Instant;

use inkframe_core::{
    Affordances, Dispatch, FrameConfig, FrameError, FrameSession, LoadState, PlatformError,
    ProbeStrategy,
};

use crate::details;
use crate::host::{BrowserHost, HostEvent};
use crate::messaging;

type ContentLoader = Rc<dyn Fn(&str)>;

struct DriverState {
    session: FrameSession<BrowserHost>,
    wake: Option<Timeout>,
    // The timeout currently running its callback; dropped on the next wake.
    spent: Option<Timeout>,
}

struct Shared {
    state: RefCell<DriverState>,
    loader: RefCell<Option<ContentLoader>>,
}

impl Shared {
    /// Run `f` against the session, then re-arm the wake-up timer.
    ///
    /// Re-entrant calls (a callback firing while the session is borrowed)
    /// are dropped with a warning rather than panicking.
    fn with_session<R>(
        self: &Rc<Self>,
        f: impl FnOnce(&mut FrameSession<BrowserHost>, Instant) -> R,
    ) -> Option<R> {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            tracing::warn!("frame session busy, dropping re-entrant event");
            return None;
        };
        let out = f(&mut state.session, Instant::now());
        self.rearm(&mut state);
        Some(out)
    }

    fn rearm(self: &Rc<Self>, state: &mut DriverState) {
        let Some(deadline) = state.session.next_deadline() else {
            state.wake = None;
            return;
        };
        let delay = deadline.saturating_duration_since(Instant::now());
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);

        let weak = Rc::downgrade(self);
        state.wake = Some(Timeout::new(millis, move || wake(&weak)));
    }

    fn dispatch_host_event(self: &Rc<Self>, event: HostEvent) {
        self.with_session(|session, now| match event {
            HostEvent::Resized { target, node, rect } => {
                session.resize_observed(now, target, node, rect)
            }
            HostEvent::Mutated { target, node } => session.mutation_observed(now, target, node),
        });
    }

    fn dispatch_message(self: &Rc<Self>, payload: serde_json::Value) {
        let dispatch = self.with_session(|session, now| session.handle_raw_inbound(now, payload));
        match dispatch {
            Some(Ok(Dispatch::LoadContent(content))) => {
                // Cloned out so the loader may call back into the driver.
                let loader = self.loader.borrow().clone();
                match loader {
                    Some(load) => load(&content),
                    None => tracing::debug!("content arrived before a loader was installed"),
                }
            }
            Some(Err(e)) => tracing::warn!("rejected parent message: {}", e),
            _ => {}
        }
    }
}

fn wake(weak: &Weak<Shared>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(mut state) = shared.state.try_borrow_mut() else {
        tracing::warn!("frame session busy at wake-up");
        return;
    };
    state.spent = state.wake.take();
    state.session.advance(Instant::now());
    shared.rearm(&mut state);
}

/// A mounted frame: session, host, listeners and wake-up timer.
///
/// Dropping the driver (or calling [`FrameDriver::unmount`]) releases every
/// observer, listener and timer.
pub struct FrameDriver {
    shared: Rc<Shared>,
    affordances: Affordances,
    _message_listener: EventListener,
    _details_listener: Option<EventListener>,
}

impl FrameDriver {
    /// Mount a frame into `container` and announce readiness to the parent.
    pub fn mount(container: HtmlElement, config: FrameConfig) -> Result<Self, FrameError> {
        Self::mount_with_strategy(container, config, ProbeStrategy::default())
    }

    pub fn mount_with_strategy(
        container: HtmlElement,
        config: FrameConfig,
        strategy: ProbeStrategy,
    ) -> Result<Self, FrameError> {
        config.validate()?;
        let window = web_sys::window().ok_or(PlatformError::from("no window"))?;
        let document = window.document().ok_or(PlatformError::from("no document"))?;
        let affordances = config.affordances();

        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let sink_target = weak.clone();
            let sink = Rc::new(move |event: HostEvent| {
                if let Some(shared) = sink_target.upgrade() {
                    shared.dispatch_host_event(event);
                }
            });
            let host = BrowserHost::new(window.clone(), document, container.clone(), sink)
                .with_poll_intervals(&config.timings);
            Shared {
                state: RefCell::new(DriverState {
                    session: FrameSession::with_strategy(host, config, strategy),
                    wake: None,
                    spent: None,
                }),
                loader: RefCell::new(None),
            }
        });

        let message_listener = {
            let weak = Rc::downgrade(&shared);
            messaging::listen(&window, move |payload| {
                if let Some(shared) = weak.upgrade() {
                    shared.dispatch_message(payload);
                }
            })
        };

        let details_listener = affordances
            .collapsible_click_toggle
            .then(|| details::listen(&container));

        shared.with_session(|session, _| session.mount());
        tracing::info!(editable = affordances.editable, "frame driver mounted");

        Ok(Self {
            shared,
            affordances,
            _message_listener: message_listener,
            _details_listener: details_listener,
        })
    }

    /// Install the callback that pushes inbound content into the editor.
    pub fn set_content_loader(&self, loader: impl Fn(&str) + 'static) {
        *self.shared.loader.borrow_mut() = Some(Rc::new(loader));
    }

    pub fn affordances(&self) -> &Affordances {
        &self.affordances
    }

    /// The editing framework finished rendering content.
    pub fn content_rendered(&self) {
        self.shared
            .with_session(|session, now| session.content_rendered(now));
    }

    /// A local edit in the editing framework.
    pub fn local_edit(&self, content: String) {
        self.shared
            .with_session(|session, now| session.local_edit(now, content));
    }

    pub fn set_height_tracking(&self, enabled: bool) {
        self.shared
            .with_session(|session, now| session.set_height_tracking(now, enabled));
    }

    pub fn load_state(&self) -> LoadState {
        self.shared.state.borrow().session.load_state()
    }

    pub fn is_tracking_active(&self) -> bool {
        self.shared.state.borrow().session.is_tracking_active()
    }

    pub fn live_observers(&self) -> usize {
        self.shared.state.borrow().session.host().live_observers()
    }

    /// Tear down observers and timers. Listeners go with the driver.
    pub fn unmount(&self) {
        if let Ok(mut state) = self.shared.state.try_borrow_mut() {
            state.session.unmount();
            state.wake = None;
            state.spent = None;
        }
        self.shared.loader.borrow_mut().take();
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        self.unmount();
    }
}
