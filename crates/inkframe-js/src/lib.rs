//! WASM bindings for the inkframe editor frame.
//!
//! The hosting page creates one `InkFrame`, mounts it into the measuring
//! container, and wires the editing framework's callbacks to
//! `contentRendered` / `localEdit`. Everything else (parent messaging,
//! observers, height reports) runs inside the frame.

mod frame;
mod types;

pub use frame::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and the console tracing subscriber.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    // A host page may have installed its own subscriber already.
    let _ = set_global_default(Registry::default().with(wasm_layer));
}
