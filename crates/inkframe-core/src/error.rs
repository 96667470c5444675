//! Error types for the frame core.
//!
//! Most failure modes in the height-sync core are absence, not errors: a
//! missing element measures as zero, a missing parent window skips the send,
//! an unknown message type is ignored. What remains is modelled here.

use miette::Diagnostic;

use crate::platform::PlatformError;

/// Main error type for frame operations.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum FrameError {
    /// A message with a known `type` carried a payload we could not decode.
    #[error("malformed {kind} message: {source}")]
    #[diagnostic(code(inkframe::decode))]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The host platform failed to carry out an operation.
    #[error(transparent)]
    #[diagnostic(code(inkframe::platform))]
    Platform(#[from] PlatformError),

    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    #[diagnostic(code(inkframe::config), help("check the frame URL query and config overrides"))]
    Config(String),
}
