//! Error types for the adapter layer.

use ilp_compat_plugin_api::PluginError;

/// Errors raised inside the adapter.
///
/// Contract-level failures are carried as [`PluginError`]; everything else
/// is converted into one at the trait boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The value handed to `compat` does not implement a supported contract.
    #[error("not a plugin: {0}")]
    NotAPlugin(String),

    /// The adapter was created outside a Tokio runtime.
    #[error("no tokio runtime available to run incoming transfer handlers")]
    NoRuntime,

    /// An ILP rejection raised by the adapter itself.
    #[error("{code}: {message}")]
    Interledger { code: &'static str, message: String },

    /// An envelope failed to decode.
    #[error("packet error: {0}")]
    Packet(#[from] ilp_compat_packet::Error),

    /// A base64 field failed to decode.
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// An expiry timestamp failed to parse.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] chrono::ParseError),

    /// The transfer handler panicked or was cancelled.
    #[error("transfer handler failed: {0}")]
    HandlerPanicked(String),

    /// Error from the wrapped plugin or the transfer handler.
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

impl Error {
    /// The ILP error code to report when this error rejects a transfer.
    pub fn ilp_code(&self) -> &'static str {
        match self {
            Error::Interledger { code, .. } => *code,
            Error::Packet(_) | Error::Base64(_) | Error::Timestamp(_) => "F01",
            Error::Plugin(PluginError::InvalidFields(_)) => "F01",
            _ => "F99",
        }
    }

    /// The ILP error name matching [`Error::ilp_code`].
    pub fn ilp_name(&self) -> &'static str {
        match self.ilp_code() {
            "F00" => "Bad Request",
            "F01" => "Invalid Packet",
            _ => "Application Error",
        }
    }
}

impl From<Error> for PluginError {
    fn from(e: Error) -> Self {
        match e {
            Error::Plugin(e) => e,
            Error::Packet(_) | Error::Base64(_) | Error::Timestamp(_) => {
                PluginError::InvalidFields(e.to_string())
            }
            other => PluginError::Other(other.to_string()),
        }
    }
}
