//! Error type shared by both plugin contracts.

use crate::types::RejectionMessage;

/// Errors a plugin operation can report.
///
/// Both the legacy and the current contract speak this type, so errors from
/// a wrapped plugin reach the caller of an adapter without translation.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A transfer or message field is missing or malformed.
    #[error("invalid fields: {0}")]
    InvalidFields(String),

    /// A transfer handler is already registered.
    #[error("transfer handler is already registered")]
    TransferHandlerAlreadyRegistered,

    /// A request handler is already registered.
    #[error("request handler is already registered")]
    RequestHandlerAlreadyRegistered,

    /// No local account or connector can receive a transfer to this address.
    #[error("no valid destination for {destination}")]
    NoValidDestination { destination: String },

    /// The transfer was rejected or cancelled; the reason is as reported.
    #[error("transfer rejected: {0}")]
    Rejected(RejectionMessage),

    /// The plugin is not connected to its ledger.
    #[error("not connected")]
    NotConnected,

    /// Generic error with message.
    #[error("{0}")]
    Other(String),

    /// Transport or ledger failure from the plugin implementation.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PluginError {
    /// Create a generic error from anything displayable.
    pub fn other(message: impl Into<String>) -> Self {
        PluginError::Other(message.into())
    }
}

impl From<std::io::Error> for PluginError {
    fn from(e: std::io::Error) -> Self {
        PluginError::Transport(Box::new(e))
    }
}
