//! Error types for the packet codec.

/// Errors that can occur while decoding an envelope.
///
/// Encoding never fails: every in-memory packet has a valid wire form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The buffer ended before a field was complete.
    #[error("unexpected end of packet")]
    UnexpectedEnd,

    /// The envelope carries a different packet type.
    #[error("unexpected packet type: expected {expected}, got {actual}")]
    UnexpectedType { expected: u8, actual: u8 },

    /// A length prefix was malformed or too large for this platform.
    #[error("invalid length prefix")]
    InvalidLengthPrefix,

    /// Bytes remained after the envelope contents.
    #[error("{0} trailing bytes after packet")]
    TrailingBytes(usize),

    /// The account address is not ASCII.
    #[error("account address is not ASCII")]
    NonAsciiAccount,
}
