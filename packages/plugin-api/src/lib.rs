//! Ledger plugin contracts.
//!
//! Two generations of the same contract live here:
//! - `PluginV1`: event-driven. Outcomes of outgoing transfers and the arrival
//!   of incoming ones are reported as [`LegacyEvent`]s; addresses are split
//!   into a ledger prefix and a local `to` account.
//! - `PluginV2`: call-and-await. `send_transfer` resolves with the
//!   fulfillment; incoming transfers go to a single [`TransferHandler`].
//!
//! Both speak [`PluginError`], so an adapter between them can forward errors
//! verbatim.
//!
//! # Testing
//!
//! Enable the `test-utils` feature for `MockLegacyPlugin`, a recording
//! in-memory `PluginV1`:
//!
//! ```toml
//! [dev-dependencies]
//! ilp-compat-plugin-api = { version = "0.1", features = ["test-utils"] }
//! ```

pub use bytes::Bytes;

mod error;
mod types;
mod v1;
mod v2;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::PluginError;
pub use types::{FulfillmentInfo, LedgerInfo, LegacyTransfer, Message, RejectionMessage, Transfer};
pub use v1::{LegacyEvent, LegacyEventListener, PluginV1};
pub use v2::{handler_fn, FnHandler, PluginEvent, PluginV2, RequestHandler, TransferHandler};
