//! ILP envelope codec.
//!
//! Encodes and decodes the two envelopes the compatibility adapter moves
//! between plugin interfaces:
//! - `IlpPayment`: destination address, amount and application data, carried
//!   in the `ilp` field of a legacy transfer
//! - `IlpFulfillment`: the response data returned with a fulfillment
//!
//! Both use the same layout as deployed ledger plugins: a type byte followed
//! by OER-encoded contents. Encoding is pure; decoding validates the type
//! byte and field lengths.
//!
//! # Example
//!
//! ```rust
//! use ilp_compat_packet::{IlpFulfillment, Bytes};
//!
//! let response = IlpFulfillment { data: Bytes::from_static(b"thanks") };
//! let wire = response.to_bytes();
//! assert_eq!(IlpFulfillment::from_bytes(&wire).unwrap().data, "thanks");
//! ```

pub use bytes::Bytes;

mod envelope;
mod error;
mod fulfillment;
mod oer;
mod payment;

pub use envelope::{packet_type, TYPE_ILP_FULFILLMENT, TYPE_ILP_PAYMENT};
pub use error::Error;
pub use fulfillment::IlpFulfillment;
pub use payment::IlpPayment;
