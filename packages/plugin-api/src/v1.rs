//! The legacy (version 1) plugin contract.
//!
//! Legacy plugins report transfer outcomes as events rather than return
//! values. An outgoing transfer is submitted with `send_transfer`, and its
//! fate arrives later as an `outgoing_fulfill`, `outgoing_reject` or
//! `outgoing_cancel` event carrying the same transfer id.
//!
//! Events are delivered to every subscribed [`LegacyEventListener`] in
//! subscription order.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PluginError;
use crate::types::{LedgerInfo, LegacyTransfer, Message, RejectionMessage};
use crate::v2::RequestHandler;

/// An event emitted by a legacy plugin.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyEvent {
    Connect,
    Disconnect,
    Error {
        message: String,
    },
    InfoChange(LedgerInfo),
    OutgoingFulfill {
        transfer: LegacyTransfer,
        /// Base64 fulfillment.
        fulfillment: String,
        /// Base64 `IlpFulfillment` envelope, if the receiver returned data.
        ilp: Option<String>,
    },
    OutgoingReject {
        transfer: LegacyTransfer,
        reason: RejectionMessage,
    },
    OutgoingCancel {
        transfer: LegacyTransfer,
        reason: RejectionMessage,
    },
    IncomingPrepare {
        transfer: LegacyTransfer,
    },
    /// Any other legacy event, identified by name only.
    Other {
        name: String,
    },
}

impl LegacyEvent {
    /// The event name as legacy plugins spell it.
    pub fn name(&self) -> &str {
        match self {
            LegacyEvent::Connect => "connect",
            LegacyEvent::Disconnect => "disconnect",
            LegacyEvent::Error { .. } => "error",
            LegacyEvent::InfoChange(_) => "info_change",
            LegacyEvent::OutgoingFulfill { .. } => "outgoing_fulfill",
            LegacyEvent::OutgoingReject { .. } => "outgoing_reject",
            LegacyEvent::OutgoingCancel { .. } => "outgoing_cancel",
            LegacyEvent::IncomingPrepare { .. } => "incoming_prepare",
            LegacyEvent::Other { name } => name,
        }
    }
}

/// Receives events from a legacy plugin.
///
/// Called synchronously from the plugin's dispatch path; implementations
/// must not block.
pub trait LegacyEventListener: Send + Sync {
    fn on_event(&self, event: &LegacyEvent);
}

/// The legacy plugin contract.
///
/// # Object Safety
///
/// This trait is object-safe: adapters hold `Arc<dyn PluginV1>`.
#[async_trait]
pub trait PluginV1: Send + Sync {
    /// Contract version this plugin implements.
    fn version(&self) -> u16 {
        1
    }

    async fn connect(&self) -> Result<(), PluginError>;

    async fn disconnect(&self) -> Result<(), PluginError>;

    fn is_connected(&self) -> bool;

    fn get_info(&self) -> LedgerInfo;

    /// Submit an outgoing transfer. Success means "accepted by the ledger",
    /// not "completed"; completion arrives as an event.
    async fn send_transfer(&self, transfer: LegacyTransfer) -> Result<(), PluginError>;

    /// Fulfill the condition of an incoming transfer.
    async fn fulfill_condition(
        &self,
        transfer_id: &str,
        fulfillment: &str,
        ilp: &str,
    ) -> Result<(), PluginError>;

    /// Reject an incoming transfer.
    async fn reject_incoming_transfer(
        &self,
        transfer_id: &str,
        reason: RejectionMessage,
    ) -> Result<(), PluginError>;

    async fn send_request(&self, message: Message) -> Result<Message, PluginError>;

    fn register_request_handler(&self, handler: Arc<dyn RequestHandler>)
        -> Result<(), PluginError>;

    fn deregister_request_handler(&self);

    /// Add a listener for this plugin's events.
    fn subscribe(&self, listener: Arc<dyn LegacyEventListener>);
}
