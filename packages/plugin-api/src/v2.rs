//! The current (version 2) plugin contract.
//!
//! Outgoing transfers are a single awaited call that resolves with the
//! fulfillment or fails with the rejection. Incoming transfers are answered
//! by one registered [`TransferHandler`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::PluginError;
use crate::types::{FulfillmentInfo, LedgerInfo, Message, Transfer};

/// Lifecycle events a current-interface plugin broadcasts.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginEvent {
    Connect,
    Disconnect,
    Error { message: String },
    InfoChange(LedgerInfo),
}

/// Decides the fate of an incoming transfer.
///
/// Returning `Ok` fulfills the transfer; any error rejects it.
#[async_trait]
pub trait TransferHandler: Send + Sync {
    async fn handle_transfer(&self, transfer: Transfer) -> Result<FulfillmentInfo, PluginError>;
}

/// Answers incoming request messages.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle_request(&self, message: Message) -> Result<Message, PluginError>;
}

/// The current plugin contract.
#[async_trait]
pub trait PluginV2: Send + Sync {
    /// Contract version this plugin implements.
    fn version(&self) -> u16 {
        2
    }

    async fn connect(&self) -> Result<(), PluginError>;

    async fn disconnect(&self) -> Result<(), PluginError>;

    fn is_connected(&self) -> bool;

    fn get_info(&self) -> LedgerInfo;

    /// Send a transfer and wait for its outcome.
    async fn send_transfer(&self, transfer: Transfer) -> Result<FulfillmentInfo, PluginError>;

    fn register_transfer_handler(&self, handler: Arc<dyn TransferHandler>)
        -> Result<(), PluginError>;

    fn deregister_transfer_handler(&self);

    async fn send_request(&self, message: Message) -> Result<Message, PluginError>;

    fn register_request_handler(&self, handler: Arc<dyn RequestHandler>)
        -> Result<(), PluginError>;

    fn deregister_request_handler(&self);

    /// Receive this plugin's lifecycle events from now on.
    fn subscribe(&self) -> broadcast::Receiver<PluginEvent>;
}

/// Wrap an async closure as a [`TransferHandler`].
///
/// # Example
///
/// ```rust
/// use ilp_compat_plugin_api::{handler_fn, FulfillmentInfo, Transfer, TransferHandler};
///
/// let handler = handler_fn(|transfer: Transfer| async move {
///     Ok(FulfillmentInfo { fulfillment: Default::default(), data: transfer.data })
/// });
/// # let _: &dyn TransferHandler = &handler;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Transfer) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<FulfillmentInfo, PluginError>> + Send + 'static,
{
    FnHandler(f)
}

/// A [`TransferHandler`] built from a closure by [`handler_fn`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> TransferHandler for FnHandler<F>
where
    F: Fn(Transfer) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<FulfillmentInfo, PluginError>> + Send + 'static,
{
    async fn handle_transfer(&self, transfer: Transfer) -> Result<FulfillmentInfo, PluginError> {
        (self.0)(transfer).await
    }
}
