//! In-memory legacy plugin for tests.
//!
//! `MockLegacyPlugin` records every call made to it and lets the test emit
//! events as the ledger would. Calls are queued in order; `next_call` waits
//! for the next one, which makes it usable with adapters that call the
//! plugin from background tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::PluginError;
use crate::types::{LedgerInfo, LegacyTransfer, Message, RejectionMessage};
use crate::v1::{LegacyEvent, LegacyEventListener, PluginV1};
use crate::v2::RequestHandler;

/// A call received by the mock plugin.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Connect,
    Disconnect,
    SendTransfer(LegacyTransfer),
    FulfillCondition {
        transfer_id: String,
        fulfillment: String,
        ilp: String,
    },
    RejectIncomingTransfer {
        transfer_id: String,
        reason: RejectionMessage,
    },
    SendRequest(Message),
}

/// A scriptable legacy plugin.
pub struct MockLegacyPlugin {
    info: Mutex<LedgerInfo>,
    version: u16,
    connected: AtomicBool,
    listeners: Mutex<Vec<Arc<dyn LegacyEventListener>>>,
    request_handler: Mutex<Option<Arc<dyn RequestHandler>>>,
    send_failure: Mutex<Option<String>>,
    calls_tx: mpsc::UnboundedSender<MockCall>,
    calls_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<MockCall>>,
}

impl MockLegacyPlugin {
    /// Create a mock reporting the given ledger prefix and connectors.
    pub fn new(prefix: &str, connectors: &[&str]) -> Self {
        Self::with_version(prefix, connectors, 1)
    }

    /// Create a mock that reports an arbitrary contract version.
    pub fn with_version(prefix: &str, connectors: &[&str], version: u16) -> Self {
        let (calls_tx, calls_rx) = mpsc::unbounded_channel();
        Self {
            info: Mutex::new(LedgerInfo {
                prefix: prefix.to_string(),
                connectors: connectors.iter().map(|c| c.to_string()).collect(),
                ..Default::default()
            }),
            version,
            connected: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
            request_handler: Mutex::new(None),
            send_failure: Mutex::new(None),
            calls_tx,
            calls_rx: tokio::sync::Mutex::new(calls_rx),
        }
    }

    /// Deliver an event to every listener, in subscription order.
    pub fn emit(&self, event: LegacyEvent) {
        let listeners = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            listener.on_event(&event);
        }
    }

    /// Make every following `send_transfer` fail with this message.
    pub fn fail_sends(&self, message: &str) {
        *self.send_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_info(&self, info: LedgerInfo) {
        *self.info.lock().unwrap() = info;
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Wait for the next recorded call.
    pub async fn next_call(&self) -> Option<MockCall> {
        self.calls_rx.lock().await.recv().await
    }

    /// Take the next recorded call if one is already queued.
    pub fn try_next_call(&self) -> Option<MockCall> {
        self.calls_rx.try_lock().ok()?.try_recv().ok()
    }

    fn record(&self, call: MockCall) {
        // The receiver lives as long as self.
        let _ = self.calls_tx.send(call);
    }
}

#[async_trait]
impl PluginV1 for MockLegacyPlugin {
    fn version(&self) -> u16 {
        self.version
    }

    async fn connect(&self) -> Result<(), PluginError> {
        self.record(MockCall::Connect);
        self.connected.store(true, Ordering::SeqCst);
        self.emit(LegacyEvent::Connect);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), PluginError> {
        self.record(MockCall::Disconnect);
        self.connected.store(false, Ordering::SeqCst);
        self.emit(LegacyEvent::Disconnect);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn get_info(&self) -> LedgerInfo {
        self.info.lock().unwrap().clone()
    }

    async fn send_transfer(&self, transfer: LegacyTransfer) -> Result<(), PluginError> {
        self.record(MockCall::SendTransfer(transfer));
        match self.send_failure.lock().unwrap().clone() {
            Some(message) => Err(PluginError::Other(message)),
            None => Ok(()),
        }
    }

    async fn fulfill_condition(
        &self,
        transfer_id: &str,
        fulfillment: &str,
        ilp: &str,
    ) -> Result<(), PluginError> {
        self.record(MockCall::FulfillCondition {
            transfer_id: transfer_id.to_string(),
            fulfillment: fulfillment.to_string(),
            ilp: ilp.to_string(),
        });
        Ok(())
    }

    async fn reject_incoming_transfer(
        &self,
        transfer_id: &str,
        reason: RejectionMessage,
    ) -> Result<(), PluginError> {
        self.record(MockCall::RejectIncomingTransfer {
            transfer_id: transfer_id.to_string(),
            reason,
        });
        Ok(())
    }

    async fn send_request(&self, message: Message) -> Result<Message, PluginError> {
        self.record(MockCall::SendRequest(message.clone()));
        let handler = self.request_handler.lock().unwrap().clone();
        match handler {
            Some(handler) => handler.handle_request(message).await,
            None => Err(PluginError::other("no request handler on the remote side")),
        }
    }

    fn register_request_handler(
        &self,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), PluginError> {
        let mut slot = self.request_handler.lock().unwrap();
        if slot.is_some() {
            return Err(PluginError::RequestHandlerAlreadyRegistered);
        }
        *slot = Some(handler);
        Ok(())
    }

    fn deregister_request_handler(&self) {
        *self.request_handler.lock().unwrap() = None;
    }

    fn subscribe(&self, listener: Arc<dyn LegacyEventListener>) {
        self.listeners.lock().unwrap().push(listener);
    }
}
