//! The current-interface facade over a legacy plugin.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use ilp_compat_plugin_api::{
    FulfillmentInfo, LedgerInfo, LegacyEvent, LegacyEventListener, LegacyTransfer, Message,
    PluginError, PluginEvent, PluginV1, PluginV2, RejectionMessage, RequestHandler, Transfer,
    TransferHandler,
};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};

use crate::address::delivery_address;
use crate::config::CompatConfig;
use crate::pending::{Outcome, PendingTransfers, TransferId};
use crate::transcode;
use crate::Error;

/// Wraps a legacy plugin to implement the current plugin contract.
///
/// Outgoing transfers are correlated with the legacy plugin's completion
/// events by a generated transfer id. Incoming transfers are decoded, passed
/// to the registered [`TransferHandler`], and answered with a fulfillment or
/// a rejection. Lifecycle events (`connect`, `disconnect`, `error`,
/// `info_change`) are re-broadcast to [`PluginV2::subscribe`]rs.
///
/// # Example
///
/// ```rust,ignore
/// use ilp_compat::CompatPlugin;
///
/// let plugin = CompatPlugin::new(Arc::new(MyLegacyPlugin::new()), Default::default())?;
/// plugin.connect().await?;
/// let outcome = plugin.send_transfer(transfer).await?;
/// ```
pub struct CompatPlugin {
    plugin: Arc<dyn PluginV1>,
    config: CompatConfig,
    pending: PendingTransfers,
    transfer_handler: Mutex<Option<Arc<dyn TransferHandler>>>,
    events: broadcast::Sender<PluginEvent>,
    runtime: Handle,
}

/// Listener registered on the legacy plugin.
///
/// Holds the adapter weakly: the adapter owns the plugin, so a strong
/// reference here would keep both alive forever.
///
/// Legacy plugins have no way to unsubscribe, so the relay stays registered
/// after the adapter is dropped and ignores every event from then on.
struct EventRelay {
    adapter: Weak<CompatPlugin>,
}

impl LegacyEventListener for EventRelay {
    fn on_event(&self, event: &LegacyEvent) {
        if let Some(adapter) = self.adapter.upgrade() {
            adapter.dispatch(event);
        }
    }
}

impl CompatPlugin {
    /// Wrap a legacy plugin.
    ///
    /// Must be called from within a Tokio runtime; incoming transfers are
    /// handled on tasks spawned onto it.
    pub fn new(plugin: Arc<dyn PluginV1>, config: CompatConfig) -> Result<Arc<Self>, Error> {
        let version = plugin.version();
        if version != 1 {
            return Err(Error::NotAPlugin(format!(
                "expected a version 1 plugin, got version {}",
                version
            )));
        }

        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let adapter = Arc::new(Self {
            plugin,
            config,
            pending: PendingTransfers::default(),
            transfer_handler: Mutex::new(None),
            events,
            runtime,
        });

        adapter.plugin.subscribe(Arc::new(EventRelay {
            adapter: Arc::downgrade(&adapter),
        }));

        tracing::info!(prefix = %adapter.plugin.get_info().prefix, "wrapped legacy plugin");
        Ok(adapter)
    }

    /// Get a reference to the wrapped plugin.
    pub fn inner(&self) -> &Arc<dyn PluginV1> {
        &self.plugin
    }

    /// Number of outgoing transfers still waiting for a terminal event.
    pub fn pending_transfers(&self) -> usize {
        self.pending.len()
    }

    fn dispatch(self: &Arc<Self>, event: &LegacyEvent) {
        match event {
            LegacyEvent::Connect => self.reemit(PluginEvent::Connect),
            LegacyEvent::Disconnect => self.reemit(PluginEvent::Disconnect),
            LegacyEvent::Error { message } => self.reemit(PluginEvent::Error {
                message: message.clone(),
            }),
            LegacyEvent::InfoChange(info) => self.reemit(PluginEvent::InfoChange(info.clone())),
            LegacyEvent::OutgoingFulfill {
                transfer,
                fulfillment,
                ilp,
            } => self.on_outgoing_fulfill(transfer, fulfillment, ilp.as_deref()),
            LegacyEvent::OutgoingReject { transfer, reason }
            | LegacyEvent::OutgoingCancel { transfer, reason } => {
                self.on_outgoing_reject(event.name(), transfer, reason)
            }
            LegacyEvent::IncomingPrepare { transfer } => self.on_incoming_prepare(transfer.clone()),
            LegacyEvent::Other { name } => {
                tracing::trace!(event = %name, "ignoring legacy event");
            }
        }
    }

    fn reemit(&self, event: PluginEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn on_outgoing_fulfill(&self, transfer: &LegacyTransfer, fulfillment: &str, ilp: Option<&str>) {
        let Some(tx) = self.take_pending(transfer) else {
            tracing::debug!(transfer_id = %transfer.id, "fulfillment for unknown transfer");
            return;
        };

        let outcome = transcode::decode_fulfillment(fulfillment, ilp).map_err(PluginError::from);
        tracing::debug!(transfer_id = %transfer.id, ok = outcome.is_ok(), "outgoing transfer fulfilled");
        if tx.send(outcome).is_err() {
            tracing::debug!(transfer_id = %transfer.id, "caller stopped waiting for transfer");
        }
    }

    fn on_outgoing_reject(&self, event: &str, transfer: &LegacyTransfer, reason: &RejectionMessage) {
        let Ok(id) = transfer.id.parse::<TransferId>() else {
            return;
        };

        if self
            .pending
            .settle(&id, Err(PluginError::Rejected(reason.clone())))
        {
            tracing::debug!(transfer_id = %id, event, reason = %reason, "outgoing transfer failed");
        }
    }

    fn take_pending(&self, transfer: &LegacyTransfer) -> Option<oneshot::Sender<Outcome>> {
        let id = transfer.id.parse::<TransferId>().ok()?;
        self.pending.take(&id)
    }

    fn on_incoming_prepare(self: &Arc<Self>, transfer: LegacyTransfer) {
        let adapter = Arc::clone(self);
        self.runtime.spawn(async move {
            adapter.handle_incoming(transfer).await;
        });
    }

    async fn handle_incoming(&self, transfer: LegacyTransfer) {
        match self.process_incoming(&transfer).await {
            Ok(info) => {
                let (fulfillment, ilp) = transcode::encode_fulfillment(&info);
                if let Err(e) = self
                    .plugin
                    .fulfill_condition(&transfer.id, &fulfillment, &ilp)
                    .await
                {
                    tracing::warn!(transfer_id = %transfer.id, error = %e, "failed to fulfill incoming transfer");
                }
            }
            Err(e) => {
                tracing::warn!(transfer_id = %transfer.id, error = %e, "rejecting incoming transfer");
                let reason = self.rejection_reason(&e);
                if let Err(e) = self
                    .plugin
                    .reject_incoming_transfer(&transfer.id, reason)
                    .await
                {
                    tracing::warn!(transfer_id = %transfer.id, error = %e, "failed to reject incoming transfer");
                }
            }
        }
    }

    async fn process_incoming(&self, transfer: &LegacyTransfer) -> Result<FulfillmentInfo, Error> {
        let view = transcode::from_legacy(transfer)?;

        let handler = self
            .handler_slot()
            .clone()
            .ok_or_else(|| Error::Interledger {
                code: "F00",
                message: "no transfer handler registered".to_string(),
            })?;

        // Run the handler on its own task so a panic surfaces as a JoinError.
        let decision = self
            .runtime
            .spawn(async move { handler.handle_transfer(view).await })
            .await
            .map_err(|e| Error::HandlerPanicked(e.to_string()))?;

        Ok(decision?)
    }

    fn rejection_reason(&self, e: &Error) -> RejectionMessage {
        if !self.config.forward_rejection_reasons {
            return RejectionMessage::default();
        }

        RejectionMessage {
            code: e.ilp_code().to_string(),
            name: e.ilp_name().to_string(),
            message: e.to_string(),
            triggered_by: self.plugin.get_info().prefix,
            triggered_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            additional_info: serde_json::Value::Null,
        }
    }

    fn handler_slot(&self) -> MutexGuard<'_, Option<Arc<dyn TransferHandler>>> {
        // The slot holds a single Option; a poisoned lock still has a valid value.
        self.transfer_handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PluginV2 for CompatPlugin {
    async fn connect(&self) -> Result<(), PluginError> {
        self.plugin.connect().await
    }

    async fn disconnect(&self) -> Result<(), PluginError> {
        self.plugin.disconnect().await
    }

    fn is_connected(&self) -> bool {
        self.plugin.is_connected()
    }

    fn get_info(&self) -> LedgerInfo {
        self.plugin.get_info()
    }

    async fn send_transfer(&self, transfer: Transfer) -> Result<FulfillmentInfo, PluginError> {
        let id = TransferId::new();
        let info = self.plugin.get_info();

        let to = delivery_address(&info, &transfer.destination).ok_or_else(|| {
            PluginError::NoValidDestination {
                destination: transfer.destination.clone(),
            }
        })?;

        let record = transcode::to_legacy(id, &transfer, &info.prefix, to);
        tracing::debug!(
            transfer_id = %id,
            to = %record.to,
            destination = %transfer.destination,
            "sending transfer"
        );

        let outcome = self.pending.insert(id);
        if let Err(e) = self.plugin.send_transfer(record).await {
            self.pending.take(&id);
            return Err(e);
        }

        outcome
            .await
            .unwrap_or_else(|_| Err(PluginError::other("transfer abandoned before completion")))
    }

    fn register_transfer_handler(
        &self,
        handler: Arc<dyn TransferHandler>,
    ) -> Result<(), PluginError> {
        let mut slot = self.handler_slot();
        if slot.is_some() {
            return Err(PluginError::TransferHandlerAlreadyRegistered);
        }
        *slot = Some(handler);
        tracing::debug!("transfer handler registered");
        Ok(())
    }

    fn deregister_transfer_handler(&self) {
        *self.handler_slot() = None;
    }

    async fn send_request(&self, message: Message) -> Result<Message, PluginError> {
        self.plugin.send_request(message).await
    }

    fn register_request_handler(
        &self,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), PluginError> {
        self.plugin.register_request_handler(handler)
    }

    fn deregister_request_handler(&self) {
        self.plugin.deregister_request_handler()
    }

    fn subscribe(&self) -> broadcast::Receiver<PluginEvent> {
        self.events.subscribe()
    }
}
