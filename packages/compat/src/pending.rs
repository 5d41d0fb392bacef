//! Correlation table for outgoing transfers.
//!
//! Each outgoing send registers a oneshot sender under a fresh transfer id.
//! The terminal event for that id removes the entry and settles the sender,
//! so an id can be matched at most once.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use ilp_compat_plugin_api::{FulfillmentInfo, PluginError};
use tokio::sync::oneshot;
use uuid::Uuid;

/// Correlation identifier of an outgoing transfer.
///
/// Sent to the legacy plugin as the transfer id, in hyphenated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(Uuid);

impl TransferId {
    /// Create a new random TransferId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TransferId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

pub(crate) type Outcome = Result<FulfillmentInfo, PluginError>;

/// Outgoing transfers awaiting a terminal event.
#[derive(Default)]
pub(crate) struct PendingTransfers {
    entries: Mutex<HashMap<TransferId, oneshot::Sender<Outcome>>>,
}

impl PendingTransfers {
    /// Register a new pending transfer and return the receiving half.
    pub(crate) fn insert(&self, id: TransferId) -> oneshot::Receiver<Outcome> {
        let (tx, rx) = oneshot::channel();
        let previous = self.lock().insert(id, tx);
        debug_assert!(previous.is_none(), "transfer id {} reused while pending", id);
        rx
    }

    /// Remove and return the sender for `id`, if it is still pending.
    pub(crate) fn take(&self, id: &TransferId) -> Option<oneshot::Sender<Outcome>> {
        self.lock().remove(id)
    }

    /// Settle the pending transfer `id`. Returns false for unknown ids.
    pub(crate) fn settle(&self, id: &TransferId, outcome: Outcome) -> bool {
        match self.take(id) {
            Some(tx) => {
                if tx.send(outcome).is_err() {
                    tracing::debug!(transfer_id = %id, "caller stopped waiting for transfer");
                }
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TransferId, oneshot::Sender<Outcome>>> {
        // A panic while holding the lock cannot leave the map inconsistent.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn transfer_id_roundtrips_through_string() {
        let id = TransferId::new();
        let parsed: TransferId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(id.to_string().len(), 36);
    }

    #[test]
    fn transfer_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| TransferId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn garbage_is_not_a_transfer_id() {
        assert!("not-a-uuid".parse::<TransferId>().is_err());
    }

    #[tokio::test]
    async fn settle_delivers_outcome_once() {
        let table = PendingTransfers::default();
        let id = TransferId::new();
        let rx = table.insert(id);
        assert_eq!(table.len(), 1);

        let info = FulfillmentInfo {
            fulfillment: Bytes::from_static(b"f"),
            data: Bytes::new(),
        };
        assert!(table.settle(&id, Ok(info.clone())));
        assert!(!table.settle(&id, Err(PluginError::other("late"))));
        assert_eq!(table.len(), 0);

        assert_eq!(rx.await.unwrap().unwrap(), info);
    }

    #[test]
    fn settle_unknown_id_is_ignored() {
        let table = PendingTransfers::default();
        let _rx = table.insert(TransferId::new());
        assert!(!table.settle(&TransferId::new(), Err(PluginError::other("x"))));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn settle_after_caller_left_still_removes() {
        let table = PendingTransfers::default();
        let id = TransferId::new();
        drop(table.insert(id));
        assert!(table.settle(&id, Err(PluginError::other("x"))));
        assert_eq!(table.len(), 0);
    }
}
