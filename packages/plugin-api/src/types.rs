//! Data shapes exchanged across the plugin contracts.
//!
//! Legacy records mirror the JSON objects v1 plugins emit: binary fields are
//! base64 strings and timestamps are ISO-8601 strings. Current-interface
//! records carry decoded bytes and typed timestamps.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A transfer as seen through the current interface.
///
/// Used both for outgoing requests and as the view handed to a transfer
/// handler for incoming transfers.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    /// Amount in ledger units, as a decimal integer string.
    pub amount: String,
    /// Fully qualified ILP address of the final recipient.
    pub destination: String,
    /// Opaque application payload.
    pub data: Bytes,
    /// Hash commitment the fulfillment must match.
    pub execution_condition: Bytes,
    /// Absolute deadline after which the transfer can no longer complete.
    pub expires_at: DateTime<Utc>,
    /// Opaque plugin-specific metadata.
    pub custom: serde_json::Value,
}

/// Outcome of a fulfilled transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FulfillmentInfo {
    /// Preimage of the execution condition.
    pub fulfillment: Bytes,
    /// Response payload from the receiver.
    pub data: Bytes,
}

/// Ledger description reported by a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerInfo {
    /// Address prefix of the ledger, including the trailing separator.
    pub prefix: String,
    /// Addresses of connectors reachable on this ledger.
    #[serde(default)]
    pub connectors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_scale: Option<u32>,
}

/// Reason attached to a rejected or cancelled legacy transfer.
///
/// `Default` is the empty reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionMessage {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub triggered_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_at: Option<String>,
    #[serde(default)]
    pub additional_info: serde_json::Value,
}

impl RejectionMessage {
    /// True if no field carries information.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl fmt::Display for RejectionMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() && self.message.is_empty() {
            return write!(f, "(no reason given)");
        }
        write!(f, "{} {}: {}", self.code, self.name, self.message)
    }
}

/// A transfer record in the legacy plugin's shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTransfer {
    pub id: String,
    pub amount: String,
    /// Local account or connector the ledger credits.
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Ledger prefix the transfer moves on.
    pub ledger: String,
    /// Base64 `IlpPayment` envelope.
    pub ilp: String,
    /// Base64 execution condition.
    pub execution_condition: String,
    /// ISO-8601 expiry timestamp.
    pub expires_at: String,
    #[serde(default)]
    pub custom: serde_json::Value,
}

/// A request/response message passed through unchanged between interfaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub ledger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ilp: Option<String>,
    #[serde(default)]
    pub custom: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_transfer_uses_camel_case() {
        let transfer = LegacyTransfer {
            id: "5857d460-2a46-4545-8311-1539d248e8c8".to_string(),
            amount: "10".to_string(),
            to: "g.usd.bob".to_string(),
            ledger: "g.usd.".to_string(),
            ilp: "AQ==".to_string(),
            execution_condition: "Y29uZGl0aW9u".to_string(),
            expires_at: "2017-12-23T00:00:00.000Z".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&transfer).unwrap();
        assert_eq!(json["executionCondition"], "Y29uZGl0aW9u");
        assert_eq!(json["expiresAt"], "2017-12-23T00:00:00.000Z");
        assert!(json.get("from").is_none());
    }

    #[test]
    fn ledger_info_tolerates_missing_connectors() {
        let info: LedgerInfo = serde_json::from_value(json!({ "prefix": "g.usd." })).unwrap();
        assert_eq!(info.prefix, "g.usd.");
        assert!(info.connectors.is_empty());
    }

    #[test]
    fn rejection_message_from_legacy_json() {
        let reason: RejectionMessage = serde_json::from_value(json!({
            "code": "F99",
            "name": "Application Error",
            "message": "nope",
            "triggeredBy": "g.usd.bob",
            "additionalInfo": {}
        }))
        .unwrap();
        assert_eq!(reason.code, "F99");
        assert_eq!(reason.triggered_by, "g.usd.bob");
        assert!(!reason.is_empty());
        assert_eq!(format!("{}", reason), "F99 Application Error: nope");
    }

    #[test]
    fn default_rejection_is_empty() {
        let reason = RejectionMessage::default();
        assert!(reason.is_empty());
        assert_eq!(format!("{}", reason), "(no reason given)");
    }
}
