//! Conversions between current-interface transfers and legacy records.
//!
//! Legacy records carry binary fields as base64 and the destination inside
//! an `IlpPayment` envelope; current transfers carry them decoded.
//!
//! Outgoing records are always written with the standard padded alphabet.
//! Incoming fields are read leniently: ledgers in the wild emit both the
//! standard and the URL-safe alphabet, padded or not.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use ilp_compat_packet::{IlpFulfillment, IlpPayment};
use ilp_compat_plugin_api::{FulfillmentInfo, LegacyTransfer, Transfer};

use crate::pending::TransferId;
use crate::Error;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Decode a base64 field in either alphabet, with or without padding.
///
/// Reports the standard-alphabet error when both fail.
fn decode_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD_LENIENT
        .decode(input)
        .or_else(|e| URL_SAFE_LENIENT.decode(input).map_err(|_| e))
}

/// Parse a legacy expiry timestamp.
///
/// RFC 3339 with any offset, or ISO-8601 without an offset, read as UTC.
fn parse_expiry(input: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(input) {
        Ok(at) => Ok(at.with_timezone(&Utc)),
        Err(e) => NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| e),
    }
}

/// Build the legacy record for an outgoing transfer.
///
/// The embedded payment always has amount zero; the outer transfer carries
/// the value.
pub(crate) fn to_legacy(
    id: TransferId,
    transfer: &Transfer,
    ledger: &str,
    to: String,
) -> LegacyTransfer {
    let envelope = IlpPayment {
        account: transfer.destination.clone(),
        amount: 0,
        data: transfer.data.clone(),
    };

    LegacyTransfer {
        id: id.to_string(),
        amount: transfer.amount.clone(),
        to,
        from: None,
        ledger: ledger.to_string(),
        ilp: STANDARD.encode(envelope.to_bytes()),
        execution_condition: STANDARD.encode(&transfer.execution_condition),
        expires_at: transfer
            .expires_at
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        custom: transfer.custom.clone(),
    }
}

/// Recover the current-interface view of an incoming legacy transfer.
pub(crate) fn from_legacy(transfer: &LegacyTransfer) -> Result<Transfer, Error> {
    let envelope = IlpPayment::from_bytes(&decode_base64(&transfer.ilp)?)?;
    let execution_condition = Bytes::from(decode_base64(&transfer.execution_condition)?);
    let expires_at = parse_expiry(&transfer.expires_at)?;

    Ok(Transfer {
        amount: transfer.amount.clone(),
        destination: envelope.account,
        data: envelope.data,
        execution_condition,
        expires_at,
        custom: transfer.custom.clone(),
    })
}

/// Decode the fulfillment and response envelope of an `outgoing_fulfill`.
///
/// A missing envelope means the receiver returned no data.
pub(crate) fn decode_fulfillment(
    fulfillment: &str,
    ilp: Option<&str>,
) -> Result<FulfillmentInfo, Error> {
    let data = match ilp {
        Some(ilp) if !ilp.is_empty() => IlpFulfillment::from_bytes(&decode_base64(ilp)?)?.data,
        _ => Bytes::new(),
    };

    Ok(FulfillmentInfo {
        fulfillment: Bytes::from(decode_base64(fulfillment)?),
        data,
    })
}

/// Encode a handler's decision as the `(fulfillment, ilp)` strings a legacy
/// plugin expects.
pub(crate) fn encode_fulfillment(info: &FulfillmentInfo) -> (String, String) {
    let envelope = IlpFulfillment {
        data: info.data.clone(),
    };
    (
        STANDARD.encode(&info.fulfillment),
        STANDARD.encode(envelope.to_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
    use chrono::TimeZone;
    use serde_json::json;

    fn outgoing() -> Transfer {
        Transfer {
            amount: "1000".to_string(),
            destination: "g.eur.mary.pay".to_string(),
            data: Bytes::from_static(b"invoice-42"),
            execution_condition: Bytes::from(vec![7u8; 32]),
            expires_at: Utc.with_ymd_and_hms(2017, 12, 23, 1, 2, 3).unwrap(),
            custom: json!({ "memo": "lunch" }),
        }
    }

    #[test]
    fn legacy_record_fields() {
        let id = TransferId::new();
        let legacy = to_legacy(id, &outgoing(), "g.usd.", "g.usd.connie".to_string());

        assert_eq!(legacy.id, id.to_string());
        assert_eq!(legacy.amount, "1000");
        assert_eq!(legacy.to, "g.usd.connie");
        assert_eq!(legacy.ledger, "g.usd.");
        assert_eq!(legacy.expires_at, "2017-12-23T01:02:03.000Z");
        assert_eq!(legacy.execution_condition, STANDARD.encode([7u8; 32]));
        assert_eq!(legacy.custom, json!({ "memo": "lunch" }));

        let envelope = IlpPayment::from_bytes(&STANDARD.decode(&legacy.ilp).unwrap()).unwrap();
        assert_eq!(envelope.account, "g.eur.mary.pay");
        assert_eq!(envelope.amount, 0);
        assert_eq!(envelope.data, Bytes::from_static(b"invoice-42"));
    }

    #[test]
    fn outgoing_record_reads_back_as_incoming_view() {
        let original = outgoing();
        let legacy = to_legacy(TransferId::new(), &original, "g.usd.", "g.usd.connie".into());
        let view = from_legacy(&legacy).unwrap();
        assert_eq!(view, original);
    }

    #[test]
    fn incoming_with_bad_envelope_fails() {
        let mut legacy = to_legacy(TransferId::new(), &outgoing(), "g.usd.", "x".into());
        legacy.ilp = STANDARD.encode(b"\x09\x00");
        assert!(matches!(from_legacy(&legacy), Err(Error::Packet(_))));

        legacy.ilp = "%%%".to_string();
        assert!(matches!(from_legacy(&legacy), Err(Error::Base64(_))));
    }

    #[test]
    fn incoming_with_bad_expiry_fails() {
        let mut legacy = to_legacy(TransferId::new(), &outgoing(), "g.usd.", "x".into());
        legacy.expires_at = "tomorrow".to_string();
        assert!(matches!(from_legacy(&legacy), Err(Error::Timestamp(_))));
    }

    #[test]
    fn fulfillment_roundtrip() {
        let info = FulfillmentInfo {
            fulfillment: Bytes::from(vec![1u8; 32]),
            data: Bytes::from_static(b"receipt"),
        };
        let (fulfillment, ilp) = encode_fulfillment(&info);
        assert_eq!(decode_fulfillment(&fulfillment, Some(&ilp)).unwrap(), info);
    }

    #[test]
    fn fulfillment_without_envelope_has_empty_data() {
        let fulfillment = STANDARD.encode([2u8; 32]);
        let info = decode_fulfillment(&fulfillment, None).unwrap();
        assert!(info.data.is_empty());
        assert_eq!(info.fulfillment.len(), 32);

        let info = decode_fulfillment(&fulfillment, Some("")).unwrap();
        assert!(info.data.is_empty());
    }

    #[test]
    fn url_safe_fulfillment_is_accepted() {
        // 0xfb encodes to '-' and '_' in the URL-safe alphabet.
        let fulfillment = URL_SAFE_NO_PAD.encode([0xfb; 32]);
        assert!(fulfillment.contains('-'));

        let info = decode_fulfillment(&fulfillment, None).unwrap();
        assert_eq!(info.fulfillment, Bytes::from(vec![0xfb; 32]));

        let envelope = IlpFulfillment {
            data: Bytes::from_static(b"receipt"),
        };
        let ilp = URL_SAFE.encode(envelope.to_bytes());
        let info = decode_fulfillment(&URL_SAFE.encode([0xfb; 32]), Some(&ilp)).unwrap();
        assert_eq!(info.data, Bytes::from_static(b"receipt"));
    }

    #[test]
    fn unpadded_standard_fulfillment_is_accepted() {
        let fulfillment = STANDARD_NO_PAD.encode([0x01; 32]);
        assert!(!fulfillment.ends_with('='));
        let info = decode_fulfillment(&fulfillment, None).unwrap();
        assert_eq!(info.fulfillment, Bytes::from(vec![0x01; 32]));
    }

    #[test]
    fn incoming_url_safe_condition_is_accepted() {
        let mut legacy = to_legacy(TransferId::new(), &outgoing(), "g.usd.", "x".into());
        legacy.execution_condition = URL_SAFE_NO_PAD.encode([0xfb; 32]);
        let view = from_legacy(&legacy).unwrap();
        assert_eq!(view.execution_condition, Bytes::from(vec![0xfb; 32]));
    }

    #[test]
    fn incoming_expiry_formats() {
        let mut legacy = to_legacy(TransferId::new(), &outgoing(), "g.usd.", "x".into());
        let expected = Utc.with_ymd_and_hms(2017, 12, 23, 1, 2, 3).unwrap();

        legacy.expires_at = "2017-12-23T03:02:03+02:00".to_string();
        assert_eq!(from_legacy(&legacy).unwrap().expires_at, expected);

        legacy.expires_at = "2017-12-23T01:02:03".to_string();
        assert_eq!(from_legacy(&legacy).unwrap().expires_at, expected);

        legacy.expires_at = "2017-12-23T01:02:03.000".to_string();
        assert_eq!(from_legacy(&legacy).unwrap().expires_at, expected);
    }
}
