//! Delivery address resolution for outgoing transfers.
//!
//! A legacy transfer is addressed to an account on the plugin's own ledger.
//! For destinations under the ledger prefix that account is the first
//! address segment after the prefix; anything else is handed to the first
//! connector for forwarding.

use ilp_compat_plugin_api::LedgerInfo;

/// Separator between ILP address segments.
const SEPARATOR: char = '.';

/// Resolve the ledger-local `to` address for a transfer to `destination`.
///
/// Returns `None` when the destination is off-ledger and the plugin knows
/// no connector.
pub fn delivery_address(info: &LedgerInfo, destination: &str) -> Option<String> {
    match destination.strip_prefix(info.prefix.as_str()) {
        Some(rest) => {
            let segment = rest.split(SEPARATOR).next().unwrap_or_default();
            Some(format!("{}{}", info.prefix, segment))
        }
        None => info.connectors.first().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(prefix: &str, connectors: &[&str]) -> LedgerInfo {
        LedgerInfo {
            prefix: prefix.to_string(),
            connectors: connectors.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn local_destination_uses_first_segment() {
        let info = info("g.usd.", &["g.usd.connector1"]);
        assert_eq!(
            delivery_address(&info, "g.usd.connector1.alice").as_deref(),
            Some("g.usd.connector1")
        );
        assert_eq!(
            delivery_address(&info, "g.usd.bob").as_deref(),
            Some("g.usd.bob")
        );
    }

    #[test]
    fn remote_destination_uses_first_connector() {
        let info = info("g.usd.", &["g.usd.connector1", "g.usd.connector2"]);
        assert_eq!(
            delivery_address(&info, "g.eur.mary").as_deref(),
            Some("g.usd.connector1")
        );
    }

    #[test]
    fn remote_destination_without_connectors() {
        let info = info("g.usd.", &[]);
        assert_eq!(delivery_address(&info, "g.eur.mary"), None);
    }

    #[test]
    fn destination_equal_to_prefix() {
        let info = info("g.usd.", &[]);
        assert_eq!(
            delivery_address(&info, "g.usd.").as_deref(),
            Some("g.usd.")
        );
    }

    #[test]
    fn prefix_match_is_textual() {
        // "g.usdx" does not start with "g.usd.", so it is forwarded.
        let info = info("g.usd.", &["g.usd.connie"]);
        assert_eq!(
            delivery_address(&info, "g.usdx.bob").as_deref(),
            Some("g.usd.connie")
        );
    }
}
