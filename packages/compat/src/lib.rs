//! Run a legacy ledger plugin behind the current plugin interface.
//!
//! Legacy (version 1) plugins report transfer outcomes as events and take
//! base64-encoded packets. The current (version 2) interface resolves each
//! `send_transfer` call with its own outcome and hands incoming transfers to
//! a single registered handler. [`compat`] bridges the two:
//!
//! - Outgoing transfers get a fresh [`TransferId`] and are resolved by the
//!   matching `outgoing_fulfill`, `outgoing_reject`, or `outgoing_cancel`
//!   event.
//! - Incoming transfers are decoded, passed to the [`TransferHandler`], and
//!   answered with `fulfill_condition` or `reject_incoming_transfer`.
//! - Plugins that already speak the current interface are returned as-is.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ilp_compat::{compat, AnyPlugin};
//!
//! let plugin = compat(AnyPlugin::Legacy(Arc::new(MyLedgerPlugin::new())))?;
//! plugin.register_transfer_handler(Arc::new(MyReceiver))?;
//! plugin.connect().await?;
//! let result = plugin.send_transfer(transfer).await?;
//! ```

mod adapter;
mod address;
mod config;
mod error;
mod pending;
mod transcode;

use std::sync::Arc;

pub use adapter::CompatPlugin;
pub use address::delivery_address;
pub use config::CompatConfig;
pub use error::Error;
pub use pending::TransferId;

// Re-export the contracts so callers need only this crate.
pub use ilp_compat_plugin_api::{
    handler_fn, FulfillmentInfo, LedgerInfo, LegacyEvent, LegacyEventListener, LegacyTransfer,
    Message, PluginError, PluginEvent, PluginV1, PluginV2, RejectionMessage, RequestHandler,
    Transfer, TransferHandler,
};

/// A plugin implementing either contract version.
pub enum AnyPlugin {
    Legacy(Arc<dyn PluginV1>),
    Current(Arc<dyn PluginV2>),
}

impl From<Arc<dyn PluginV1>> for AnyPlugin {
    fn from(plugin: Arc<dyn PluginV1>) -> Self {
        AnyPlugin::Legacy(plugin)
    }
}

impl From<Arc<dyn PluginV2>> for AnyPlugin {
    fn from(plugin: Arc<dyn PluginV2>) -> Self {
        AnyPlugin::Current(plugin)
    }
}

/// Expose `plugin` through the current interface with default settings.
///
/// See [`compat_with_config`].
pub fn compat(plugin: AnyPlugin) -> Result<Arc<dyn PluginV2>, Error> {
    compat_with_config(plugin, CompatConfig::default())
}

/// Expose `plugin` through the current interface.
///
/// A current-interface plugin is returned unchanged, so wrapping is
/// idempotent. A legacy plugin must report version 1 and is wrapped in a
/// [`CompatPlugin`]; this registers an event listener on it and requires a
/// Tokio runtime.
pub fn compat_with_config(
    plugin: AnyPlugin,
    config: CompatConfig,
) -> Result<Arc<dyn PluginV2>, Error> {
    match plugin {
        AnyPlugin::Current(plugin) => {
            let version = plugin.version();
            if version != 2 {
                return Err(Error::NotAPlugin(format!(
                    "expected a version 2 plugin, got version {}",
                    version
                )));
            }
            tracing::debug!("plugin already implements the current interface");
            Ok(plugin)
        }
        AnyPlugin::Legacy(plugin) => Ok(CompatPlugin::new(plugin, config)?),
    }
}
