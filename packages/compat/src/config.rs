//! Adapter configuration.

/// Configuration for a [`CompatPlugin`](crate::CompatPlugin).
#[derive(Debug, Clone)]
pub struct CompatConfig {
    /// Capacity of the broadcast channel for re-emitted lifecycle events.
    ///
    /// Subscribers that fall further behind than this lose the oldest events.
    pub event_capacity: usize,

    /// Put the failure code and message into rejections of incoming
    /// transfers.
    ///
    /// Off by default: the legacy plugin receives an empty rejection reason
    /// and the failure is only logged, matching deployed adapters.
    pub forward_rejection_reasons: bool,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            event_capacity: 64,
            forward_rejection_reasons: false,
        }
    }
}
