//! Failure taxonomy for the relay core.
//!
//! All variants carry only fixed-size data - no `alloc`. Every BLE
//! failure here is transient from the session's point of view: it ends
//! up in `ConnectionState::Disconnected` and is retried by the
//! reconnect policy, never surfaced as a panic or a fatal error.

/// BLE session failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// Scan window closed without seeing the target advertisement.
    ScanTargetNotFound,

    /// GAP connect handshake failed.
    ConnectFailed,

    /// A required GATT service was still absent after bounded retries.
    ServiceNotFound,

    /// Characteristic missing on a discovered service.
    CharacteristicNotFound,

    /// Writing the notify-enable descriptor was rejected, or the
    /// characteristic does not support notifications.
    NotifyRejected,

    /// The transport-level link dropped out from under us.
    LinkLost,
}
