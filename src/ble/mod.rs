//! Bluetooth Low Energy subsystem.
//!
//! Drives one Central-role link to the wearable:
//!
//! 1. **Transport seam** - the concrete radio stack is abstracted
//!    behind [`transport::BleTransport`]; notification payloads cross
//!    back through [`transport::NotificationSink`].
//! 2. **Session** - scan → connect → service discovery → subscribe,
//!    plus teardown, in [`session::ConnectionSession`].
//! 3. **Reconnect policy** - capped exponential backoff in
//!    [`reconnect`].
//! 4. **Manager** - the facade the main loop talks to, in
//!    [`manager::BleManager`].

pub mod manager;
pub mod mock;
pub mod reconnect;
pub mod session;
pub mod transport;
pub mod uuids;

use heapless::String;

use crate::error::BleError;

/// Transport-native peripheral address (6-byte MAC in colon-hex form).
///
/// Compared case-insensitively: advertisement reports and configured
/// targets disagree on hex case between stacks.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceAddress(String<17>);

impl DeviceAddress {
    /// Build from a colon-hex string, truncating anything overlong.
    pub fn new(addr: &str) -> Self {
        let mut s = String::new();
        for c in addr.chars().take(17) {
            let _ = s.push(c);
        }
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for DeviceAddress {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for DeviceAddress {}

impl From<&str> for DeviceAddress {
    fn from(addr: &str) -> Self {
        Self::new(addr)
    }
}

/// Information about a discovered BLE peripheral.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiscoveredDevice {
    /// BLE address.
    pub address: DeviceAddress,
    /// Human-readable name (truncated to 32 bytes for `heapless::String`).
    pub name: String<32>,
    /// Received Signal Strength Indicator (dBm).
    pub rssi: i8,
}

/// Session lifecycle state. Exactly one state is active at a time;
/// transitions are driven by explicit calls (`begin`, `try_reconnect`)
/// or by link events the transport queues from its own context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    Idle,
    Scanning,
    Connecting,
    ServiceDiscovery,
    Subscribing,
    Connected,
    /// Terminal per-attempt state; the reconnect policy acts on the
    /// recorded reason. There is no permanent failure state.
    Disconnected(BleError),
}

/// Link-level event recorded by the transport's connect/disconnect
/// callbacks and drained by the session on the main loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    Connected,
    Disconnected,
}
