//! The seam between the relay core and the concrete radio stack.
//!
//! Radio stacks expose C-style registration APIs (free-function
//! callbacks firing on their own execution context). We hide that
//! behind two traits: the session drives [`BleTransport`] from the
//! main loop, and the transport glue delivers notification payloads
//! through [`NotificationSink`] from the callback context. The
//! `DecoderTag` bound at subscribe time is what lets one shared
//! callback know which payload framing it is looking at.

use heapless::Vec;

use crate::ble::{DeviceAddress, DiscoveredDevice, LinkEvent};
use crate::config::BLE_MAX_DISCOVERED;
use crate::error::BleError;

/// Which framing the notification payloads on a characteristic use.
///
/// Bound to the subscription so the decoder can classify payloads by
/// their origin, not by sniffing bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderTag {
    /// Standard Heart Rate Measurement framing (flags + bpm).
    HeartRateProfile,
    /// Vendor `FE EA 20`-prefixed frames (HR / SpO2 / stress).
    VendorFrame,
}

/// Receives raw notification payloads on the transport's execution
/// context. Implementations must be safe to call concurrently with
/// the main loop; see `sensor::slots::TelemetrySink`.
pub trait NotificationSink {
    /// One notification arrived on a characteristic subscribed with
    /// `tag`. `timestamp_ms` is the monotonic capture time.
    fn on_notify(&self, tag: DecoderTag, payload: &[u8], timestamp_ms: u64);
}

/// Byte-level operations the session needs from a BLE Central stack.
///
/// All methods run on the main-loop context. `scan` and `connect`
/// may block for seconds; that is acceptable because they only run at
/// startup and on reconnect, never on the steady-state hot path.
pub trait BleTransport {
    /// Reset the radio stack to a clean state before scanning.
    fn reset(&mut self);

    /// Blocking scan; returns the advertisements seen in the window.
    fn scan(&mut self, duration_secs: u32) -> Vec<DiscoveredDevice, BLE_MAX_DISCOVERED>;

    /// Connect to the peripheral. On success the transport owns the
    /// link handle and starts queueing [`LinkEvent`]s.
    fn connect(&mut self, address: &DeviceAddress) -> Result<(), BleError>;

    /// Tear down the link and release the handle. Idempotent. Any
    /// cached service/characteristic state inside the transport is
    /// invalid afterwards.
    fn disconnect(&mut self);

    /// Transport-level link state.
    fn is_link_up(&self) -> bool;

    /// Drain one queued link event recorded by the connect/disconnect
    /// callbacks, oldest first.
    fn take_link_event(&mut self) -> Option<LinkEvent>;

    /// Whether the connected peer currently exposes the service. May
    /// transiently return `false` right after connect while discovery
    /// settles.
    fn has_service(&mut self, service_uuid: &str) -> bool;

    /// Locate the characteristic, write its notify-enable descriptor,
    /// and bind the packet callback to `tag`.
    fn enable_notifications(
        &mut self,
        service_uuid: &str,
        char_uuid: &str,
        tag: DecoderTag,
    ) -> Result<(), BleError>;

    /// Cooperative delay, used between service lookup retries.
    fn delay_ms(&mut self, ms: u32);
}
