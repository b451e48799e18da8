//! Scriptable in-memory transport.
//!
//! Stands in for the radio stack so the session state machine and the
//! facade can be exercised on the host: advertisements, connect
//! results, service readiness, and link drops are all scripted through
//! public fields. No radio, no timing.

use heapless::{Deque, String, Vec};

use crate::ble::transport::{BleTransport, DecoderTag};
use crate::ble::uuids;
use crate::ble::{DeviceAddress, DiscoveredDevice, LinkEvent};
use crate::config::BLE_MAX_DISCOVERED;
use crate::error::BleError;

/// Test double implementing [`BleTransport`].
pub struct MockTransport {
    /// Advertisements returned by every scan pass.
    pub advertisements: Vec<DiscoveredDevice, BLE_MAX_DISCOVERED>,
    /// Number of upcoming `connect` calls that fail.
    pub connect_failures: u32,
    /// Number of upcoming `has_service` calls that report "not ready".
    pub service_warmup: u32,
    /// Services the connected peer exposes.
    pub services: Vec<&'static str, 4>,
    /// (service, characteristic) pairs that accept notify subscriptions.
    pub characteristics: Vec<(&'static str, &'static str), 8>,
    /// Subscriptions recorded by `enable_notifications`.
    pub subscriptions: Vec<(&'static str, &'static str, DecoderTag), 8>,

    // Call counters.
    pub resets: u32,
    pub scans: u32,
    pub connects: u32,
    pub disconnects: u32,
    /// Total time spent in `delay_ms`.
    pub delayed_ms: u64,

    link_up: bool,
    events: Deque<LinkEvent, 4>,
}

impl MockTransport {
    /// Empty air: scans see nothing, peer exposes nothing.
    pub fn new() -> Self {
        Self {
            advertisements: Vec::new(),
            connect_failures: 0,
            service_warmup: 0,
            services: Vec::new(),
            characteristics: Vec::new(),
            subscriptions: Vec::new(),
            resets: 0,
            scans: 0,
            connects: 0,
            disconnects: 0,
            delayed_ms: 0,
            link_up: false,
            events: Deque::new(),
        }
    }

    /// A wearable advertising at `address` with both health services
    /// and notify characteristics present - the happy path.
    pub fn with_target(address: &str) -> Self {
        let mut mock = Self::new();
        mock.add_advertisement(address, "Aolon Curve", -58);
        let _ = mock.services.push(uuids::HEART_RATE_SERVICE);
        let _ = mock.services.push(uuids::VENDOR_HEALTH_SERVICE);
        let _ = mock
            .characteristics
            .push((uuids::HEART_RATE_SERVICE, uuids::HEART_RATE_MEASUREMENT));
        let _ = mock
            .characteristics
            .push((uuids::VENDOR_HEALTH_SERVICE, uuids::VENDOR_HEALTH_NOTIFY));
        mock
    }

    pub fn add_advertisement(&mut self, address: &str, name: &str, rssi: i8) {
        let mut n = String::new();
        let _ = n.push_str(name);
        let _ = self.advertisements.push(DiscoveredDevice {
            address: DeviceAddress::new(address),
            name: n,
            rssi,
        });
    }

    pub fn remove_characteristic(&mut self, char_uuid: &str) {
        if let Some(pos) = self
            .characteristics
            .iter()
            .position(|(_, c)| *c == char_uuid)
        {
            self.characteristics.swap_remove(pos);
        }
    }

    /// Simulate an asynchronous link drop from the radio context.
    pub fn drop_link(&mut self) {
        if self.link_up {
            self.link_up = false;
            let _ = self.events.push_back(LinkEvent::Disconnected);
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl BleTransport for MockTransport {
    fn reset(&mut self) {
        self.resets += 1;
    }

    fn scan(&mut self, _duration_secs: u32) -> Vec<DiscoveredDevice, BLE_MAX_DISCOVERED> {
        self.scans += 1;
        self.advertisements.clone()
    }

    fn connect(&mut self, _address: &DeviceAddress) -> Result<(), BleError> {
        self.connects += 1;
        if self.connect_failures > 0 {
            self.connect_failures -= 1;
            return Err(BleError::ConnectFailed);
        }
        self.link_up = true;
        let _ = self.events.push_back(LinkEvent::Connected);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.link_up = false;
        self.subscriptions.clear();
    }

    fn is_link_up(&self) -> bool {
        self.link_up
    }

    fn take_link_event(&mut self) -> Option<LinkEvent> {
        self.events.pop_front()
    }

    fn has_service(&mut self, service_uuid: &str) -> bool {
        if self.service_warmup > 0 {
            self.service_warmup -= 1;
            return false;
        }
        self.services.iter().any(|s| *s == service_uuid)
    }

    fn enable_notifications(
        &mut self,
        service_uuid: &str,
        char_uuid: &str,
        tag: DecoderTag,
    ) -> Result<(), BleError> {
        if !self.link_up {
            return Err(BleError::NotifyRejected);
        }
        // Record the stored pair so the subscription keeps the
        // 'static lifetime.
        let Some(&(s, c)) = self
            .characteristics
            .iter()
            .find(|(s, c)| *s == service_uuid && *c == char_uuid)
        else {
            return Err(BleError::CharacteristicNotFound);
        };
        let _ = self.subscriptions.push((s, c, tag));
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delayed_ms += u64::from(ms);
    }
}
