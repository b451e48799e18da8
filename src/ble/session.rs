//! One device's full connection lifecycle:
//! scan → connect → service discovery → subscribe → notify, plus
//! teardown and the bookkeeping that keeps stale GATT state from
//! surviving a disconnect.

use heapless::Vec;

use crate::ble::transport::{BleTransport, DecoderTag};
use crate::ble::{ConnectionState, DeviceAddress, LinkEvent};
use crate::config::{MAX_NOTIFY_CHANNELS, SERVICE_LOOKUP_ATTEMPTS, SERVICE_LOOKUP_DELAY_MS};
use crate::error::BleError;
use crate::fmt::{info, warn};

/// One configured notify subscription. `active` is per-connection
/// state and resets on every disconnect - characteristic handles do
/// not survive reconnects.
#[derive(Clone, Copy, Debug)]
struct NotifyChannel {
    service: &'static str,
    characteristic: &'static str,
    tag: DecoderTag,
    active: bool,
}

/// Drives the connection lifecycle for the single target wearable.
///
/// The session owns the transport; the link handle inside it is torn
/// down entirely before any new connect attempt, so there is never
/// more than one outstanding attempt to the device.
pub struct ConnectionSession<T: BleTransport> {
    transport: T,
    target: DeviceAddress,
    scan_secs: u32,
    state: ConnectionState,
    channels: Vec<NotifyChannel, MAX_NOTIFY_CHANNELS>,
}

impl<T: BleTransport> ConnectionSession<T> {
    pub fn new(transport: T, target: DeviceAddress, scan_secs: u32) -> Self {
        Self {
            transport,
            target,
            scan_secs,
            state: ConnectionState::Idle,
            channels: Vec::new(),
        }
    }

    /// Register a characteristic to subscribe on every connect. The
    /// tag binds the shared packet callback to the right payload
    /// framing. Returns `false` when the channel table is full.
    pub fn add_channel(
        &mut self,
        service: &'static str,
        characteristic: &'static str,
        tag: DecoderTag,
    ) -> bool {
        self.channels
            .push(NotifyChannel {
                service,
                characteristic,
                tag,
                active: false,
            })
            .is_ok()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The underlying transport (firmware glue and tests).
    pub fn transport_ref(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Channels with notifications live on the current connection.
    pub fn active_channels(&self) -> usize {
        self.channels.iter().filter(|c| c.active).count()
    }

    /// Run the full scan → connect → discover → subscribe sequence.
    /// Blocks for up to the scan window. On any failure the link is
    /// torn down and the state carries the reason for the reconnect
    /// policy; nothing here is fatal.
    pub fn begin(&mut self) -> Result<(), BleError> {
        let result = self.run_connect_sequence();
        if let Err(e) = result {
            warn!("session attempt failed: {}", error_label(e));
            self.teardown(e);
        }
        result
    }

    /// Consume link events queued by the transport's callbacks. An
    /// asynchronous disconnect invalidates every cached handle, so the
    /// session drops to `Disconnected` and clears channel state.
    pub fn poll(&mut self) {
        while let Some(event) = self.transport.take_link_event() {
            match event {
                // Connect handshakes are observed synchronously in
                // `begin`; the queued event is informational.
                LinkEvent::Connected => {}
                LinkEvent::Disconnected => {
                    if !matches!(self.state, ConnectionState::Disconnected(_)) {
                        warn!("link lost, scheduling reconnect");
                        self.teardown(BleError::LinkLost);
                    }
                }
            }
        }
    }

    /// Explicit teardown, e.g. before power-down.
    pub fn disconnect(&mut self) {
        self.teardown(BleError::LinkLost);
        self.state = ConnectionState::Idle;
    }

    fn run_connect_sequence(&mut self) -> Result<(), BleError> {
        self.transport.reset();

        self.state = ConnectionState::Scanning;
        info!("scanning for target ({} s window)", self.scan_secs);
        let devices = self.transport.scan(self.scan_secs);
        let found = devices
            .iter()
            .find(|d| d.address == self.target)
            .cloned()
            .ok_or(BleError::ScanTargetNotFound)?;
        info!(
            "target found: {} ({})",
            found.name.as_str(),
            found.address.as_str()
        );

        self.state = ConnectionState::Connecting;
        self.transport.connect(&found.address)?;

        self.state = ConnectionState::ServiceDiscovery;
        self.discover_services()?;

        self.state = ConnectionState::Subscribing;
        self.subscribe_channels();

        self.state = ConnectionState::Connected;
        info!(
            "connected, {}/{} notify channels active",
            self.active_channels(),
            self.channels.len()
        );
        Ok(())
    }

    /// Look up every required service, retrying a bounded number of
    /// times - stacks report "service not ready" transiently right
    /// after connect. A service still missing afterwards fails the
    /// whole attempt: the session falls back to a full
    /// disconnect+reconnect cycle rather than retrying discovery on a
    /// live link.
    fn discover_services(&mut self) -> Result<(), BleError> {
        for i in 0..self.channels.len() {
            let service = self.channels[i].service;
            if self.channels[..i].iter().any(|c| c.service == service) {
                continue;
            }

            let mut found = false;
            for attempt in 1..=SERVICE_LOOKUP_ATTEMPTS {
                if self.transport.has_service(service) {
                    found = true;
                    break;
                }
                if attempt < SERVICE_LOOKUP_ATTEMPTS {
                    self.transport.delay_ms(SERVICE_LOOKUP_DELAY_MS);
                }
            }
            if !found {
                warn!("service missing after {} attempts", SERVICE_LOOKUP_ATTEMPTS);
                return Err(BleError::ServiceNotFound);
            }
        }
        Ok(())
    }

    /// Enable notifications on each configured channel. A missing
    /// characteristic degrades that one channel (readings stop, the
    /// connection stays up) instead of failing the session; the next
    /// full reconnect retries it.
    fn subscribe_channels(&mut self) {
        for i in 0..self.channels.len() {
            let NotifyChannel {
                service,
                characteristic,
                tag,
                ..
            } = self.channels[i];
            match self.transport.enable_notifications(service, characteristic, tag) {
                Ok(()) => self.channels[i].active = true,
                Err(e) => {
                    warn!("notify subscription failed: {}", error_label(e));
                    self.channels[i].active = false;
                }
            }
        }
    }

    /// Release the link handle and drop all per-connection state.
    fn teardown(&mut self, reason: BleError) {
        self.transport.disconnect();
        for channel in self.channels.iter_mut() {
            channel.active = false;
        }
        self.state = ConnectionState::Disconnected(reason);
    }
}

fn error_label(e: BleError) -> &'static str {
    match e {
        BleError::ScanTargetNotFound => "target not found in scan",
        BleError::ConnectFailed => "connect failed",
        BleError::ServiceNotFound => "service not found",
        BleError::CharacteristicNotFound => "characteristic not found",
        BleError::NotifyRejected => "notify rejected",
        BleError::LinkLost => "link lost",
    }
}
