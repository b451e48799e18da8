//! The facade the main loop talks to.
//!
//! Composes session, reconnect policy, shared sample slots, and a
//! one-slot status log into four operations: `begin`, `try_reconnect`,
//! `is_connected`, and the latest/drain/pop accessors. No errors cross
//! this boundary - every public operation returns a bool or an Option,
//! and failures surface as log messages plus backoff state.

use core::cell::RefCell;
use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::String;

use crate::ble::reconnect::{ReconnectPolicy, ReconnectTimer};
use crate::ble::session::ConnectionSession;
use crate::ble::transport::{BleTransport, DecoderTag};
use crate::ble::ConnectionState;
use crate::config::{RelayConfig, LOG_MSG_CAPACITY};
use crate::sensor::slots::SampleSlots;
use crate::sensor::{ReadingKind, Sample};

/// One pending human-readable status message, no heap. A new event
/// overwrites an undrained message; older messages are silently lost
/// (accepted lossy logging for the memory-constrained target).
pub struct StatusLog {
    slot: Mutex<CriticalSectionRawMutex, RefCell<Option<String<LOG_MSG_CAPACITY>>>>,
}

impl StatusLog {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Store a message, truncating to capacity and overwriting any
    /// pending one.
    pub fn push(&self, msg: &str) {
        let mut s: String<LOG_MSG_CAPACITY> = String::new();
        for c in msg.chars() {
            if s.push(c).is_err() {
                break;
            }
        }
        self.slot.lock(|slot| {
            *slot.borrow_mut() = Some(s);
        });
    }

    /// Take the pending message, if any.
    pub fn pop(&self) -> Option<String<LOG_MSG_CAPACITY>> {
        self.slot.lock(|slot| slot.borrow_mut().take())
    }
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::new()
    }
}

/// BLE relay facade. Owns the session and backoff state; borrows the
/// sample slots it shares with the notification sink.
pub struct BleManager<'a, T: BleTransport> {
    session: ConnectionSession<T>,
    policy: ReconnectPolicy,
    timer: ReconnectTimer,
    slots: &'a SampleSlots,
    log: StatusLog,
}

impl<'a, T: BleTransport> BleManager<'a, T> {
    pub fn new(transport: T, config: &RelayConfig, slots: &'a SampleSlots) -> Self {
        Self {
            session: ConnectionSession::new(
                transport,
                config.target_address.clone(),
                config.scan_secs,
            ),
            policy: ReconnectPolicy::new(config.reconnect_base_ms, config.reconnect_cap_ms),
            timer: ReconnectTimer::new(config.reconnect_base_ms),
            slots,
            log: StatusLog::new(),
        }
    }

    /// Register a notify subscription applied on every connect.
    pub fn add_channel(
        &mut self,
        service: &'static str,
        characteristic: &'static str,
        tag: DecoderTag,
    ) -> bool {
        self.session.add_channel(service, characteristic, tag)
    }

    /// First connection attempt. Blocks for up to the scan window.
    pub fn begin(&mut self, now_ms: u64) -> bool {
        self.attempt(now_ms)
    }

    /// Periodic tick from the main loop: consume link events and, if
    /// disconnected and the backoff interval has elapsed, run another
    /// scan+connect attempt. Returns whether the session is connected
    /// afterwards. Does not block when no attempt is due.
    pub fn try_reconnect(&mut self, now_ms: u64) -> bool {
        self.session.poll();
        if self.session.is_connected() {
            return true;
        }
        if !self.policy.should_retry(now_ms, &self.timer) {
            return false;
        }
        self.attempt(now_ms)
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.session.state()
    }

    /// Fresh sample for `kind` since the last drain, if any.
    pub fn drain(&self, kind: ReadingKind) -> Option<Sample> {
        self.slots.drain(kind)
    }

    /// Last sample seen for `kind`, fresh or not.
    pub fn latest(&self, kind: ReadingKind) -> Option<Sample> {
        self.slots.latest(kind)
    }

    /// At most one pending status message per call.
    pub fn pop_log(&self) -> Option<String<LOG_MSG_CAPACITY>> {
        self.log.pop()
    }

    /// The underlying transport (firmware glue and tests).
    pub fn transport_mut(&mut self) -> &mut T {
        self.session.transport_mut()
    }

    fn attempt(&mut self, now_ms: u64) -> bool {
        self.timer.last_attempt_ms = now_ms;
        match self.session.begin() {
            Ok(()) => {
                self.timer.interval_ms = self.policy.next_interval(self.timer.interval_ms, true);
                let mut msg: String<LOG_MSG_CAPACITY> = String::new();
                let active = self.session.active_channels();
                let total = self.session.channel_count();
                if active < total {
                    let _ = write!(
                        msg,
                        "connected (degraded: {}/{} notify channels)",
                        active, total
                    );
                } else {
                    let _ = write!(msg, "connected, {} notify channels", active);
                }
                self.log.push(&msg);
                true
            }
            Err(e) => {
                self.timer.interval_ms = self.policy.next_interval(self.timer.interval_ms, false);
                let mut msg: String<LOG_MSG_CAPACITY> = String::new();
                let _ = write!(msg, "{:?}, retry in {} ms", e, self.timer.interval_ms);
                self.log.push(&msg);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::mock::MockTransport;
    use crate::ble::uuids;
    use crate::config::{RECONNECT_BASE_MS, RECONNECT_CAP_MS};
    use crate::error::BleError;

    const TARGET: &str = "f8:fd:e8:84:37:89";

    fn manager<'a>(
        transport: MockTransport,
        slots: &'a SampleSlots,
    ) -> BleManager<'a, MockTransport> {
        let config = RelayConfig::new(TARGET);
        let mut manager = BleManager::new(transport, &config, slots);
        assert!(manager.add_channel(
            uuids::HEART_RATE_SERVICE,
            uuids::HEART_RATE_MEASUREMENT,
            DecoderTag::HeartRateProfile,
        ));
        assert!(manager.add_channel(
            uuids::VENDOR_HEALTH_SERVICE,
            uuids::VENDOR_HEALTH_NOTIFY,
            DecoderTag::VendorFrame,
        ));
        manager
    }

    #[test]
    fn begin_connects_and_logs() {
        let slots = SampleSlots::new();
        let mut m = manager(MockTransport::with_target(TARGET), &slots);

        assert!(m.begin(0));
        assert!(m.is_connected());
        let msg = m.pop_log().expect("connect event logged");
        assert_eq!(msg.as_str(), "connected, 2 notify channels");
        assert!(m.pop_log().is_none());
    }

    #[test]
    fn backoff_grows_while_target_is_absent() {
        let slots = SampleSlots::new();
        // Empty air: every scan misses the target.
        let mut m = manager(MockTransport::new(), &slots);

        assert!(!m.begin(0));
        assert_eq!(m.timer.interval_ms, 2 * RECONNECT_BASE_MS);

        // Not due yet: no new attempt, interval unchanged.
        assert!(!m.try_reconnect(5_000));
        assert_eq!(m.timer.interval_ms, 2 * RECONNECT_BASE_MS);

        // Due: attempt runs and fails again, interval doubles.
        assert!(!m.try_reconnect(10_000));
        assert_eq!(m.timer.interval_ms, 4 * RECONNECT_BASE_MS);

        // Interval is capped eventually.
        assert!(!m.try_reconnect(100_000));
        assert!(!m.try_reconnect(200_000));
        assert!(!m.try_reconnect(300_000));
        assert_eq!(m.timer.interval_ms, RECONNECT_CAP_MS);
    }

    #[test]
    fn successful_reconnect_resets_backoff() {
        let slots = SampleSlots::new();
        let mut transport = MockTransport::with_target(TARGET);
        transport.connect_failures = 1;
        let mut m = manager(transport, &slots);

        assert!(!m.begin(0));
        assert_eq!(m.timer.interval_ms, 2 * RECONNECT_BASE_MS);

        assert!(m.try_reconnect(2 * RECONNECT_BASE_MS));
        assert!(m.is_connected());
        assert_eq!(m.timer.interval_ms, RECONNECT_BASE_MS);
    }

    #[test]
    fn try_reconnect_is_cheap_while_connected() {
        let slots = SampleSlots::new();
        let mut m = manager(MockTransport::with_target(TARGET), &slots);
        assert!(m.begin(0));

        assert!(m.try_reconnect(1_000_000));
        // No second scan/connect happened.
        assert_eq!(m.session.transport_ref().scans, 1);
    }

    #[test]
    fn link_drop_is_noticed_and_retried_after_backoff() {
        let slots = SampleSlots::new();
        let mut m = manager(MockTransport::with_target(TARGET), &slots);
        assert!(m.begin(0));

        m.session.transport_mut().drop_link();

        // The drop is consumed on the next tick; no attempt yet
        // because the backoff interval has not elapsed since begin.
        assert!(!m.try_reconnect(1_000));
        assert_eq!(m.state(), ConnectionState::Disconnected(BleError::LinkLost));

        // Once due, the manager reconnects.
        assert!(m.try_reconnect(RECONNECT_BASE_MS));
        assert!(m.is_connected());
    }

    #[test]
    fn degraded_connect_is_reported() {
        let slots = SampleSlots::new();
        let mut transport = MockTransport::with_target(TARGET);
        transport.remove_characteristic(uuids::VENDOR_HEALTH_NOTIFY);
        let mut m = manager(transport, &slots);

        assert!(m.begin(0));
        let msg = m.pop_log().expect("degraded event logged");
        assert_eq!(msg.as_str(), "connected (degraded: 1/2 notify channels)");
    }

    #[test]
    fn status_log_keeps_only_the_newest_message() {
        let log = StatusLog::new();
        assert!(log.pop().is_none());

        log.push("first");
        log.push("second");
        assert_eq!(log.pop().as_deref(), Some("second"));
        assert!(log.pop().is_none());
    }

    #[test]
    fn status_log_truncates_to_capacity() {
        let log = StatusLog::new();
        let long = "x".repeat(LOG_MSG_CAPACITY + 40);
        log.push(&long);
        assert_eq!(log.pop().expect("message").len(), LOG_MSG_CAPACITY);
    }
}
