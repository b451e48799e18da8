//! Compile-time constants and construction-time configuration.
//!
//! Timing parameters and protocol limits live here so they can be
//! tuned in one place.

use crate::ble::DeviceAddress;

// BLE

/// Duration of a BLE scan window (seconds). The scan blocks the
/// caller, so this bounds how long `begin()` / a reconnect attempt
/// can stall the main loop.
pub const BLE_SCAN_DURATION_SECS: u32 = 5;

/// Maximum number of BLE peripherals retained from one scan pass.
pub const BLE_MAX_DISCOVERED: usize = 8;

/// Maximum notify subscriptions per session (heart rate + vendor feed
/// leaves headroom).
pub const MAX_NOTIFY_CHANNELS: usize = 4;

/// Longest notification payload we retain (ATT default MTU minus
/// opcode/handle overhead).
pub const MAX_NOTIFY_LEN: usize = 20;

/// GATT service lookup attempts right after connect. Radio stacks may
/// report "service not ready" transiently before discovery settles.
pub const SERVICE_LOOKUP_ATTEMPTS: u32 = 3;

/// Delay between service lookup attempts (ms).
pub const SERVICE_LOOKUP_DELAY_MS: u32 = 200;

// Reconnect backoff

/// Initial reconnect interval (ms).
pub const RECONNECT_BASE_MS: u64 = 5_000;

/// Reconnect interval ceiling (ms). There is no give-up state; the
/// relay retries at this rate forever.
pub const RECONNECT_CAP_MS: u64 = 60_000;

// Measurement plausibility bounds

/// Lowest heart rate accepted as a real measurement (bpm).
pub const HR_BPM_MIN: u16 = 30;

/// Highest heart rate accepted as a real measurement (bpm).
pub const HR_BPM_MAX: u16 = 220;

/// SpO2 upper bound (percent).
pub const SPO2_MAX: u8 = 100;

// Status log

/// Capacity of one pending status-log message (bytes).
pub const LOG_MSG_CAPACITY: usize = 127;

/// Construction-time session configuration. Fixed for the process
/// lifetime once the manager is built.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Address of the one wearable this session may connect to.
    pub target_address: DeviceAddress,
    /// Scan window length (seconds).
    pub scan_secs: u32,
    /// Initial reconnect interval (ms).
    pub reconnect_base_ms: u64,
    /// Reconnect interval ceiling (ms).
    pub reconnect_cap_ms: u64,
}

impl RelayConfig {
    /// Config with default timing for the given target address.
    pub fn new(target_address: &str) -> Self {
        Self {
            target_address: DeviceAddress::new(target_address),
            scan_secs: BLE_SCAN_DURATION_SECS,
            reconnect_base_ms: RECONNECT_BASE_MS,
            reconnect_cap_ms: RECONNECT_CAP_MS,
        }
    }
}
