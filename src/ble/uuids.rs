//! GATT identifiers for the wearable's health services.

/// Standard Heart Rate service (0x180D).
pub const HEART_RATE_SERVICE: &str = "0000180d-0000-1000-8000-00805f9b34fb";

/// Heart Rate Measurement characteristic (0x2A37), standard profile
/// framing (flags byte + 8/16-bit bpm).
pub const HEART_RATE_MEASUREMENT: &str = "00002a37-0000-1000-8000-00805f9b34fb";

/// Vendor health service carrying the `FE EA 20`-framed SpO2 / stress
/// feed.
pub const VENDOR_HEALTH_SERVICE: &str = "0000feea-0000-1000-8000-00805f9b34fb";

/// Notify characteristic on the vendor health service.
pub const VENDOR_HEALTH_NOTIFY: &str = "0000fee2-0000-1000-8000-00805f9b34fb";
