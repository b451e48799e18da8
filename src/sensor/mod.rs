//! Typed sensor readings decoded from notification payloads.

pub mod decoder;
pub mod slots;

use heapless::Vec;

use crate::config::MAX_NOTIFY_LEN;

/// Measurement kinds tracked by the relay. One latest-value slot
/// exists per kind; see [`slots::SampleSlots`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadingKind {
    HeartRate,
    SpO2,
    Stress,
    /// Unclassified payloads, kept for diagnostics.
    Raw,
}

impl ReadingKind {
    /// Number of kinds (slot array length).
    pub const COUNT: usize = 4;

    /// All kinds, in slot order.
    pub const ALL: [ReadingKind; Self::COUNT] = [
        ReadingKind::HeartRate,
        ReadingKind::SpO2,
        ReadingKind::Stress,
        ReadingKind::Raw,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            ReadingKind::HeartRate => 0,
            ReadingKind::SpO2 => 1,
            ReadingKind::Stress => 2,
            ReadingKind::Raw => 3,
        }
    }
}

/// One decoded measurement.
///
/// `valid: false` means the payload parsed but failed a plausibility
/// check (out-of-range value or sentinel bytes); the consumer must
/// skip the sample. Decoding never errors - a notification already
/// happened and cannot be retried.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorReading {
    HeartRate { bpm: u16, valid: bool },
    SpO2 { percent: u8, valid: bool },
    Stress { level: u16, valid: bool },
    /// Payload that matched no known framing, truncated to
    /// [`MAX_NOTIFY_LEN`].
    Raw(Vec<u8, MAX_NOTIFY_LEN>),
}

impl SensorReading {
    pub fn kind(&self) -> ReadingKind {
        match self {
            SensorReading::HeartRate { .. } => ReadingKind::HeartRate,
            SensorReading::SpO2 { .. } => ReadingKind::SpO2,
            SensorReading::Stress { .. } => ReadingKind::Stress,
            SensorReading::Raw(_) => ReadingKind::Raw,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            SensorReading::HeartRate { valid, .. }
            | SensorReading::SpO2 { valid, .. }
            | SensorReading::Stress { valid, .. } => *valid,
            SensorReading::Raw(_) => false,
        }
    }
}

/// A reading plus its monotonic capture time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    pub reading: SensorReading,
    pub timestamp_ms: u64,
}
