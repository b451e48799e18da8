//! Notification payload decoder.
//!
//! Pure classification of raw notification bytes into a
//! [`SensorReading`]; no I/O, no state, idempotent. The vendor rules
//! are the union of every framing variant observed on the wearable -
//! a reverse-engineered contract, not a tidy protocol.

use heapless::Vec;

use crate::ble::transport::DecoderTag;
use crate::config::{HR_BPM_MAX, HR_BPM_MIN, MAX_NOTIFY_LEN, SPO2_MAX};
use crate::sensor::SensorReading;

/// Vendor frame prefix; the type byte follows at offset 3.
const VENDOR_MAGIC: [u8; 3] = [0xFE, 0xEA, 0x20];

/// Vendor type byte carrying heart rate (short frame) or SpO2 (long
/// frame).
const VENDOR_TYPE_PULSE: u8 = 0x06;

/// Vendor type byte carrying the stress index.
const VENDOR_TYPE_STRESS: u8 = 0x08;

/// Classify one notification payload.
///
/// `tag` is the framing bound at subscribe time - payloads are decoded
/// by their origin characteristic, never by guessing.
pub fn decode(tag: DecoderTag, payload: &[u8]) -> SensorReading {
    match tag {
        DecoderTag::HeartRateProfile => decode_heart_rate_profile(payload),
        DecoderTag::VendorFrame => decode_vendor_frame(payload),
    }
}

/// Standard Heart Rate Measurement framing (GATT 0x2A37): byte 0 is a
/// flags byte, bit 0 selects 8-bit vs 16-bit little-endian bpm.
fn decode_heart_rate_profile(payload: &[u8]) -> SensorReading {
    if payload.len() < 2 {
        return raw(payload);
    }
    let sixteen_bit = payload[0] & 0x01 != 0;
    if sixteen_bit && payload.len() < 3 {
        return raw(payload);
    }

    let bpm = if sixteen_bit {
        u16::from_le_bytes([payload[1], payload[2]])
    } else {
        u16::from(payload[1])
    };

    // 0xFF in the first value byte is the watch's "no finger contact"
    // sentinel.
    let valid = payload[1] != 0xFF && (HR_BPM_MIN..=HR_BPM_MAX).contains(&bpm);
    SensorReading::HeartRate { bpm, valid }
}

/// Vendor `FE EA 20` framing.
///
/// Type 0x06 carries heart rate in short frames and SpO2 in frames of
/// 6+ bytes; total length is the only discriminator. That heuristic
/// occasionally misclassifies on some firmware revisions - it is a
/// known accuracy risk carried as-is, because the base station decodes
/// with the same rule.
fn decode_vendor_frame(payload: &[u8]) -> SensorReading {
    if payload.len() < 4 || payload[..3] != VENDOR_MAGIC {
        return raw(payload);
    }

    let last = payload[payload.len() - 1];
    match payload[3] {
        VENDOR_TYPE_PULSE if payload.len() >= 6 => SensorReading::SpO2 {
            percent: last,
            valid: last != 0xFF && last <= SPO2_MAX,
        },
        VENDOR_TYPE_PULSE if payload.len() >= 5 => SensorReading::HeartRate {
            bpm: u16::from(last),
            valid: (HR_BPM_MIN..=HR_BPM_MAX).contains(&u16::from(last)),
        },
        // Type byte with no value byte after it.
        VENDOR_TYPE_PULSE => SensorReading::HeartRate { bpm: 0, valid: false },
        VENDOR_TYPE_STRESS => {
            if payload.len() < 8 {
                return SensorReading::Stress { level: 0, valid: false };
            }
            let high = payload[payload.len() - 2];
            let low = last;
            SensorReading::Stress {
                level: u16::from_be_bytes([high, low]),
                valid: !(high == 0xFF && low == 0xFF),
            }
        }
        _ => raw(payload),
    }
}

fn raw(payload: &[u8]) -> SensorReading {
    let take = payload.len().min(MAX_NOTIFY_LEN);
    let mut bytes = Vec::new();
    // Cannot overflow: `take` is clamped to capacity.
    let _ = bytes.extend_from_slice(&payload[..take]);
    SensorReading::Raw(bytes)
}
