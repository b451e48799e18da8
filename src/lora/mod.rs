//! LoRa uplink framing.
//!
//! The relay hands the radio driver one of two wire forms, depending
//! on the deployment: short text lines for the line-oriented base
//! station, or a fixed-size binary frame the republishing node decodes
//! back into a [`DeviceData`]. Both must stay byte-for-byte stable -
//! existing base stations parse them as-is.

use core::fmt::Write;

use heapless::String;

use crate::sensor::{Sample, SensorReading};

/// Binary uplink frame length: id + topic + 8-byte value + timestamp.
pub const FRAME_LEN: usize = 14;

/// Measurement topic carried in the binary frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Topic {
    HeartRate = 1,
    SpO2 = 2,
    Stress = 3,
    Gps = 4,
}

impl Topic {
    fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Topic::HeartRate),
            2 => Some(Topic::SpO2),
            3 => Some(Topic::Stress),
            4 => Some(Topic::Gps),
            _ => None,
        }
    }
}

/// 8-byte value field: a scalar measurement, or a GPS fix for the
/// position topic.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorValue {
    Scalar(u64),
    Location { lat: f32, lon: f32 },
}

impl SensorValue {
    fn to_bytes(self) -> [u8; 8] {
        match self {
            SensorValue::Scalar(v) => v.to_le_bytes(),
            SensorValue::Location { lat, lon } => {
                let mut out = [0u8; 8];
                out[..4].copy_from_slice(&lat.to_le_bytes());
                out[4..].copy_from_slice(&lon.to_le_bytes());
                out
            }
        }
    }

    fn from_bytes(topic: Topic, bytes: [u8; 8]) -> Self {
        match topic {
            Topic::Gps => SensorValue::Location {
                lat: f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
                lon: f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            },
            _ => SensorValue::Scalar(u64::from_le_bytes(bytes)),
        }
    }
}

/// One measurement as relayed to the base node.
///
/// Wire layout (little-endian, packed):
/// `device_id: u8 | topic: u8 | value: 8 bytes | timestamp: u32`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceData {
    pub device_id: u8,
    pub topic: Topic,
    pub value: SensorValue,
    /// Unix seconds at capture (base node republishes with this).
    pub timestamp: u32,
}

impl DeviceData {
    /// A GPS fix frame.
    pub fn gps(device_id: u8, lat: f32, lon: f32, timestamp: u32) -> Self {
        Self {
            device_id,
            topic: Topic::Gps,
            value: SensorValue::Location { lat, lon },
            timestamp,
        }
    }

    /// Frame a decoded sample. `None` for raw or invalid readings -
    /// those never go on air.
    pub fn from_sample(device_id: u8, sample: &Sample, timestamp: u32) -> Option<Self> {
        let (topic, value) = match sample.reading {
            SensorReading::HeartRate { bpm, valid: true } => {
                (Topic::HeartRate, SensorValue::Scalar(u64::from(bpm)))
            }
            SensorReading::SpO2 {
                percent,
                valid: true,
            } => (Topic::SpO2, SensorValue::Scalar(u64::from(percent))),
            SensorReading::Stress { level, valid: true } => {
                (Topic::Stress, SensorValue::Scalar(u64::from(level)))
            }
            _ => return None,
        };
        Some(Self {
            device_id,
            topic,
            value,
            timestamp,
        })
    }

    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut out = [0u8; FRAME_LEN];
        out[0] = self.device_id;
        out[1] = self.topic as u8;
        out[2..10].copy_from_slice(&self.value.to_bytes());
        out[10..].copy_from_slice(&self.timestamp.to_le_bytes());
        out
    }

    /// Base-node side: parse a received frame. `None` on wrong length
    /// or unknown topic.
    pub fn decode(frame: &[u8]) -> Option<Self> {
        if frame.len() != FRAME_LEN {
            return None;
        }
        let topic = Topic::from_u8(frame[1])?;
        let mut value = [0u8; 8];
        value.copy_from_slice(&frame[2..10]);
        Some(Self {
            device_id: frame[0],
            topic,
            value: SensorValue::from_bytes(topic, value),
            timestamp: u32::from_le_bytes([frame[10], frame[11], frame[12], frame[13]]),
        })
    }
}

/// Short text line for one valid reading: `HR:120`, `SPO2:98`,
/// `STRESS:44`. `None` for raw or invalid samples.
pub fn reading_line(sample: &Sample) -> Option<String<16>> {
    let mut line: String<16> = String::new();
    match sample.reading {
        SensorReading::HeartRate { bpm, valid: true } => {
            let _ = write!(line, "HR:{}", bpm);
        }
        SensorReading::SpO2 {
            percent,
            valid: true,
        } => {
            let _ = write!(line, "SPO2:{}", percent);
        }
        SensorReading::Stress { level, valid: true } => {
            let _ = write!(line, "STRESS:{}", level);
        }
        _ => return None,
    }
    Some(line)
}

/// Combined report line:
/// `DATA,HR:72,SPO2:98,T,2024-01-01 00:00:00`. Absent measurements
/// are omitted; the timestamp field is always last.
pub fn report_line(
    hr: Option<u16>,
    spo2: Option<u8>,
    stress: Option<u16>,
    timestamp: &str,
) -> String<64> {
    let mut line: String<64> = String::new();
    let _ = line.push_str("DATA");
    if let Some(bpm) = hr {
        let _ = write!(line, ",HR:{}", bpm);
    }
    if let Some(percent) = spo2 {
        let _ = write!(line, ",SPO2:{}", percent);
    }
    if let Some(level) = stress {
        let _ = write!(line, ",STRESS:{}", level);
    }
    let _ = write!(line, ",T,{}", timestamp);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hr_sample(bpm: u16, valid: bool) -> Sample {
        Sample {
            reading: SensorReading::HeartRate { bpm, valid },
            timestamp_ms: 0,
        }
    }

    #[test]
    fn reading_lines_match_wire_format() {
        assert_eq!(
            reading_line(&hr_sample(120, true)).as_deref(),
            Some("HR:120")
        );
        let spo2 = Sample {
            reading: SensorReading::SpO2 {
                percent: 98,
                valid: true,
            },
            timestamp_ms: 0,
        };
        assert_eq!(reading_line(&spo2).as_deref(), Some("SPO2:98"));
        let stress = Sample {
            reading: SensorReading::Stress {
                level: 44,
                valid: true,
            },
            timestamp_ms: 0,
        };
        assert_eq!(reading_line(&stress).as_deref(), Some("STRESS:44"));
    }

    #[test]
    fn invalid_readings_produce_no_line() {
        assert!(reading_line(&hr_sample(250, false)).is_none());
        let raw = Sample {
            reading: SensorReading::Raw(heapless::Vec::new()),
            timestamp_ms: 0,
        };
        assert!(reading_line(&raw).is_none());
    }

    #[test]
    fn report_line_matches_wire_format() {
        assert_eq!(
            report_line(Some(72), Some(98), None, "2024-01-01 00:00:00").as_str(),
            "DATA,HR:72,SPO2:98,T,2024-01-01 00:00:00"
        );
        assert_eq!(
            report_line(None, None, None, "2024-01-01 00:00:00").as_str(),
            "DATA,T,2024-01-01 00:00:00"
        );
        assert_eq!(
            report_line(Some(72), Some(98), Some(44), "2024-01-01 00:00:00").as_str(),
            "DATA,HR:72,SPO2:98,STRESS:44,T,2024-01-01 00:00:00"
        );
    }

    #[test]
    fn binary_frame_layout_is_stable() {
        let frame = DeviceData {
            device_id: 7,
            topic: Topic::HeartRate,
            value: SensorValue::Scalar(120),
            timestamp: 0x0102_0304,
        }
        .encode();

        assert_eq!(
            frame,
            [
                7, // device id
                1, // heart-rate topic
                120, 0, 0, 0, 0, 0, 0, 0, // value, little-endian
                0x04, 0x03, 0x02, 0x01, // timestamp, little-endian
            ]
        );
    }

    #[test]
    fn binary_frame_roundtrip() {
        let original = DeviceData {
            device_id: 3,
            topic: Topic::Stress,
            value: SensorValue::Scalar(44),
            timestamp: 1_704_067_200,
        };
        let decoded = DeviceData::decode(&original.encode()).expect("decode");
        assert_eq!(decoded, original);
    }

    #[test]
    fn gps_frame_carries_both_coordinates() {
        let original = DeviceData::gps(1, -6.2088, 106.8456, 1_704_067_200);
        let decoded = DeviceData::decode(&original.encode()).expect("decode");
        match decoded.value {
            SensorValue::Location { lat, lon } => {
                assert_eq!(lat, -6.2088);
                assert_eq!(lon, 106.8456);
            }
            other => panic!("expected location, got {:?}", other),
        }
        assert_eq!(decoded.topic, Topic::Gps);
    }

    #[test]
    fn decode_rejects_bad_frames() {
        assert!(DeviceData::decode(&[0u8; 13]).is_none());
        assert!(DeviceData::decode(&[0u8; 15]).is_none());

        let mut frame = DeviceData {
            device_id: 1,
            topic: Topic::SpO2,
            value: SensorValue::Scalar(98),
            timestamp: 0,
        }
        .encode();
        frame[1] = 0xEE; // unknown topic
        assert!(DeviceData::decode(&frame).is_none());
    }

    #[test]
    fn only_valid_samples_are_framed() {
        assert!(DeviceData::from_sample(1, &hr_sample(72, true), 100).is_some());
        assert!(DeviceData::from_sample(1, &hr_sample(29, false), 100).is_none());
        let raw = Sample {
            reading: SensorReading::Raw(heapless::Vec::new()),
            timestamp_ms: 0,
        };
        assert!(DeviceData::from_sample(1, &raw, 100).is_none());
    }
}
