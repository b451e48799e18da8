//! End-to-end relay scenarios against the scripted transport.

use ble2lora::ble::manager::BleManager;
use ble2lora::ble::mock::MockTransport;
use ble2lora::ble::transport::{DecoderTag, NotificationSink};
use ble2lora::ble::uuids;
use ble2lora::config::RelayConfig;
use ble2lora::lora;
use ble2lora::sensor::slots::{SampleSlots, TelemetrySink};
use ble2lora::sensor::{ReadingKind, SensorReading};

const TARGET: &str = "f8:fd:e8:84:37:89";

fn connected_manager(slots: &SampleSlots) -> BleManager<'_, MockTransport> {
    let config = RelayConfig::new(TARGET);
    let mut manager = BleManager::new(MockTransport::with_target(TARGET), &config, slots);
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
    assert!(manager.begin(0));
    manager
}

#[test]
fn burst_of_notifications_drains_fresh_exactly_once() {
    let slots = SampleSlots::new();
    let manager = connected_manager(&slots);
    let sink = TelemetrySink::new(&slots);

    // Three notifications land between two main-loop ticks.
    sink.on_notify(DecoderTag::HeartRateProfile, &[0x00, 72], 1_000);
    sink.on_notify(DecoderTag::VendorFrame, &[0xFE, 0xEA, 0x20, 0x06, 0x6B, 0x62], 1_001);
    sink.on_notify(
        DecoderTag::VendorFrame,
        &[0xFE, 0xEA, 0x20, 0x08, 0xB9, 0x11, 0x00, 0x2C],
        1_002,
    );

    // First tick: all three fresh, exactly once each.
    let hr = manager.drain(ReadingKind::HeartRate).expect("fresh HR");
    let spo2 = manager.drain(ReadingKind::SpO2).expect("fresh SpO2");
    let stress = manager.drain(ReadingKind::Stress).expect("fresh stress");
    assert_eq!(hr.reading, SensorReading::HeartRate { bpm: 72, valid: true });
    assert_eq!(
        spo2.reading,
        SensorReading::SpO2 {
            percent: 98,
            valid: true
        }
    );
    assert_eq!(
        stress.reading,
        SensorReading::Stress {
            level: 44,
            valid: true
        }
    );

    // Second tick with no new notifications: nothing fresh, values
    // still readable.
    for kind in [ReadingKind::HeartRate, ReadingKind::SpO2, ReadingKind::Stress] {
        assert!(manager.drain(kind).is_none());
        assert!(manager.latest(kind).is_some());
    }
}

#[test]
fn drained_samples_frame_for_the_uplink() {
    let slots = SampleSlots::new();
    let manager = connected_manager(&slots);
    let sink = TelemetrySink::new(&slots);

    sink.on_notify(DecoderTag::HeartRateProfile, &[0x00, 120], 2_000);
    let sample = manager.drain(ReadingKind::HeartRate).expect("fresh HR");

    assert_eq!(lora::reading_line(&sample).as_deref(), Some("HR:120"));

    let frame = lora::DeviceData::from_sample(7, &sample, 1_704_067_200)
        .expect("valid sample frames")
        .encode();
    assert_eq!(frame[0], 7);
    assert_eq!(frame[1], lora::Topic::HeartRate as u8);
    assert_eq!(frame[2], 120);
}

#[test]
fn invalid_notification_is_dropped_not_relayed() {
    let slots = SampleSlots::new();
    let manager = connected_manager(&slots);
    let sink = TelemetrySink::new(&slots);

    // Sensor off-wrist: sentinel byte.
    sink.on_notify(DecoderTag::HeartRateProfile, &[0x00, 0xFF], 3_000);

    let sample = manager.drain(ReadingKind::HeartRate).expect("sample recorded");
    assert!(!sample.reading.is_valid());
    assert!(lora::reading_line(&sample).is_none());
    assert!(lora::DeviceData::from_sample(1, &sample, 0).is_none());
}

#[test]
fn relay_recovers_after_link_drop() {
    let slots = SampleSlots::new();
    let mut manager = connected_manager(&slots);
    let sink = TelemetrySink::new(&slots);

    manager.transport_mut().drop_link();
    assert!(!manager.try_reconnect(1_000));

    // Backoff elapsed: reconnect, then readings flow again.
    assert!(manager.try_reconnect(10_000));
    sink.on_notify(DecoderTag::VendorFrame, &[0xFE, 0xEA, 0x20, 0x06, 0x5A], 11_000);
    assert_eq!(
        manager.drain(ReadingKind::HeartRate).expect("fresh HR").reading,
        SensorReading::HeartRate { bpm: 90, valid: true }
    );
}
