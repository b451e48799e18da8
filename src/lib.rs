//! ble2lora - BLE-to-LoRa health telemetry relay core.
//!
//! Connects to a single wearable health monitor over Bluetooth Low
//! Energy, decodes its heart-rate / SpO2 / stress notification
//! payloads (standard Heart Rate profile framing plus a vendor-framed
//! protocol), and frames the readings for a LoRa uplink to a base
//! node.
//!
//! The crate is the portable middle of the firmware: the concrete BLE
//! radio stack sits behind the [`ble::transport::BleTransport`] trait
//! and the LoRa driver consumes the byte/text frames produced by
//! [`lora`]. Everything here is `no_std`, allocation-free, and
//! host-testable (`cargo test` runs without hardware).
//!
//! Typical wiring from firmware:
//!
//! 1. Create a `static` [`sensor::slots::SampleSlots`] and hand a
//!    [`sensor::slots::TelemetrySink`] over it to the radio glue, which
//!    calls `on_notify` from the notification callback context.
//! 2. Build a [`ble::manager::BleManager`] over the transport and the
//!    same slots, `begin()` it once, then from the main loop call
//!    `try_reconnect(now_ms)` and drain readings per kind.

#![cfg_attr(not(test), no_std)]

pub mod ble;
pub mod config;
pub mod error;
pub mod lora;
pub mod sensor;

mod fmt;
