//! Latest-value handoff between the notification callback context and
//! the main loop.
//!
//! One slot per [`ReadingKind`], all behind a single critical-section
//! mutex so a reader can never observe a torn payload/timestamp/flag
//! group. Writes happen on the transport's callback context, drains on
//! the main loop; neither side can block the other beyond the critical
//! section.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::ble::transport::{DecoderTag, NotificationSink};
use crate::fmt::warn;
use crate::sensor::{decoder, ReadingKind, Sample, SensorReading};

struct Slot {
    sample: Option<Sample>,
    fresh: bool,
}

impl Slot {
    const EMPTY: Slot = Slot {
        sample: None,
        fresh: false,
    };
}

/// Fixed set of latest-value slots, single-writer / single-reader
/// safe. Const-constructible so it can live in a `static` shared
/// between the radio glue and the manager.
pub struct SampleSlots {
    slots: Mutex<CriticalSectionRawMutex, RefCell<[Slot; ReadingKind::COUNT]>>,
}

impl SampleSlots {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([Slot::EMPTY; ReadingKind::COUNT])),
        }
    }

    /// Overwrite the slot for the sample's kind and mark it fresh.
    /// Called from the notification context.
    pub fn write(&self, sample: Sample) {
        let idx = sample.reading.kind().index();
        self.slots.lock(|slots| {
            slots.borrow_mut()[idx] = Slot {
                sample: Some(sample),
                fresh: true,
            };
        });
    }

    /// Read-and-clear: returns the latest sample for `kind` iff it is
    /// fresh since the last drain, clearing the flag. The value itself
    /// is retained for [`Self::latest`].
    pub fn drain(&self, kind: ReadingKind) -> Option<Sample> {
        self.slots.lock(|slots| {
            let mut slots = slots.borrow_mut();
            let slot = &mut slots[kind.index()];
            if slot.fresh {
                slot.fresh = false;
                slot.sample.clone()
            } else {
                None
            }
        })
    }

    /// Last value seen for `kind` regardless of freshness; `None` only
    /// if nothing was ever written.
    pub fn latest(&self, kind: ReadingKind) -> Option<Sample> {
        self.slots
            .lock(|slots| slots.borrow()[kind.index()].sample.clone())
    }
}

impl Default for SampleSlots {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoder + slots glued into the single on-packet entry point the
/// transport callback needs. This is the object the radio glue
/// captures instead of a process-wide instance pointer.
pub struct TelemetrySink<'a> {
    slots: &'a SampleSlots,
}

impl<'a> TelemetrySink<'a> {
    pub fn new(slots: &'a SampleSlots) -> Self {
        Self { slots }
    }
}

impl NotificationSink for TelemetrySink<'_> {
    fn on_notify(&self, tag: DecoderTag, payload: &[u8], timestamp_ms: u64) {
        let reading = decoder::decode(tag, payload);
        if let SensorReading::Raw(_) = reading {
            warn!("unclassified notification ({} bytes)", payload.len());
        }
        self.slots.write(Sample {
            reading,
            timestamp_ms,
        });
    }
}
