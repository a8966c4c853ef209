use foundation::math::Vec3;

use crate::kind::GeometryKind;
use crate::measure::{Measurements, SegmentMeasure};

/// Why a finish attempt was rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawError {
    NeedMorePoints,
}

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::NeedMorePoints => write!(f, "need more points"),
        }
    }
}

impl std::error::Error for DrawError {}

/// Everything the engine reports to its caller.
///
/// The caller drains these from the outbox after each input event; there is
/// no callback registration and no string-keyed event channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    /// Running measurement report; emitted on activation, on every point
    /// commitment, and (with `in_progress == false`) on finish.
    Info {
        kind: GeometryKind,
        in_progress: bool,
        total_length_m: f64,
        segments: Vec<SegmentMeasure>,
    },
    /// First committed point of a session.
    Started { kind: GeometryKind },
    /// Finished geometry with final positions and measurements.
    Ended {
        kind: GeometryKind,
        positions: Vec<Vec3>,
        measurements: Measurements,
    },
    Failed { error: DrawError },
    StateChanged { active: bool },
    /// Edit-mode drag boundaries, for camera-control suspension.
    PointerDown,
    PointerUp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StampedEvent {
    /// Monotonic per-controller sequence number; never reset, so event order
    /// stays unambiguous across sessions.
    pub seq: u64,
    pub event: DrawEvent,
}

#[derive(Debug, Default)]
pub struct EventOutbox {
    events: Vec<StampedEvent>,
    next_seq: u64,
}

impl EventOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: DrawEvent) {
        self.events.push(StampedEvent {
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
    }

    pub fn events(&self) -> &[StampedEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<StampedEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{DrawEvent, EventOutbox};
    use crate::kind::GeometryKind;

    #[test]
    fn sequence_numbers_are_monotonic_across_drains() {
        let mut outbox = EventOutbox::new();
        outbox.emit(DrawEvent::Started {
            kind: GeometryKind::Line,
        });
        let first = outbox.drain();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].seq, 0);

        outbox.emit(DrawEvent::StateChanged { active: false });
        let second = outbox.drain();
        assert_eq!(second[0].seq, 1);
        assert!(outbox.events().is_empty());
    }
}
