//! Per-notify-event snapshot cache: turns successive raw state reads into
//! the individual bit changes callers actually care about, instead of
//! forcing every consumer to diff bitmaps by hand.

use std::collections::HashMap;

use satel_protocol::NotifyEvent;

/// One bit that flipped between two successive snapshots of the same event.
/// `index` is 1-based — bit `b` of byte `i` is reported as `i * 8 + b + 1`,
/// matching the member numbering the bit-packed list codec already uses for
/// zones/parts/outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitChange {
    pub index: u16,
    pub value: bool,
}

/// Tracks the last-seen byte snapshot per notify event and reports which
/// bits changed on each update.
///
/// The first observation of any event has nothing to diff against, so it's
/// treated as a complement of itself — every bit compares as changed, and
/// the reported value is the bit's real current state. This mirrors what a
/// freshly (re)connected client should do: it holds no prior state, so the
/// first full read of every category is reported as all-new.
#[derive(Debug, Default)]
pub struct DiffEngine {
    snapshots: HashMap<NotifyEvent, Vec<u8>>,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the snapshot for `event` with `current` and returns every bit
    /// that changed since the last call for the same event. If `current` is
    /// a different length than the cached snapshot (a capability re-probe
    /// changed the bitmap size), the shorter of the two bounds the
    /// comparison and the new snapshot replaces the old one wholesale.
    ///
    /// `max_len` bounds how many bytes of `current` are considered — the
    /// panel pads some reads to a fixed wire width, but only the bytes that
    /// actually correspond to the panel's configured capacity (zones,
    /// parts, outputs, doors) are meaningful. Bytes beyond it are never
    /// diffed. `None` means take all of `current` as given.
    pub fn update(&mut self, event: NotifyEvent, current: &[u8], max_len: Option<usize>) -> Vec<BitChange> {
        let current = match max_len {
            Some(len) => &current[..current.len().min(len)],
            None => current,
        };
        let previous = self.snapshots.get(&event);

        let mut changes = Vec::new();
        for (byte_idx, &curr_byte) in current.iter().enumerate() {
            let prev_byte = previous
                .and_then(|p| p.get(byte_idx).copied())
                .unwrap_or(!curr_byte);
            let diff = prev_byte ^ curr_byte;
            if diff == 0 {
                continue;
            }
            for bit in 0..8u16 {
                if diff & (1 << bit) != 0 {
                    changes.push(BitChange {
                        index: byte_idx as u16 * 8 + bit + 1,
                        value: curr_byte & (1 << bit) != 0,
                    });
                }
            }
        }

        self.snapshots.insert(event, current.to_vec());
        changes
    }

    /// Drops every cached snapshot. Call this on reconnect — stale snapshots
    /// would otherwise suppress a real change that happened while the
    /// channel was down.
    pub fn reset(&mut self) {
        self.snapshots.clear();
    }

    /// Drops the cached snapshot for one event, forcing its next `update` to
    /// behave like a first observation.
    pub fn forget(&mut self, event: NotifyEvent) {
        self.snapshots.remove(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satel_protocol::Opcode;

    fn zones_violation() -> NotifyEvent {
        NotifyEvent::from_opcode(Opcode::ReadZonesViolation).unwrap()
    }

    #[test]
    fn first_observation_reports_every_bit_with_its_real_value() {
        let mut engine = DiffEngine::new();
        let changes = engine.update(zones_violation(), &[0b0000_0101], None);
        assert_eq!(changes.len(), 8);
        assert!(changes.contains(&BitChange { index: 1, value: true }));
        assert!(changes.contains(&BitChange { index: 2, value: false }));
        assert!(changes.contains(&BitChange { index: 3, value: true }));
    }

    #[test]
    fn unchanged_snapshot_reports_nothing() {
        let mut engine = DiffEngine::new();
        engine.update(zones_violation(), &[0xAA], None);
        let changes = engine.update(zones_violation(), &[0xAA], None);
        assert!(changes.is_empty());
    }

    #[test]
    fn only_flipped_bits_are_reported_on_subsequent_updates() {
        let mut engine = DiffEngine::new();
        engine.update(zones_violation(), &[0b0000_0001], None);
        let changes = engine.update(zones_violation(), &[0b0000_0011], None);
        assert_eq!(changes, vec![BitChange { index: 2, value: true }]);
    }

    #[test]
    fn reset_forces_the_next_update_to_behave_like_a_first_observation() {
        let mut engine = DiffEngine::new();
        engine.update(zones_violation(), &[0xFF], None);
        engine.reset();
        let changes = engine.update(zones_violation(), &[0xFF], None);
        assert_eq!(changes.len(), 8);
        assert!(changes.iter().all(|c| c.value));
    }

    #[test]
    fn max_len_truncates_bytes_beyond_the_panels_configured_capacity() {
        let mut engine = DiffEngine::new();
        // Byte 1 carries a bit outside a 1-byte (8-member) capacity and must
        // never surface as a change.
        let changes = engine.update(zones_violation(), &[0x00, 0xFF], Some(1));
        assert!(changes.is_empty());
        let changes = engine.update(zones_violation(), &[0x01, 0xFF], Some(1));
        assert_eq!(changes, vec![BitChange { index: 1, value: true }]);
    }

    #[test]
    fn separate_events_keep_independent_snapshots() {
        let mut engine = DiffEngine::new();
        let tamper = NotifyEvent::from_opcode(Opcode::ReadZonesTamper).unwrap();
        engine.update(zones_violation(), &[0x01], None);
        let changes = engine.update(tamper, &[0x01], None);
        assert_eq!(changes.len(), 8, "tamper's first observation is independent of zones_violation's cache");
    }
}
