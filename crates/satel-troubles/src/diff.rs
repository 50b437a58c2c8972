use std::collections::HashMap;

use satel_protocol::NotifyEvent;

use crate::flags::{SystemMainTroubles, SystemOtherTroubles};
use crate::regions::{decode_one, regions_for, Region, RegionSource, RegionValue};

/// One device index whose bit flipped within a device-category trouble
/// region (`Zones`/`Expanders`/`Manipulators`/`Radio`/`Users`/`IntGsm`).
/// `index` is 1-based, matching the bit-packed list codec's member
/// numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionChange {
    pub index: u16,
    pub set: bool,
}

/// A region's contribution to one `update()` call. System-level regions
/// (`SystemMain`/`SystemOther`) report the full current flag word, since
/// there's no per-device index to diff; device-category regions report only
/// the indices whose membership changed since the previous snapshot of that
/// exact region.
#[derive(Debug, Clone)]
pub enum RegionUpdate {
    SystemMain(SystemMainTroubles),
    SystemOther(SystemOtherTroubles),
    Devices { source: RegionSource, changes: Vec<RegionChange> },
}

/// Per-region previous-snapshot cache backing `on_troubles_changed`: unlike
/// [`decode_troubles`](crate::decode_troubles), which reports every region's
/// full current membership, this reports only what changed, keyed
/// independently per region so that e.g. `TROUBLES_PART1`'s three separate
/// `Expanders` regions don't bleed into each other's history.
///
/// Mirrors `satel_diff::DiffEngine`'s first-observation-as-complement trick:
/// a region seen for the first time has nothing to diff against, so every
/// set bit in it is reported as a change.
#[derive(Debug, Default)]
pub struct TroublesDiffCache {
    snapshots: HashMap<(NotifyEvent, usize), Vec<u8>>,
}

impl TroublesDiffCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes every region of `payload` for `event`, diffing device-category
    /// regions against their cached previous snapshot and passing
    /// system-level regions through as absolute flag words. Returns an empty
    /// vector for any event that isn't a `TROUBLES_PART*`/
    /// `TROUBLES_MEMORY_PART*` notify event.
    pub fn update(&mut self, event: NotifyEvent, payload: &[u8]) -> Vec<RegionUpdate> {
        regions_for(event)
            .iter()
            .enumerate()
            .map(|(idx, region)| self.update_region(event, idx, region, payload))
            .collect()
    }

    fn update_region(&mut self, event: NotifyEvent, region_idx: usize, region: &Region, payload: &[u8]) -> RegionUpdate {
        let source = match decode_one(region, payload) {
            RegionValue::SystemMain(flags) => return RegionUpdate::SystemMain(flags),
            RegionValue::SystemOther(flags) => return RegionUpdate::SystemOther(flags),
            RegionValue::Devices { source, .. } => source,
        };
        let data = region.slice(payload);

        let key = (event, region_idx);
        let previous = self.snapshots.get(&key);

        let mut changes = Vec::new();
        for (byte_idx, &curr_byte) in data.iter().enumerate() {
            let prev_byte = previous.and_then(|p| p.get(byte_idx).copied()).unwrap_or(!curr_byte);
            let diff = prev_byte ^ curr_byte;
            if diff == 0 {
                continue;
            }
            for bit in 0..8u16 {
                if diff & (1 << bit) != 0 {
                    changes.push(RegionChange {
                        index: byte_idx as u16 * 8 + bit + 1,
                        set: curr_byte & (1 << bit) != 0,
                    });
                }
            }
        }

        self.snapshots.insert(key, data.to_vec());
        RegionUpdate::Devices { source, changes }
    }

    /// Drops every cached region snapshot. Call this on reconnect, the same
    /// way `satel_diff::DiffEngine::reset` is called — a fresh connection
    /// has no prior state to diff against.
    pub fn reset(&mut self) {
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satel_protocol::Opcode;

    fn event(op: Opcode) -> NotifyEvent {
        NotifyEvent::from_opcode(op).unwrap()
    }

    #[test]
    fn first_observation_reports_every_set_bit_as_changed() {
        let mut cache = TroublesDiffCache::new();
        let mut payload = vec![0u8; 47];
        payload[0] = 0b0000_0101; // zones 1 and 3
        let updates = cache.update(event(Opcode::ReadTroublesPart1), &payload);
        let zones = updates
            .iter()
            .find_map(|u| match u {
                RegionUpdate::Devices { source: RegionSource::Zones, changes } => Some(changes.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(zones, vec![RegionChange { index: 1, set: true }, RegionChange { index: 3, set: true }]);
    }

    #[test]
    fn unchanged_region_reports_no_deltas_on_second_update() {
        let mut cache = TroublesDiffCache::new();
        let mut payload = vec![0u8; 47];
        payload[0] = 0b0000_0101;
        cache.update(event(Opcode::ReadTroublesPart1), &payload);
        let updates = cache.update(event(Opcode::ReadTroublesPart1), &payload);
        let zones = updates
            .iter()
            .find_map(|u| match u {
                RegionUpdate::Devices { source: RegionSource::Zones, changes } => Some(changes.clone()),
                _ => None,
            })
            .unwrap();
        assert!(zones.is_empty());
    }

    #[test]
    fn only_flipped_indices_reported_between_updates() {
        let mut cache = TroublesDiffCache::new();
        let mut payload = vec![0u8; 47];
        payload[0] = 0b0000_0001;
        cache.update(event(Opcode::ReadTroublesPart1), &payload);
        payload[0] = 0b0000_0011;
        let updates = cache.update(event(Opcode::ReadTroublesPart1), &payload);
        let zones = updates
            .iter()
            .find_map(|u| match u {
                RegionUpdate::Devices { source: RegionSource::Zones, changes } => Some(changes.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(zones, vec![RegionChange { index: 2, set: true }]);
    }

    #[test]
    fn separate_expander_regions_in_the_same_part_keep_independent_history() {
        let mut cache = TroublesDiffCache::new();
        let mut payload = vec![0u8; 47];
        payload[16] = 0x01; // first Expanders region, device 1
        cache.update(event(Opcode::ReadTroublesPart1), &payload);
        payload[24] = 0x01; // second Expanders region, device 1 — independent history
        let updates = cache.update(event(Opcode::ReadTroublesPart1), &payload);
        let expander_changes: Vec<_> = updates
            .iter()
            .filter_map(|u| match u {
                RegionUpdate::Devices { source: RegionSource::Expanders, changes } => Some(changes.clone()),
                _ => None,
            })
            .collect();
        // first region: no change (still 0x01); second region: device 1 newly set.
        assert!(expander_changes[0].is_empty());
        assert_eq!(expander_changes[1], vec![RegionChange { index: 1, set: true }]);
    }

    #[test]
    fn system_main_region_passes_through_as_absolute_flags_not_a_delta() {
        let mut cache = TroublesDiffCache::new();
        let mut payload = vec![0u8; 47];
        payload[40] = 0x80;
        let updates = cache.update(event(Opcode::ReadTroublesPart1), &payload);
        let system_main = updates
            .iter()
            .find_map(|u| match u {
                RegionUpdate::SystemMain(flags) => Some(*flags),
                _ => None,
            })
            .unwrap();
        assert!(system_main.contains(SystemMainTroubles::AC));

        // Second update with the same bits still reports the full flag word,
        // not an empty delta — system-level regions have no "changed" notion.
        let updates = cache.update(event(Opcode::ReadTroublesPart1), &payload);
        let system_main = updates
            .iter()
            .find_map(|u| match u {
                RegionUpdate::SystemMain(flags) => Some(*flags),
                _ => None,
            })
            .unwrap();
        assert!(system_main.contains(SystemMainTroubles::AC));
    }

    #[test]
    fn reset_forces_every_device_region_back_to_first_observation_behavior() {
        let mut cache = TroublesDiffCache::new();
        let mut payload = vec![0u8; 47];
        payload[0] = 0xFF;
        cache.update(event(Opcode::ReadTroublesPart1), &payload);
        cache.reset();
        let updates = cache.update(event(Opcode::ReadTroublesPart1), &payload);
        let zones = updates
            .iter()
            .find_map(|u| match u {
                RegionUpdate::Devices { source: RegionSource::Zones, changes } => Some(changes.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(zones.len(), 8);
        assert!(zones.iter().all(|c| c.set));
    }
}
