use satel_protocol::{list_from_bytes, NotifyEvent, Opcode};

use crate::flags::{SystemMainTroubles, SystemOtherTroubles};

/// Which device category a trouble region's bits describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionSource {
    Zones,
    Expanders,
    Manipulators,
    SystemMain,
    SystemOther,
    Radio,
    Users,
    IntGsm,
}

/// One contiguous byte slice within a `TROUBLES_PART*` payload and what kind
/// of data it holds. `offset`/`len` are byte offsets into the full payload,
/// matching the panel's own region layout exactly.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub offset: usize,
    pub len: usize,
    pub source: RegionSource,
}

impl Region {
    const fn new(offset: usize, len: usize, source: RegionSource) -> Self {
        Self { offset, len, source }
    }

    pub fn slice<'a>(&self, payload: &'a [u8]) -> &'a [u8] {
        let end = (self.offset + self.len).min(payload.len());
        let start = self.offset.min(end);
        &payload[start..end]
    }
}

/// A region's data, decoded according to its source. Device-category
/// regions (`Zones`/`Expanders`/`Manipulators`/`Radio`/`Users`/`IntGsm`)
/// report which 1-based device indices have their bit set; which specific
/// trouble flag that bit means depends on the device's runtime model, which
/// the caller already knows from its element name lookup, so this decoder
/// hands back indices rather than guessing a flag per device.
#[derive(Debug, Clone)]
pub enum RegionValue {
    SystemMain(SystemMainTroubles),
    SystemOther(SystemOtherTroubles),
    Devices { source: RegionSource, members: Vec<u16> },
}

/// `TROUBLES_PART1`'s nine regions: zone-technical bitmap, several
/// expander-trouble bitmaps, a 3-byte system-main flag word, manipulator
/// bitmaps, and a 1-byte system-other flag word.
const PART1: &[Region] = &[
    Region::new(0, 16, RegionSource::Zones),
    Region::new(16, 8, RegionSource::Expanders),
    Region::new(24, 8, RegionSource::Expanders),
    Region::new(32, 8, RegionSource::Expanders),
    Region::new(40, 3, RegionSource::SystemMain),
    Region::new(43, 1, RegionSource::Manipulators),
    Region::new(44, 1, RegionSource::Manipulators),
    Region::new(45, 1, RegionSource::Manipulators),
    Region::new(46, 1, RegionSource::SystemOther),
];

const PART2: &[Region] = &[
    Region::new(0, 8, RegionSource::Expanders),
    Region::new(8, 8, RegionSource::Expanders),
    Region::new(16, 8, RegionSource::Expanders),
    Region::new(24, 2, RegionSource::Expanders),
];

const PART3: &[Region] = &[
    Region::new(0, 15, RegionSource::Radio),
    Region::new(15, 15, RegionSource::Radio),
    Region::new(30, 15, RegionSource::Radio),
    Region::new(45, 15, RegionSource::Radio),
];

const PART4: &[Region] = &[
    Region::new(0, 8, RegionSource::Expanders),
    Region::new(8, 8, RegionSource::Expanders),
    Region::new(16, 1, RegionSource::Manipulators),
    Region::new(17, 1, RegionSource::Manipulators),
    Region::new(18, 1, RegionSource::Manipulators),
    Region::new(19, 8, RegionSource::Expanders),
    Region::new(27, 1, RegionSource::Manipulators),
    Region::new(28, 1, RegionSource::Manipulators),
    Region::new(29, 1, RegionSource::Manipulators),
];

const PART5: &[Region] = &[
    Region::new(0, 8, RegionSource::Users),
    Region::new(8, 8, RegionSource::Users),
];

const PART6: &[Region] = &[
    Region::new(0, 15, RegionSource::Radio),
    Region::new(15, 15, RegionSource::Radio),
    Region::new(30, 15, RegionSource::Radio),
];

const PART7: &[Region] = &[
    Region::new(0, 16, RegionSource::Zones),
    Region::new(16, 16, RegionSource::Zones),
    Region::new(32, 15, RegionSource::Radio),
];

const PART8: &[Region] = &[
    Region::new(0, 8, RegionSource::IntGsm),
    Region::new(8, 8, RegionSource::IntGsm),
    Region::new(16, 8, RegionSource::IntGsm),
    Region::new(24, 8, RegionSource::IntGsm),
    Region::new(32, 8, RegionSource::IntGsm),
    Region::new(40, 8, RegionSource::IntGsm),
    Region::new(48, 8, RegionSource::IntGsm),
    Region::new(56, 8, RegionSource::IntGsm),
];

/// Maps a notify event to its trouble-block number (1-8), treating a
/// `TROUBLES_MEMORY_PART*` event as carrying the same region layout as its
/// live `TROUBLES_PART*` counterpart — both are the same bit-packed
/// snapshot format, just "as of now" versus "since last clear".
fn part_number(event: NotifyEvent) -> Option<u8> {
    use Opcode::*;
    Some(match event.opcode() {
        ReadTroublesPart1 | ReadTroublesMemoryPart1 => 1,
        ReadTroublesPart2 | ReadTroublesMemoryPart2 => 2,
        ReadTroublesPart3 | ReadTroublesMemoryPart3 => 3,
        ReadTroublesPart4 | ReadTroublesMemoryPart4 => 4,
        ReadTroublesPart5 | ReadTroublesMemoryPart5 => 5,
        ReadTroublesPart6 | ReadTroublesMemoryPart6 => 6,
        ReadTroublesPart7 | ReadTroublesMemoryPart7 => 7,
        ReadTroublesPart8 | ReadTroublesMemoryPart8 => 8,
        _ => return None,
    })
}

pub fn regions_for(event: NotifyEvent) -> &'static [Region] {
    match part_number(event) {
        Some(1) => PART1,
        Some(2) => PART2,
        Some(3) => PART3,
        Some(4) => PART4,
        Some(5) => PART5,
        Some(6) => PART6,
        Some(7) => PART7,
        Some(8) => PART8,
        _ => &[],
    }
}

pub(crate) fn decode_one(region: &Region, payload: &[u8]) -> RegionValue {
    let data = region.slice(payload);
    match region.source {
        RegionSource::SystemMain => {
            let mut bytes = [0u8; 4];
            bytes[..data.len().min(3)].copy_from_slice(&data[..data.len().min(3)]);
            RegionValue::SystemMain(SystemMainTroubles::from_bits_truncate(u32::from_le_bytes(bytes)))
        }
        RegionSource::SystemOther => {
            let byte = data.first().copied().unwrap_or(0);
            RegionValue::SystemOther(SystemOtherTroubles::from_bits_truncate(byte))
        }
        source => RegionValue::Devices {
            source,
            members: list_from_bytes(data, data.len() * 8, true),
        },
    }
}

/// Decodes every region of `payload` according to `event`'s trouble block
/// layout. Returns an empty vector for any event that isn't a
/// `TROUBLES_PART*`/`TROUBLES_MEMORY_PART*` notify event.
pub fn decode_troubles(event: NotifyEvent, payload: &[u8]) -> Vec<RegionValue> {
    regions_for(event).iter().map(|region| decode_one(region, payload)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(op: Opcode) -> NotifyEvent {
        NotifyEvent::from_opcode(op).unwrap()
    }

    #[test]
    fn part1_has_nine_regions_ending_at_byte_47() {
        let regions = regions_for(event(Opcode::ReadTroublesPart1));
        assert_eq!(regions.len(), 9);
        let last = regions.last().unwrap();
        assert_eq!(last.offset + last.len, 47);
    }

    #[test]
    fn memory_variant_reuses_the_live_variants_region_layout() {
        let live = regions_for(event(Opcode::ReadTroublesPart3));
        let memory = regions_for(event(Opcode::ReadTroublesMemoryPart3));
        assert_eq!(live.len(), memory.len());
        assert_eq!(live[0].offset, memory[0].offset);
    }

    #[test]
    fn decodes_system_main_region_as_little_endian_flags() {
        let mut payload = vec![0u8; 47];
        payload[40] = 0x80; // AC bit, byte 0 of the 3-byte system-main region
        let values = decode_troubles(event(Opcode::ReadTroublesPart1), &payload);
        let system_main = values
            .iter()
            .find_map(|v| match v {
                RegionValue::SystemMain(flags) => Some(*flags),
                _ => None,
            })
            .unwrap();
        assert!(system_main.contains(SystemMainTroubles::AC));
    }

    #[test]
    fn decodes_a_device_bitmap_region_as_1_based_member_indices() {
        let mut payload = vec![0u8; 16];
        payload[0] = 0b0000_0101; // zones 1 and 3 set a technical trouble
        let values = decode_troubles(event(Opcode::ReadTroublesPart1), &payload);
        let zones = values
            .iter()
            .find_map(|v| match v {
                RegionValue::Devices { source: RegionSource::Zones, members } => Some(members.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(zones, vec![1, 3]);
    }

    #[test]
    fn non_troubles_events_have_no_regions() {
        assert!(regions_for(event(Opcode::ReadZonesViolation)).is_empty());
    }
}
