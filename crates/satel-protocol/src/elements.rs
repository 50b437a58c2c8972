//! `ELEMENT_READ_NAME` (0xEE) request/response: `{element_kind, element_id}`
//! in, a kind-specific tail (always including a 16-byte ASCII name) out.

/// Which object kind an `ELEMENT_READ_NAME` request addresses. The wire byte
/// ranges for expander/manipulator/admin overlap a single `element_id`
/// space; `ElementKind::Expander`/`Manipulator`/`Admin` only exist so the
/// caller's `element_id` gets routed to the right disambiguated range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElementKind {
    Partition = 0,
    Zone = 1,
    User = 2,
    ExpanderOrManipulator = 3,
    Output = 4,
    ZoneWithParts = 5,
    Timer = 6,
    Telephone = 7,
    Object = 15,
    PartitionWithObject = 16,
    OutputWithDuration = 17,
    PartitionWithObjectOptions = 18,
    PartitionWithObjectOptionsDependencies = 19,
    Unknown = 255,
}

impl ElementKind {
    pub fn from_byte(v: u8) -> Self {
        use ElementKind::*;
        match v {
            0 => Partition,
            1 => Zone,
            2 => User,
            3 => ExpanderOrManipulator,
            4 => Output,
            5 => ZoneWithParts,
            6 => Timer,
            7 => Telephone,
            15 => Object,
            16 => PartitionWithObject,
            17 => OutputWithDuration,
            18 => PartitionWithObjectOptions,
            19 => PartitionWithObjectOptionsDependencies,
            _ => Unknown,
        }
    }
}

/// Disambiguates a `ExpanderOrManipulator`-kind element id into the actual
/// device family, per `spec.md` §3: `0x80..0xBF` is an expander, `0xC0..0xEF`
/// a manipulator, `0xF0` and above an admin (these share the user-number
/// space, offset by `0xF0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAddress {
    Expander(u8),
    Manipulator(u8),
    Admin(u8),
}

pub fn disambiguate_device_address(element_id: u8) -> DeviceAddress {
    match element_id {
        0x80..=0xBF => DeviceAddress::Expander(element_id),
        0xC0..=0xEF => DeviceAddress::Manipulator(element_id),
        _ => DeviceAddress::Admin(element_id),
    }
}

/// Builds the 2-byte `ELEMENT_READ_NAME` request payload.
pub fn encode_element_read_name(kind: ElementKind, element_id: u8) -> [u8; 2] {
    [kind as u8, element_id]
}

/// A decoded `ELEMENT_READ_NAME` response: the echoed kind/id, the
/// kind-specific tail bytes (lengths vary: partition carries none, output
/// carries a type byte, zone-with-parts carries a partition bitmap, ...),
/// and the trailing 16-byte ASCII name with trailing padding removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementName {
    pub kind: ElementKind,
    pub element_id: u8,
    pub extra: Vec<u8>,
    pub name: String,
}

impl ElementName {
    /// An empty placeholder for an element id the panel rejected as absent —
    /// the name loader substitutes this rather than failing the whole batch
    /// when a single id in a scanned range doesn't exist.
    pub fn empty(kind: ElementKind, element_id: u8) -> Self {
        Self { kind, element_id, extra: Vec::new(), name: String::new() }
    }
}

/// Decodes an `ELEMENT_READ_NAME` response body. The name sits at a fixed
/// offset (bytes 3..19) regardless of element kind — it's kind-specific
/// fields that move, one byte right after the header (byte 2: part/reaction/
/// output type, ...) and more after the name (byte 19 onward: object number,
/// duration, serial number, ...). Both are handed back concatenated in
/// `extra` (leading byte first) for the caller to interpret per `kind`.
pub fn decode_element_name(payload: &[u8]) -> Option<ElementName> {
    if payload.len() < 19 {
        return None;
    }
    let kind = ElementKind::from_byte(payload[0]);
    let element_id = payload[1];
    let name = String::from_utf8_lossy(&payload[3..19]).trim_end_matches(' ').to_string();
    let mut extra = Vec::with_capacity(1 + payload.len() - 19);
    extra.push(payload[2]);
    extra.extend_from_slice(&payload[19..]);
    Some(ElementName { kind, element_id, extra, name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disambiguates_expander_manipulator_and_admin_ranges() {
        assert!(matches!(disambiguate_device_address(0x80), DeviceAddress::Expander(0x80)));
        assert!(matches!(disambiguate_device_address(0xC0), DeviceAddress::Manipulator(0xC0)));
        assert!(matches!(disambiguate_device_address(0xF0), DeviceAddress::Admin(0xF0)));
    }

    #[test]
    fn decodes_a_partition_name_response() {
        // kind, id, a leading type byte (unused by a bare partition), then
        // the 16-byte name — nothing trails it.
        let mut payload = vec![ElementKind::Partition as u8, 1, 0x00];
        payload.extend_from_slice(b"Downstairs      ");
        let decoded = decode_element_name(&payload).unwrap();
        assert_eq!(decoded.name, "Downstairs");
        assert_eq!(decoded.extra, vec![0x00]);
    }

    #[test]
    fn keeps_kind_specific_leading_and_trailing_bytes_as_opaque_extra() {
        // ZoneWithParts: leading reaction-type byte, the fixed name, then a
        // trailing part-number byte at offset 19.
        let mut payload = vec![ElementKind::ZoneWithParts as u8, 3, 0x05];
        payload.extend_from_slice(b"Hallway PIR     ");
        payload.push(0x02);
        let decoded = decode_element_name(&payload).unwrap();
        assert_eq!(decoded.extra, vec![0x05, 0x02]);
        assert_eq!(decoded.name, "Hallway PIR");
    }

    #[test]
    fn rejects_a_response_shorter_than_the_fixed_name_offset() {
        let payload = vec![ElementKind::Partition as u8, 1, 0x00];
        assert!(decode_element_name(&payload).is_none());
    }
}
