//! Typed payload builders/decoders for the command set `spec.md` §4.4
//! singles out: arm/disarm and friends, RTC/version reads, and the
//! system-changes registration-and-poll command.
use satel_core::{DayOfWeek, ModuleCaps};

use crate::codes::code_to_bytes;
use crate::date::{decode_date_hex, decode_date_str, DecodedDate};

/// Builds the body shared by arm/disarm/clear-alarm/bypass-set/unset/
/// outputs-on/off/switch/zones-isolate/open-door: an 8-byte packed user
/// code followed by a target bitmap.
///
/// `target_bitmap` is expected to already be the correctly-sized bitmap for
/// the command's target kind (parts, zones, or outputs — outputs vary in
/// width with [`ModuleCaps::BYTE_32`]).
pub fn encode_code_and_bitmap(user_code: &str, target_bitmap: &[u8]) -> Vec<u8> {
    let mut out = code_to_bytes(user_code, 16);
    out.extend_from_slice(target_bitmap);
    out
}

/// Arming carries one more optional trailing byte (`0x80`) when the module
/// advertises [`ModuleCaps::ARM_NO_BYPASS`].
pub fn encode_arm(user_code: &str, parts_bitmap: &[u8], module_caps: ModuleCaps) -> Vec<u8> {
    let mut out = encode_code_and_bitmap(user_code, parts_bitmap);
    if module_caps.contains(ModuleCaps::ARM_NO_BYPASS) {
        out.push(0x80);
    }
    out
}

/// Outputs bitmaps are 16 bytes (128 outputs) normally, 32 bytes (256
/// outputs) when the module advertises [`ModuleCaps::BYTE_32`].
pub fn outputs_bitmap_len(module_caps: ModuleCaps) -> usize {
    if module_caps.contains(ModuleCaps::BYTE_32) {
        32
    } else {
        16
    }
}

/// Zones bitmaps widen the same way outputs bitmaps do: 16 bytes (128
/// zones) normally, 32 bytes (256 zones) under [`ModuleCaps::BYTE_32`].
pub fn zones_bitmap_len(module_caps: ModuleCaps) -> usize {
    if module_caps.contains(ModuleCaps::BYTE_32) {
        32
    } else {
        16
    }
}

/// A decoded `READ_RTC_AND_STATUS` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcAndStatus {
    pub date: Option<DecodedDate>,
    pub day_of_week: DayOfWeek,
    pub service_mode: bool,
    pub troubles: bool,
    pub acu_present: bool,
    pub intrx_present: bool,
    pub troubles_memory: bool,
    pub grade23: bool,
    pub panel_type_nibble: u8,
}

/// Decodes the 9-byte `READ_RTC_AND_STATUS` body: 7 BCD date/time bytes,
/// then two status bytes.
pub fn decode_rtc_and_status(payload: &[u8]) -> Option<RtcAndStatus> {
    if payload.len() < 9 {
        return None;
    }
    let date = decode_date_hex(&payload[0..7]);
    let status1 = payload[7];
    let status2 = payload[8];
    Some(RtcAndStatus {
        date,
        day_of_week: DayOfWeek::from_index((status1 & 0x07) % 7).unwrap_or(DayOfWeek::Monday),
        service_mode: status1 & 0x80 != 0,
        troubles: status1 & 0x40 != 0,
        acu_present: status2 & 0x80 != 0,
        intrx_present: status2 & 0x40 != 0,
        troubles_memory: status2 & 0x20 != 0,
        grade23: status2 & 0x10 != 0,
        panel_type_nibble: status2 & 0x0F,
    })
}

/// Encodes the 7-byte BCD date/time `EXEC_SET_RTC_CLOCK` takes as its
/// request body.
pub fn encode_rtc_set(year: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> [u8; 7] {
    let bcd = |v: u32| (((v / 10) as u8) << 4) | (v % 10) as u8;
    [
        bcd(year / 100),
        bcd(year % 100),
        bcd(month),
        bcd(day),
        bcd(hour),
        bcd(minute),
        bcd(second),
    ]
}

/// A decoded `READ_INTEGRA_VERSION` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegraVersion {
    pub panel_type: u8,
    pub version_major: u8,
    pub version_minor: u8,
    pub release_date: (u32, u32, u32),
    pub language: u8,
    pub in_flash: bool,
}

/// Decodes `READ_INTEGRA_VERSION`'s body: panel-type byte, 11 ASCII chars
/// `M mm YYYYMMDD`, language byte, in-flash sentinel byte.
pub fn decode_integra_version(payload: &[u8]) -> Option<IntegraVersion> {
    if payload.len() < 14 {
        return None;
    }
    let panel_type = payload[0];
    let version_major = payload[1] - b'0';
    let version_minor = (payload[2] - b'0') * 10 + (payload[3] - b'0');
    let release_date = decode_date_str(&payload[4..12])?;
    let language = payload[12];
    let in_flash = payload[13] != 0;
    Some(IntegraVersion {
        panel_type,
        version_major,
        version_minor,
        release_date,
        language,
        in_flash,
    })
}

/// A decoded `READ_MODULE_VERSION` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleVersion {
    pub version_major: u8,
    pub version_minor: u8,
    pub release_date: (u32, u32, u32),
    pub caps: ModuleCaps,
}

/// Decodes `READ_MODULE_VERSION`'s 12-byte body: 11 ASCII version+date
/// chars, then one capability byte.
pub fn decode_module_version(payload: &[u8]) -> Option<ModuleVersion> {
    if payload.len() < 12 {
        return None;
    }
    let version_major = payload[0] - b'0';
    let version_minor = (payload[1] - b'0') * 10 + (payload[2] - b'0');
    let release_date = decode_date_str(&payload[3..11])?;
    let caps = ModuleCaps::from_bits_truncate(payload[11]);
    Some(ModuleVersion {
        version_major,
        version_minor,
        release_date,
        caps,
    })
}

/// Builds the `READ_SYSTEM_CHANGES` request body: empty (just poll changes
/// since last call), 1 byte (blocks 1-5 to monitor), or 2 bytes (blocks 1-8,
/// requires a `TROUBLE8`-capable module for the second byte's high bits).
pub fn encode_system_changes_request(blocks: Option<(u8, Option<u8>)>) -> Vec<u8> {
    match blocks {
        None => Vec::new(),
        Some((low, None)) => vec![low],
        Some((low, Some(high))) => vec![low, high],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_appends_the_arm_no_bypass_sentinel_only_when_advertised() {
        let with = encode_arm("1234", &[0x01, 0, 0, 0], ModuleCaps::ARM_NO_BYPASS);
        assert_eq!(*with.last().unwrap(), 0x80);

        let without = encode_arm("1234", &[0x01, 0, 0, 0], ModuleCaps::empty());
        assert_eq!(*without.last().unwrap(), 0x00);
    }

    #[test]
    fn outputs_bitmap_widens_with_byte_32_capability() {
        assert_eq!(outputs_bitmap_len(ModuleCaps::empty()), 16);
        assert_eq!(outputs_bitmap_len(ModuleCaps::BYTE_32), 32);
    }

    #[test]
    fn zones_bitmap_widens_with_byte_32_capability() {
        assert_eq!(zones_bitmap_len(ModuleCaps::empty()), 16);
        assert_eq!(zones_bitmap_len(ModuleCaps::BYTE_32), 32);
    }

    #[test]
    fn rtc_set_and_status_round_trip_the_date_fields() {
        let bytes = encode_rtc_set(2024, 3, 15, 9, 30, 0);
        let mut payload = bytes.to_vec();
        payload.push(0x05); // service_mode(bit7)=0, troubles(bit6)=0, dow=5
        payload.push(0x00);
        let status = decode_rtc_and_status(&payload).unwrap();
        assert_eq!(status.date.unwrap().year, 2024);
        assert_eq!(status.day_of_week, DayOfWeek::Saturday);
    }

    #[test]
    fn rtc_day_of_week_wraps_the_unused_7th_bit_pattern_to_monday() {
        let bytes = encode_rtc_set(2024, 3, 15, 9, 30, 0);
        let mut payload = bytes.to_vec();
        payload.push(0x07); // dow bits = 7, wraps to Monday per the panel's own `% 7`
        payload.push(0x00);
        let status = decode_rtc_and_status(&payload).unwrap();
        assert_eq!(status.day_of_week, DayOfWeek::Monday);
    }

    #[test]
    fn decodes_integra_version_fields() {
        let mut payload = vec![3u8]; // panel type = Integra128
        payload.extend_from_slice(b"10520240315");
        payload.push(1); // language = EN
        payload.push(1); // in_flash
        let v = decode_integra_version(&payload).unwrap();
        assert_eq!(v.panel_type, 3);
        assert_eq!((v.version_major, v.version_minor), (1, 5));
        assert_eq!(v.release_date, (2024, 3, 15));
        assert!(v.in_flash);
    }
}
