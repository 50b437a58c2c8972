//! `EXEC_READ_EVENT` (0x8C) event-log records and `EXEC_GET_EVENT_TEXT`
//! (0x8F) textual descriptions (`events.py` in the original package).
use bitflags::bitflags;

pub const EVENT_RECORD_LEN: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventMonitoringStatus {
    New = 0,
    Sent = 1,
    NotSent = 2,
    NotMonitored = 3,
}

impl EventMonitoringStatus {
    fn from_bits(v: u8) -> Self {
        match v & 0x03 {
            0 => Self::New,
            1 => Self::Sent,
            2 => Self::NotSent,
            _ => Self::NotMonitored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventClass {
    ZoneAndTamperAlarms = 0,
    PartAndExpanderAlarms = 1,
    ArmingDisarmingAlarmClearing = 2,
    ZoneBypassSetUnset = 3,
    AccessControl = 4,
    Troubles = 5,
    UserFunctions = 6,
    SystemEvents = 7,
}

impl EventClass {
    fn from_bits(v: u8) -> Self {
        use EventClass::*;
        match v & 0x07 {
            0 => ZoneAndTamperAlarms,
            1 => PartAndExpanderAlarms,
            2 => ArmingDisarmingAlarmClearing,
            3 => ZoneBypassSetUnset,
            4 => AccessControl,
            5 => Troubles,
            6 => UserFunctions,
            _ => SystemEvents,
        }
    }
}

/// A decoded event-log record. `index`/`index_called` are raw 24-bit
/// pointers into the panel's circular event log, used to page backwards
/// through history with further `EXEC_READ_EVENT` calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub no_more: bool,
    pub year_marker: u8,
    pub present: bool,
    pub monitoring_status1: EventMonitoringStatus,
    pub monitoring_status2: EventMonitoringStatus,
    pub event_class: EventClass,
    pub day: u8,
    pub month: u8,
    pub minutes: u16,
    pub part_no: u8,
    pub restore: bool,
    pub code: u16,
    pub source_no: u8,
    pub object_no: u8,
    pub user_ctrl_no: u8,
    pub index: u32,
    pub index_called: u32,
}

impl EventRecord {
    /// 10-bit `code` with the `restore` bit folded back in at bit 10,
    /// matching the value `EXEC_GET_EVENT_TEXT` expects as `code_full`.
    pub fn code_full(&self) -> u16 {
        ((self.restore as u16) << 10) | (self.code & 0x03FF)
    }
}

/// Decodes a 14-byte `EXEC_READ_EVENT` response record. Byte 0's bit 0x20
/// doubles as both "entry is empty" and (inverted) "no more records exist";
/// when it signals "no more", the rest of the fixed fields are left at
/// their default and only the two trailing pointers are read.
pub fn decode_event_record(payload: &[u8]) -> Option<EventRecord> {
    if payload.len() < EVENT_RECORD_LEN {
        return None;
    }
    let no_more = payload[0] & 0x20 == 0;
    let mut rec = EventRecord {
        no_more,
        year_marker: 0,
        present: false,
        monitoring_status1: EventMonitoringStatus::NotMonitored,
        monitoring_status2: EventMonitoringStatus::NotMonitored,
        event_class: EventClass::SystemEvents,
        day: 0,
        month: 0,
        minutes: 0,
        part_no: 0,
        restore: false,
        code: 0,
        source_no: 0,
        object_no: 0,
        user_ctrl_no: 0,
        index: u32::from_be_bytes([0, payload[8], payload[9], payload[10]]),
        index_called: u32::from_be_bytes([0, payload[11], payload[12], payload[13]]),
    };
    if !no_more {
        rec.year_marker = (payload[0] & 0xC0) >> 6;
        rec.present = payload[0] & 0x10 != 0;
        rec.monitoring_status2 = EventMonitoringStatus::from_bits((payload[0] & 0x0C) >> 2);
        rec.monitoring_status1 = EventMonitoringStatus::from_bits(payload[0] & 0x03);
        rec.event_class = EventClass::from_bits((payload[1] & 0xE0) >> 5);
        rec.day = payload[1] & 0x1F;
        rec.month = (payload[2] & 0xF0) >> 4;
        rec.minutes = ((payload[2] as u16 & 0x0F) << 8) | payload[3] as u16;
        rec.part_no = (payload[4] & 0xF8) >> 3;
        rec.restore = payload[4] & 0x04 != 0;
        rec.code = ((payload[4] as u16 & 0x03) << 8) | payload[5] as u16;
        rec.source_no = payload[6];
        rec.object_no = (payload[7] & 0xE0) >> 5;
        rec.user_ctrl_no = payload[7] & 0x1F;
    }
    Some(rec)
}

/// Encodes the 3-byte big-endian event pointer `EXEC_READ_EVENT` takes as
/// its request body.
pub fn encode_event_pointer(index: u32) -> [u8; 3] {
    let b = index.to_be_bytes();
    [b[1], b[2], b[3]]
}

bitflags! {
    /// Which optional fields an event-text template references (partition,
    /// zone/expander, user, timer, telephone number, ...), decoded from
    /// `EXEC_GET_EVENT_TEXT`'s short-kind bitmap.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventKindShort: u16 {
        const PARTITION = 0x0001;
        const ZONE_EXPANDER_KEYPAD = 0x0002;
        const USER = 0x0004;
        const EXPANDER = 0x0008;
        const KEYPAD = 0x0010;
        const OUTPUT_EXPANDER = 0x0020;
        const TIMER = 0x0040;
        const PROX_CARD_READER = 0x0080;
        const TELEPHONE = 0x0100;
        const NUMBER = 0x0200;
        const DATA_BUS = 0x0400;
        const CALL_BACK = 0x0800;
        const PHONE_RELAY = 0x1000;
        const TCP_IP = 0x2000;
        const ABAX = 0x4000;
        const MONITOR = 0x8000;
    }
}

/// A decoded `EXEC_GET_EVENT_TEXT` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventText {
    pub event_code: u16,
    pub event_code_full: u16,
    pub restore: bool,
    pub show_long: bool,
    pub long_kind: u8,
    pub short_kind: EventKindShort,
    pub text: String,
}

/// Builds the 16-bit big-endian request: `(show_long << 15) | (code_full &
/// 0x7FF)`.
pub fn encode_event_text_request(show_long: bool, code_full: u16) -> [u8; 2] {
    let value = ((show_long as u16) << 15) | (code_full & 0x07FF);
    value.to_be_bytes()
}

/// Decodes an `EXEC_GET_EVENT_TEXT` response: echoed 2-byte code/flags, a
/// long-kind byte, a 16-bit short-kind bitmap, then ASCII text padded to 16
/// (short) or 46 (long) bytes.
pub fn decode_event_text(payload: &[u8]) -> Option<EventText> {
    if payload.len() < 2 {
        return None;
    }
    let value = ((payload[0] as u16) << 8) | payload[1] as u16;
    let event_code_full = value & 0x07FF;
    let event_code = value & 0x03FF;
    let restore = event_code_full & 0x0400 != 0;
    let show_long = value & 0x8000 != 0;
    let long_kind = payload.get(2).copied().unwrap_or(0);
    let short_kind = if payload.len() > 4 {
        EventKindShort::from_bits_truncate(((payload[3] as u16) << 8) | payload[4] as u16)
    } else {
        EventKindShort::empty()
    };
    let expected_len = if show_long { 46 } else { 16 };
    let text = if payload.len() > 5 && payload[5] != 0 {
        String::from_utf8_lossy(&payload[5..]).trim_end().to_string()
    } else {
        " ".repeat(expected_len).trim_end().to_string()
    };
    Some(EventText {
        event_code,
        event_code_full,
        restore,
        show_long,
        long_kind,
        short_kind,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_byte_bit_0x20_clear_means_no_more_records() {
        let mut payload = vec![0u8; EVENT_RECORD_LEN];
        payload[0] = 0x00;
        let rec = decode_event_record(&payload).unwrap();
        assert!(rec.no_more);
    }

    #[test]
    fn decodes_a_populated_record() {
        let mut payload = vec![0u8; EVENT_RECORD_LEN];
        payload[0] = 0x20 | 0x10 | (2 << 2) | 1; // present, class fields below
        payload[1] = (2 << 5) | 15; // event_class=2, day=15
        payload[2] = (3 << 4) | 0x01; // month=3, minutes high nibble = 1
        payload[3] = 0x2C; // minutes low byte -> minutes = 0x12C = 300
        payload[4] = (1 << 3) | 0x04; // part_no=1, restore=true
        payload[5] = 0x10;
        payload[6] = 7; // source_no
        payload[7] = (3 << 5) | 5; // object_no=3, user_ctrl_no=5
        let rec = decode_event_record(&payload).unwrap();
        assert!(!rec.no_more);
        assert!(rec.present);
        assert_eq!(rec.day, 15);
        assert_eq!(rec.event_class, EventClass::ArmingDisarmingAlarmClearing);
        assert_eq!(rec.minutes, 300);
        assert_eq!(rec.part_no, 1);
        assert!(rec.restore);
        assert_eq!(rec.source_no, 7);
        assert_eq!(rec.object_no, 3);
        assert_eq!(rec.user_ctrl_no, 5);
    }

    #[test]
    fn event_text_request_packs_show_long_and_code() {
        let bytes = encode_event_text_request(true, 0x3FF);
        let value = u16::from_be_bytes(bytes);
        assert_eq!(value & 0x8000, 0x8000);
        assert_eq!(value & 0x07FF, 0x3FF);
    }

    #[test]
    fn decodes_event_text_with_trailing_ascii() {
        let mut payload = vec![0x03, 0xFF, 0x00, 0x00, 0x01];
        payload.extend_from_slice(b"Zone violation  ");
        let text = decode_event_text(&payload).unwrap();
        assert_eq!(text.text, "Zone violation");
        assert!(text.short_kind.contains(EventKindShort::ZONE_EXPANDER_KEYPAD));
    }
}
