//! User entity decoding and the `0xE0..0xEA` user-management command set
//! (`users.py` in the original package).
use bitflags::bitflags;

use crate::bitlist::{admin_no_from_bytes, parts_from_bytes, parts_to_bytes};
use crate::codes::code_to_bytes;

/// Coarse user category, derived from a user number rather than carried on
/// the wire: numbers `241..254` are admins, `255` is the installer/service
/// account, everything else is an ordinary user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserKind {
    User,
    Admin,
    Service,
}

impl UserKind {
    pub fn from_user_no(user_no: u16) -> Self {
        if user_no >= 255 {
            Self::Service
        } else if user_no >= 241 {
            Self::Admin
        } else {
            Self::User
        }
    }
}

bitflags! {
    /// The 27 defined user-rights bits (`spec.md` §3's `rights(24-bit flags
    /// + overflow)` — the panel packs 3 header bytes plus enough of a 4th to
    /// cover all 27).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UserRights: u32 {
        const ARMING = 0x0000_0001;
        const DISARMING = 0x0000_0002;
        const ALARM_CLEAR_IN_PART = 0x0000_0004;
        const ALARM_CLEAR_IN_OBJECT = 0x0000_0008;
        const ALARM_CLEAR_ALL_SYSTEM = 0x0000_0010;
        const ARM_DEFERRING = 0x0000_0020;
        const CODE_CHANGING = 0x0000_0040;
        const USERS_EDITING = 0x0000_0080;
        const ZONES_BYPASSING = 0x0000_0100;
        const CLOCK_SETTING = 0x0000_0200;
        const TROUBLES_VIEWING = 0x0000_0400;
        const EVENTS_VIEWING = 0x0000_0800;
        const ZONES_RESETTING = 0x0000_1000;
        const OPTIONS_CHANGING = 0x0000_2000;
        const TESTS = 0x0000_4000;
        const DOWNLOADING = 0x0000_8000;
        const CAN_ALWAYS_DISARM = 0x0001_0000;
        const VOICE_MESSAGE_CLEARING = 0x0002_0000;
        const GUARDX_USING = 0x0004_0000;
        const ACCESS_TEMP_BLOCK_PARTS = 0x0008_0000;
        const ENTERING_1ST_CODE = 0x0010_0000;
        const ENTERING_2ND_CODE = 0x0020_0000;
        const OUTPUTS_CONTROL = 0x0040_0000;
        const CLEARING_LATCHED_OUTPUTS = 0x0080_0000;
        const ZONES_ISOLATING = 0x0100_0000;
        const SIMPLE_USER = 0x0200_0000;
        const MASTER_USER = 0x0400_0000;
    }
}

/// How a user's code behaves: a single-use code, a duress code that silently
/// signals a hold-up, time-windowed codes, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UserType {
    Normal = 0,
    Single = 1,
    TimeRenewable = 2,
    TimeNonRenewable = 3,
    Duress = 4,
    MonoOutputs = 5,
    BiOutputs = 6,
    PartsTempBlocking = 7,
    CashMachineAccess = 8,
    Guard = 9,
    Schedule = 10,
    Invalid = 15,
}

impl UserType {
    pub fn from_byte(v: u8) -> Self {
        use UserType::*;
        match v {
            0 => Normal,
            1 => Single,
            2 => TimeRenewable,
            3 => TimeNonRenewable,
            4 => Duress,
            5 => MonoOutputs,
            6 => BiOutputs,
            7 => PartsTempBlocking,
            8 => CashMachineAccess,
            9 => Guard,
            10 => Schedule,
            _ => Invalid,
        }
    }
}

bitflags! {
    /// Flags describing the state of a user's codes (from `EXEC_USER_*`
    /// responses): whether the default code still needs changing, whether a
    /// collision was detected, etc.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UserCodeFlags: u8 {
        const CODE_NOT_CHANGED_YET = 0x01;
        const USER_CODE_COLLISION = 0x02;
        const PHONE_CODE_CHANGED = 0x04;
        const PREFIX_NEED_CHANGE = 0x08;
        const PHONE_CODE_NEED_CHANGE = 0x10;
        const USER_CODE_NEED_CHANGE = 0x20;
    }
}

/// A decoded user record (`spec.md` §3's User entity). Every field beyond
/// `user_no`/`kind` is firmware-version-gated on the wire — a response
/// shorter than the field's byte range leaves it at its default rather than
/// failing the whole decode, matching the panel's own progressive disclosure
/// of newer fields to newer firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_no: u16,
    pub kind: UserKind,
    pub name: String,
    pub parts: Vec<u16>,
    pub rights: UserRights,
    pub user_type: UserType,
    pub time: u8,
    pub time_temp: u8,
    pub object_no: u8,
    pub code_flags: UserCodeFlags,
    /// Only ever set by [`decode_self_info`], and only for an ordinary user
    /// (not an admin/service account).
    pub phone_code: Option<String>,
    /// Only ever set by [`decode_self_info`], and only for the
    /// installer/service account.
    pub existing_masters: Vec<u16>,
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end_matches(' ').to_string()
}

/// A status byte shared by both response shapes: type nibble, an isolating
/// bit, and three code-state bits whose meaning is identical in both
/// `decode_self_info` and `decode_other_info`.
fn apply_status_byte(status: u8, rights: &mut UserRights, code_flags: &mut UserCodeFlags) -> UserType {
    if status & 0x20 != 0 {
        *rights |= UserRights::ZONES_ISOLATING;
    }
    if status & 0x80 != 0 {
        *code_flags |= UserCodeFlags::CODE_NOT_CHANGED_YET;
    }
    if status & 0x40 != 0 {
        *code_flags |= UserCodeFlags::USER_CODE_COLLISION;
    }
    if status & 0x10 != 0 {
        *code_flags |= UserCodeFlags::PHONE_CODE_CHANGED;
    }
    UserType::from_byte(status & 0x0F)
}

/// The trailing overflow byte both response shapes carry once the panel's
/// firmware is new enough to report the 27th/26th rights bits: two more
/// rights bits, three more code-state bits, and the object number.
fn apply_overflow_byte(overflow: u8, rights: &mut UserRights, code_flags: &mut UserCodeFlags) -> u8 {
    if overflow & 0x80 != 0 {
        *rights |= UserRights::SIMPLE_USER;
    }
    if overflow & 0x40 != 0 {
        *rights |= UserRights::MASTER_USER;
    }
    if overflow & 0x20 != 0 {
        *code_flags |= UserCodeFlags::PREFIX_NEED_CHANGE;
    }
    if overflow & 0x10 != 0 {
        *code_flags |= UserCodeFlags::PHONE_CODE_NEED_CHANGE;
    }
    if overflow & 0x08 != 0 {
        *code_flags |= UserCodeFlags::USER_CODE_NEED_CHANGE;
    }
    overflow & 0x07
}

fn rights_word(bytes: &[u8]) -> UserRights {
    let mut buf = [0u8; 4];
    buf[..3].copy_from_slice(bytes);
    UserRights::from_bits_truncate(u32::from_le_bytes(buf))
}

/// Decodes a `UserReadSelfInfo` response: the caller's own record, plus a
/// kind-dependent leading field (a phone code for an ordinary user, the list
/// of existing master/admin numbers for the installer account).
pub fn decode_self_info(payload: &[u8]) -> Option<User> {
    let len = payload.len();
    let &user_no = payload.first()?;
    let kind = UserKind::from_user_no(user_no as u16);

    let mut phone_code = None;
    let mut existing_masters = Vec::new();
    if len > 2 {
        match kind {
            UserKind::User => phone_code = Some(hex_lower(&payload[1..3])),
            UserKind::Service => existing_masters = admin_no_from_bytes(&payload[1..2]),
            UserKind::Admin => {}
        }
    }

    let parts = if len > 6 { parts_from_bytes(&payload[3..7]) } else { Vec::new() };

    let mut rights = UserRights::empty();
    let mut code_flags = UserCodeFlags::empty();
    let mut user_type = UserType::Invalid;
    if len > 7 {
        user_type = apply_status_byte(payload[7], &mut rights, &mut code_flags);
    }
    if len > 11 {
        rights |= rights_word(&payload[9..12]);
    }
    let name = if len > 27 { decode_name(&payload[12..28]) } else { String::new() };
    let mut object_no = 0;
    if len > 28 {
        object_no = apply_overflow_byte(payload[28], &mut rights, &mut code_flags);
    }

    Some(User {
        user_no: user_no as u16,
        kind,
        name,
        parts,
        rights,
        user_type,
        time: 0,
        time_temp: 0,
        object_no,
        code_flags,
        phone_code,
        existing_masters,
    })
}

/// Decodes a `UserReadOtherInfo` response: another user's record, laid out
/// identically to [`decode_self_info`] minus its kind-dependent leading
/// field, so every later offset sits one byte earlier.
pub fn decode_other_info(payload: &[u8]) -> Option<User> {
    let len = payload.len();
    let &user_no = payload.first()?;
    let kind = UserKind::from_user_no(user_no as u16);

    let parts = if len > 4 { parts_from_bytes(&payload[1..5]) } else { Vec::new() };

    let mut rights = UserRights::empty();
    let mut code_flags = UserCodeFlags::empty();
    let mut user_type = UserType::Invalid;
    if len > 5 {
        user_type = apply_status_byte(payload[5], &mut rights, &mut code_flags);
    }
    let time = if len > 6 { payload[6] } else { 0 };
    let time_temp = if len > 7 { payload[7] } else { 0 };
    if len > 10 {
        rights |= rights_word(&payload[8..11]);
    }
    let name = if len > 27 { decode_name(&payload[11..27]) } else { String::new() };
    let mut object_no = 0;
    if len > 27 {
        object_no = apply_overflow_byte(payload[27], &mut rights, &mut code_flags);
    }

    Some(User {
        user_no: user_no as u16,
        kind,
        name,
        parts,
        rights,
        user_type,
        time,
        time_temp,
        object_no,
        code_flags,
        phone_code: None,
        existing_masters: Vec::new(),
    })
}

/// Builds the fixed-layout user record an `EXEC_USER_CREATE`/
/// `EXEC_USER_CHANGE` payload carries after its 8-byte code header: user
/// number, packed user/phone codes, partition bitmap, a status byte (type
/// nibble plus simple/master/isolating bits), the type-dependent time
/// fields, the 24-bit rights word, and the space-padded name. A create also
/// appends an explicit object number the panel doesn't otherwise accept.
pub fn encode_user_write(
    user_no: u8,
    user_code: &str,
    phone_code: &str,
    parts: &[u16],
    user_type: UserType,
    rights: UserRights,
    time: u8,
    time_temp: u8,
    name: &str,
    object_no_on_create: Option<u8>,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(33 + 1);
    out.push(user_no);
    out.extend(code_to_bytes(user_code, 8));
    out.extend(code_to_bytes(phone_code, 4));
    out.extend(parts_to_bytes(parts));

    let mut status = user_type as u8 & 0x0F;
    if rights.contains(UserRights::SIMPLE_USER) {
        status |= 0x80;
    }
    if rights.contains(UserRights::MASTER_USER) {
        status |= 0x40;
    }
    if rights.contains(UserRights::ZONES_ISOLATING) {
        status |= 0x20;
    }
    out.push(status);

    let uses_time = matches!(
        user_type,
        UserType::TimeRenewable | UserType::TimeNonRenewable | UserType::PartsTempBlocking | UserType::Schedule
    );
    out.push(if uses_time { time } else { 0 });
    out.push(if matches!(user_type, UserType::Schedule) { time_temp } else { 0 });

    out.extend_from_slice(&(rights.bits() & 0x00FF_FFFF).to_le_bytes()[..3]);

    let mut name_bytes = name.as_bytes()[..name.len().min(16)].to_vec();
    name_bytes.resize(16, b' ');
    out.extend(name_bytes);

    if let Some(object_no) = object_no_on_create {
        out.push(object_no);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_user_numbers_by_range() {
        assert_eq!(UserKind::from_user_no(30), UserKind::User);
        assert_eq!(UserKind::from_user_no(241), UserKind::Admin);
        assert_eq!(UserKind::from_user_no(255), UserKind::Service);
    }

    #[test]
    fn decodes_own_phone_code_for_an_ordinary_user() {
        let mut payload = vec![5u8, 0x12, 0x34];
        payload.resize(7, 0);
        payload.extend_from_slice(&parts_to_bytes(&[1, 2]));
        let user = decode_self_info(&payload).unwrap();
        assert_eq!(user.user_no, 5);
        assert_eq!(user.kind, UserKind::User);
        assert_eq!(user.phone_code.as_deref(), Some("1234"));
        assert!(user.existing_masters.is_empty());
    }

    #[test]
    fn decodes_existing_masters_for_the_service_account() {
        let mut payload = vec![255u8, 0b0000_0011];
        payload.resize(7, 0);
        let user = decode_self_info(&payload).unwrap();
        assert_eq!(user.kind, UserKind::Service);
        assert_eq!(user.existing_masters, vec![0xF1, 0xF2]);
        assert!(user.phone_code.is_none());
    }

    #[test]
    fn decodes_rights_split_across_status_word_and_overflow_byte() {
        let mut payload = vec![0u8; 29];
        payload[0] = 10;
        payload[7] = 0x20; // ZONES_ISOLATING bit in the status byte
        payload[9..12].copy_from_slice(&(UserRights::ARMING | UserRights::DISARMING).bits().to_le_bytes()[..3]);
        payload[12..28].copy_from_slice(b"Alice           ");
        payload[28] = 0x80; // SIMPLE_USER bit, plus object_no low 3 bits (0)

        let user = decode_self_info(&payload).unwrap();
        assert_eq!(user.name, "Alice");
        assert!(user.rights.contains(UserRights::ZONES_ISOLATING));
        assert!(user.rights.contains(UserRights::ARMING | UserRights::DISARMING));
        assert!(user.rights.contains(UserRights::SIMPLE_USER));
    }

    #[test]
    fn other_info_layout_is_self_info_shifted_one_byte_earlier() {
        let mut payload = vec![0u8; 28];
        payload[0] = 7;
        payload[5] = UserType::Guard as u8;
        payload[6] = 3; // time
        payload[11..27].copy_from_slice(b"Bob             ");
        payload[27] = 0x07; // object_no = 7

        let user = decode_other_info(&payload).unwrap();
        assert_eq!(user.user_no, 7);
        assert_eq!(user.name, "Bob");
        assert_eq!(user.user_type, UserType::Guard);
        assert_eq!(user.time, 3);
        assert_eq!(user.object_no, 7);
    }

    #[test]
    fn encodes_a_create_payload_with_trailing_object_number() {
        let payload = encode_user_write(
            9,
            "1234",
            "",
            &[1, 2],
            UserType::Normal,
            UserRights::ARMING,
            0,
            0,
            "Alice",
            Some(3),
        );
        assert_eq!(payload.len(), 1 + 4 + 2 + 4 + 1 + 1 + 1 + 3 + 16 + 1);
        assert_eq!(payload[0], 9);
        assert_eq!(*payload.last().unwrap(), 3);
    }

    #[test]
    fn change_payload_has_no_trailing_object_number() {
        let payload = encode_user_write(9, "1234", "", &[], UserType::Normal, UserRights::empty(), 0, 0, "", None);
        assert_eq!(payload.len(), 1 + 4 + 2 + 4 + 1 + 1 + 1 + 3 + 16);
    }
}
