/// Every command/response opcode the panel protocol defines. Discriminants
/// match the wire byte exactly — `Opcode::ReadZonesViolation as u8 == 0x00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    ReadZonesViolation = 0x00,
    ReadZonesTamper = 0x01,
    ReadZonesAlarm = 0x02,
    ReadZonesTamperAlarm = 0x03,
    ReadZonesAlarmMemory = 0x04,
    ReadZonesTamperAlarmMemory = 0x05,
    ReadZonesBypass = 0x06,
    ReadZonesNoViolationTrouble = 0x07,
    ReadZonesLongViolationTrouble = 0x08,
    ReadPartsArmedSuppressed = 0x09,
    ReadPartsArmedReally = 0x0A,
    ReadPartsArmedMode2 = 0x0B,
    ReadPartsArmedMode3 = 0x0C,
    ReadParts1stCodeEntered = 0x0D,
    ReadPartsEntryTime = 0x0E,
    ReadPartsExitTimeAbove10 = 0x0F,
    ReadPartsExitTimeBelow10 = 0x10,
    ReadPartsTempBlocked = 0x11,
    ReadPartsBlockedForGuard = 0x12,
    ReadPartsAlarm = 0x13,
    ReadPartsFireAlarm = 0x14,
    ReadPartsAlarmMemory = 0x15,
    ReadPartsFireAlarmMemory = 0x16,
    ReadOutputsState = 0x17,
    ReadDoorsOpened = 0x18,
    ReadDoorsOpenedLong = 0x19,
    ReadRtcAndStatus = 0x1A,
    ReadTroublesPart1 = 0x1B,
    ReadTroublesPart2 = 0x1C,
    ReadTroublesPart3 = 0x1D,
    ReadTroublesPart4 = 0x1E,
    ReadTroublesPart5 = 0x1F,
    ReadTroublesMemoryPart1 = 0x20,
    ReadTroublesMemoryPart2 = 0x21,
    ReadTroublesMemoryPart3 = 0x22,
    ReadTroublesMemoryPart4 = 0x23,
    ReadTroublesMemoryPart5 = 0x24,
    ReadPartsWithViolatedZones = 0x25,
    ReadZonesIsolate = 0x26,
    ReadPartsWithVerifiedAlarms = 0x27,
    ReadZonesMasked = 0x28,
    ReadZonesMaskedMemory = 0x29,
    ReadPartsArmedMode1 = 0x2A,
    ReadPartsWithWarningAlarms = 0x2B,
    ReadTroublesPart6 = 0x2C,
    ReadTroublesPart7 = 0x2D,
    ReadTroublesMemoryPart6 = 0x2E,
    ReadTroublesMemoryPart7 = 0x2F,
    ReadTroublesPart8 = 0x30,
    ReadTroublesMemoryPart8 = 0x31,

    ReadOutputPower = 0x7B,
    ReadModuleVersion = 0x7C,
    ReadZoneTemperature = 0x7D,
    ReadIntegraVersion = 0x7E,
    ReadSystemChanges = 0x7F,

    ExecArmMode0 = 0x80,
    ExecArmMode1 = 0x81,
    ExecArmMode2 = 0x82,
    ExecArmMode3 = 0x83,
    ExecDisarm = 0x84,
    ExecClearAlarm = 0x85,
    ExecZonesBypassSet = 0x86,
    ExecZonesBypassUnset = 0x87,
    ExecOutputsOn = 0x88,
    ExecOutputsOff = 0x89,
    ExecOpenDoor = 0x8A,
    ExecClearTroubleMemory = 0x8B,
    ExecReadEvent = 0x8C,
    ExecEnter1stCode = 0x8D,
    ExecSetRtcClock = 0x8E,
    ExecGetEventText = 0x8F,
    ExecZonesIsolate = 0x90,
    ExecOutputsSwitch = 0x91,

    ExecForceArmMode0 = 0xA0,
    ExecForceArmMode1 = 0xA1,
    ExecForceArmMode2 = 0xA2,
    ExecForceArmMode3 = 0xA3,

    UserReadSelfInfo = 0xE0,
    UserReadOtherInfo = 0xE1,
    UserReadUsersList = 0xE2,
    UserReadUserLocks = 0xE3,
    UserWriteUserLocks = 0xE4,
    UserRemove = 0xE5,
    UserCreate = 0xE6,
    UserChange = 0xE7,
    UserManageDevs = 0xE8,
    UserChangeCode = 0xE9,
    UserChangePhoneCode = 0xEA,

    ElementReadName = 0xEE,
    ReadResult = 0xEF,
}

impl Opcode {
    pub fn from_byte(v: u8) -> Option<Self> {
        use Opcode::*;
        Some(match v {
            0x00 => ReadZonesViolation,
            0x01 => ReadZonesTamper,
            0x02 => ReadZonesAlarm,
            0x03 => ReadZonesTamperAlarm,
            0x04 => ReadZonesAlarmMemory,
            0x05 => ReadZonesTamperAlarmMemory,
            0x06 => ReadZonesBypass,
            0x07 => ReadZonesNoViolationTrouble,
            0x08 => ReadZonesLongViolationTrouble,
            0x09 => ReadPartsArmedSuppressed,
            0x0A => ReadPartsArmedReally,
            0x0B => ReadPartsArmedMode2,
            0x0C => ReadPartsArmedMode3,
            0x0D => ReadParts1stCodeEntered,
            0x0E => ReadPartsEntryTime,
            0x0F => ReadPartsExitTimeAbove10,
            0x10 => ReadPartsExitTimeBelow10,
            0x11 => ReadPartsTempBlocked,
            0x12 => ReadPartsBlockedForGuard,
            0x13 => ReadPartsAlarm,
            0x14 => ReadPartsFireAlarm,
            0x15 => ReadPartsAlarmMemory,
            0x16 => ReadPartsFireAlarmMemory,
            0x17 => ReadOutputsState,
            0x18 => ReadDoorsOpened,
            0x19 => ReadDoorsOpenedLong,
            0x1A => ReadRtcAndStatus,
            0x1B => ReadTroublesPart1,
            0x1C => ReadTroublesPart2,
            0x1D => ReadTroublesPart3,
            0x1E => ReadTroublesPart4,
            0x1F => ReadTroublesPart5,
            0x20 => ReadTroublesMemoryPart1,
            0x21 => ReadTroublesMemoryPart2,
            0x22 => ReadTroublesMemoryPart3,
            0x23 => ReadTroublesMemoryPart4,
            0x24 => ReadTroublesMemoryPart5,
            0x25 => ReadPartsWithViolatedZones,
            0x26 => ReadZonesIsolate,
            0x27 => ReadPartsWithVerifiedAlarms,
            0x28 => ReadZonesMasked,
            0x29 => ReadZonesMaskedMemory,
            0x2A => ReadPartsArmedMode1,
            0x2B => ReadPartsWithWarningAlarms,
            0x2C => ReadTroublesPart6,
            0x2D => ReadTroublesPart7,
            0x2E => ReadTroublesMemoryPart6,
            0x2F => ReadTroublesMemoryPart7,
            0x30 => ReadTroublesPart8,
            0x31 => ReadTroublesMemoryPart8,
            0x7B => ReadOutputPower,
            0x7C => ReadModuleVersion,
            0x7D => ReadZoneTemperature,
            0x7E => ReadIntegraVersion,
            0x7F => ReadSystemChanges,
            0x80 => ExecArmMode0,
            0x81 => ExecArmMode1,
            0x82 => ExecArmMode2,
            0x83 => ExecArmMode3,
            0x84 => ExecDisarm,
            0x85 => ExecClearAlarm,
            0x86 => ExecZonesBypassSet,
            0x87 => ExecZonesBypassUnset,
            0x88 => ExecOutputsOn,
            0x89 => ExecOutputsOff,
            0x8A => ExecOpenDoor,
            0x8B => ExecClearTroubleMemory,
            0x8C => ExecReadEvent,
            0x8D => ExecEnter1stCode,
            0x8E => ExecSetRtcClock,
            0x8F => ExecGetEventText,
            0x90 => ExecZonesIsolate,
            0x91 => ExecOutputsSwitch,
            0xA0 => ExecForceArmMode0,
            0xA1 => ExecForceArmMode1,
            0xA2 => ExecForceArmMode2,
            0xA3 => ExecForceArmMode3,
            0xE0 => UserReadSelfInfo,
            0xE1 => UserReadOtherInfo,
            0xE2 => UserReadUsersList,
            0xE3 => UserReadUserLocks,
            0xE4 => UserWriteUserLocks,
            0xE5 => UserRemove,
            0xE6 => UserCreate,
            0xE7 => UserChange,
            0xE8 => UserManageDevs,
            0xE9 => UserChangeCode,
            0xEA => UserChangePhoneCode,
            0xEE => ElementReadName,
            0xEF => ReadResult,
            _ => return None,
        })
    }

    /// True for the state-read opcodes the panel may push unsolicited, as a
    /// broadcast, in addition to delivering them as an ordinary response.
    pub fn is_broadcast_eligible(self) -> bool {
        (Opcode::ReadZonesViolation as u8..=Opcode::ReadTroublesMemoryPart8 as u8)
            .contains(&(self as u8))
            || matches!(self, Opcode::ReadOutputPower | Opcode::ReadZoneTemperature)
    }
}
