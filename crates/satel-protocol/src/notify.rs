use bitflags::bitflags;

use crate::opcode::Opcode;

bitflags! {
    /// Which state category a notify event belongs to, matching the bits
    /// `READ_SYSTEM_CHANGES` itself reports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NotifySource: u8 {
        const PARTS = 0x01;
        const ZONES = 0x02;
        const OUTPUTS = 0x04;
        const DOORS = 0x08;
        const TROUBLES = 0x10;
        const TROUBLES_MEMORY = 0x20;
        const DATA = 0x40;
        const OTHERS = 0x80;
    }
}

/// A state-read opcode the panel may deliver unsolicited as well as on
/// request. Discriminants are identical to the corresponding [`Opcode`] —
/// the panel reuses one numbering scheme for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotifyEvent(Opcode);

impl NotifyEvent {
    pub fn from_opcode(op: Opcode) -> Option<Self> {
        op.is_broadcast_eligible().then_some(Self(op))
    }

    pub fn opcode(self) -> Opcode {
        self.0
    }

    /// The category this event's data belongs to, used to decide which
    /// `READ_SYSTEM_CHANGES` bit should have triggered a poll of it.
    pub fn source(self) -> NotifySource {
        use Opcode::*;
        match self.0 {
            op if (ReadPartsArmedSuppressed as u8..=ReadPartsFireAlarmMemory as u8).contains(&(op as u8))
                || matches!(op, ReadPartsWithViolatedZones | ReadPartsWithVerifiedAlarms | ReadPartsArmedMode1 | ReadPartsWithWarningAlarms) =>
            {
                NotifySource::PARTS
            }
            op if (ReadZonesViolation as u8..=ReadZonesLongViolationTrouble as u8).contains(&(op as u8))
                || matches!(op, ReadZonesIsolate | ReadZonesMasked | ReadZonesMaskedMemory) =>
            {
                NotifySource::ZONES
            }
            ReadOutputsState => NotifySource::OUTPUTS,
            ReadDoorsOpened | ReadDoorsOpenedLong => NotifySource::DOORS,
            op if (ReadTroublesPart1 as u8..=ReadTroublesPart5 as u8).contains(&(op as u8))
                || matches!(op, ReadTroublesPart6 | ReadTroublesPart7 | ReadTroublesPart8) =>
            {
                NotifySource::TROUBLES
            }
            op if (ReadTroublesMemoryPart1 as u8..=ReadTroublesMemoryPart5 as u8).contains(&(op as u8))
                || matches!(op, ReadTroublesMemoryPart6 | ReadTroublesMemoryPart7 | ReadTroublesMemoryPart8) =>
            {
                NotifySource::TROUBLES_MEMORY
            }
            ReadRtcAndStatus => NotifySource::OTHERS,
            ReadOutputPower | ReadZoneTemperature => NotifySource::DATA,
            _ => NotifySource::empty(),
        }
    }
}

/// All notify events, grouped the way `satel-monitor`'s pollers consume
/// them: one poll per category rather than one request per event.
pub fn all_events() -> Vec<NotifyEvent> {
    (0u8..=0xFF)
        .filter_map(Opcode::from_byte)
        .filter_map(NotifyEvent::from_opcode)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rtc_and_status_is_categorized_as_others() {
        let ev = NotifyEvent::from_opcode(Opcode::ReadRtcAndStatus).unwrap();
        assert_eq!(ev.source(), NotifySource::OTHERS);
    }

    #[test]
    fn output_power_is_not_broadcast_eligible_as_a_plain_opcode_but_is_a_notify_event() {
        let ev = NotifyEvent::from_opcode(Opcode::ReadOutputPower).unwrap();
        assert_eq!(ev.source(), NotifySource::DATA);
    }

    #[test]
    fn non_state_opcodes_are_not_notify_events() {
        assert!(NotifyEvent::from_opcode(Opcode::ExecDisarm).is_none());
    }
}
