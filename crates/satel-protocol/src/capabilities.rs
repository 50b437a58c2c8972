//! Per-panel-model capability tuples, keyed by the panel-type byte
//! `READ_INTEGRA_VERSION` returns. Every field here bounds a bitmap size
//! somewhere else in the stack (`satel-diff`'s truncation, `satel-protocol`'s
//! bit-packed payload builders).
use satel_core::IntegraType;

/// The tuple `spec.md` §3 calls "Capabilities": object/partition/zone/output
/// counts and similar, fixed per panel model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegraCaps {
    pub integra_type: IntegraType,
    pub objects: u16,
    pub parts: u16,
    pub zones: u16,
    pub outputs: u16,
    pub timers: u16,
    pub phones: u16,
    pub manipulators: u16,
    pub expanders: u16,
    pub manipulator_buses: u16,
    pub expander_buses: u16,
    pub users: u16,
    pub admins: u16,
    pub masking: bool,
}

impl IntegraCaps {
    /// `doors` share the expander bus addressing in the wire protocol.
    pub fn doors(&self) -> u16 {
        self.expanders
    }

    const fn new(
        integra_type: IntegraType,
        objects: u16,
        parts: u16,
        zones: u16,
        outputs: u16,
        timers: u16,
        phones: u16,
        manipulators: u16,
        expanders: u16,
        manipulator_buses: u16,
        expander_buses: u16,
        users: u16,
        admins: u16,
        masking: bool,
    ) -> Self {
        Self {
            integra_type,
            objects,
            parts,
            zones,
            outputs,
            timers,
            phones,
            manipulators,
            expanders,
            manipulator_buses,
            expander_buses,
            users,
            admins,
            masking,
        }
    }

    const UNKNOWN: IntegraCaps = IntegraCaps::new(IntegraType::Unknown, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, false);
}

/// Looks up the static capability tuple for `integra_type`, falling back to
/// an all-zero tuple for unrecognized panel-type bytes.
pub fn caps_for(integra_type: IntegraType) -> IntegraCaps {
    use IntegraType::*;
    match integra_type {
        Integra24 => IntegraCaps::new(Integra24, 1, 4, 24, 24, 16, 16, 4, 32, 1, 1, 16, 1, false),
        Integra32 => IntegraCaps::new(Integra32, 4, 16, 32, 32, 28, 16, 4, 32, 1, 1, 64, 4, false),
        Integra64 => IntegraCaps::new(Integra64, 8, 32, 64, 64, 64, 16, 8, 64, 1, 2, 192, 8, false),
        Integra64Plus => IntegraCaps::new(Integra64Plus, 8, 32, 64, 64, 64, 16, 8, 64, 1, 2, 192, 8, true),
        Integra128 => IntegraCaps::new(Integra128, 8, 32, 128, 128, 64, 16, 8, 64, 1, 2, 240, 8, false),
        Integra128Plus => IntegraCaps::new(Integra128Plus, 8, 32, 128, 128, 64, 16, 8, 64, 1, 2, 240, 8, true),
        Integra128WrlLeon => IntegraCaps::new(Integra128WrlLeon, 8, 32, 128, 128, 64, 16, 8, 32, 1, 1, 240, 8, false),
        Integra128WrlSim300 => IntegraCaps::new(Integra128WrlSim300, 8, 32, 128, 128, 64, 16, 8, 32, 1, 1, 240, 8, false),
        Integra256Plus => IntegraCaps::new(Integra256Plus, 8, 32, 256, 256, 64, 16, 8, 64, 1, 2, 240, 8, true),
        Unknown => IntegraCaps::UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integra_256_plus_has_256_zones_and_supports_masking() {
        let caps = caps_for(IntegraType::Integra256Plus);
        assert_eq!(caps.zones, 256);
        assert!(caps.masking);
    }

    #[test]
    fn unknown_panel_type_yields_all_zero_capacities() {
        let caps = caps_for(IntegraType::Unknown);
        assert_eq!(caps.zones, 0);
        assert_eq!(caps.parts, 0);
    }
}
