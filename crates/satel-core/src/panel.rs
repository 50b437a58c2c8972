use bitflags::bitflags;

/// Day of week as reported by the panel's real-time clock, `0 == Monday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DayOfWeek {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl DayOfWeek {
    pub fn from_index(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::Monday,
            1 => Self::Tuesday,
            2 => Self::Wednesday,
            3 => Self::Thursday,
            4 => Self::Friday,
            5 => Self::Saturday,
            6 => Self::Sunday,
            _ => return None,
        })
    }
}

/// Broad panel family, decoded from the high bits of the version response's
/// panel-type byte. Used to pick defaults (zone/output counts) that the
/// per-model table below refines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegraBaseType {
    Integra24,
    Integra32,
    Integra64Or64Plus,
    Integra128Or128Plus,
    Integra128Wrl,
    Integra256Plus,
    Unknown,
}

impl IntegraBaseType {
    pub fn from_byte(v: u8) -> Self {
        match v {
            0 => Self::Integra24,
            1 => Self::Integra32,
            2 => Self::Integra64Or64Plus,
            3 => Self::Integra128Or128Plus,
            4 => Self::Integra128Wrl,
            8 => Self::Integra256Plus,
            _ => Self::Unknown,
        }
    }
}

/// Specific panel model, decoded from the panel-type byte of the version
/// response. Several values beyond `IntegraBaseType`'s range identify a
/// "plus" or radio variant precisely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegraType {
    Integra24,
    Integra32,
    Integra64,
    Integra128,
    Integra128WrlSim300,
    Integra64Plus,
    Integra128Plus,
    Integra256Plus,
    Integra128WrlLeon,
    Unknown,
}

impl IntegraType {
    pub fn from_byte(v: u8) -> Self {
        match v {
            0 => Self::Integra24,
            1 => Self::Integra32,
            2 => Self::Integra64,
            3 => Self::Integra128,
            4 => Self::Integra128WrlSim300,
            66 => Self::Integra64Plus,
            67 => Self::Integra128Plus,
            68 => Self::Integra256Plus,
            132 => Self::Integra128WrlLeon,
            _ => Self::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Integra24 => "Satel Integra 24",
            Self::Integra32 => "Satel Integra 32",
            Self::Integra64 => "Satel Integra 64",
            Self::Integra128 => "Satel Integra 128",
            Self::Integra128WrlSim300 => "Satel Integra 128 WRL SIM300",
            Self::Integra64Plus => "Satel Integra 64 Plus",
            Self::Integra128Plus => "Satel Integra 128 Plus",
            Self::Integra256Plus => "Satel Integra 256 Plus",
            Self::Integra128WrlLeon => "Satel Integra 128 WRL LEON",
            Self::Unknown => "Unknown",
        }
    }

    pub fn base_type(self) -> IntegraBaseType {
        match self {
            Self::Integra24 => IntegraBaseType::Integra24,
            Self::Integra32 => IntegraBaseType::Integra32,
            Self::Integra64 | Self::Integra64Plus => IntegraBaseType::Integra64Or64Plus,
            Self::Integra128 | Self::Integra128Plus => IntegraBaseType::Integra128Or128Plus,
            Self::Integra128WrlSim300 | Self::Integra128WrlLeon => IntegraBaseType::Integra128Wrl,
            Self::Integra256Plus => IntegraBaseType::Integra256Plus,
            Self::Unknown => IntegraBaseType::Unknown,
        }
    }
}

bitflags! {
    /// Capability bits reported by an expansion module's version response.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModuleCaps: u8 {
        const BYTE_32 = 0b001;
        const TROUBLE_8 = 0b010;
        const ARM_NO_BYPASS = 0b100;
    }
}

/// The two-phase "1st code" workflow: a user can present a code that either
/// begins an arm sequence, begins a disarm sequence, or cancels an
/// already-pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FirstCodeAction {
    Arming = 0,
    Disarming = 1,
    Canceling = 2,
}

/// The arming mode requested alongside a set of partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ArmMode {
    Mode0 = 0,
    Mode1 = 1,
    Mode2 = 2,
    Mode3 = 3,
}
