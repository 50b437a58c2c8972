use bitflags::bitflags;

bitflags! {
    /// System-wide hardware/power troubles, region source `SystemMain`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SystemMainTroubles: u32 {
        const OUT1 = 0x000001;
        const OUT2 = 0x000002;
        const OUT3 = 0x000004;
        const OUT4 = 0x000008;
        const KPD = 0x000010;
        const EX1_2 = 0x000020;
        const BATT = 0x000040;
        const AC = 0x000080;
        const DT1 = 0x000100;
        const DT2 = 0x000200;
        const DTM = 0x000400;
        const RTC = 0x000800;
        const NO_DTR = 0x001000;
        const NO_BATT = 0x002000;
        const EXT_MODEM_INIT = 0x004000;
        const EXT_MODEM_CMD = 0x008000;
        const NO_VOLT_OR_AUX_STM_CPU = 0x010000;
        const BAD_SIGNAL_PHONE_LINE = 0x020000;
        const NO_SIGNAL_PHONE_LINE = 0x040000;
        const MON_STA1 = 0x080000;
        const MON_STA2 = 0x100000;
        const EEPROM_OR_RTC_ACCESS = 0x200000;
        const RAM_MEMORY = 0x400000;
        const MAIN_PANEL_RESTART_MEM = 0x800000;
    }
}

bitflags! {
    /// Networked-monitoring-station troubles, region source `SystemOther`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SystemOtherTroubles: u8 {
        const NO_ETHM_CONN_MON_STA1 = 0x01;
        const NO_ETHM_CONN_MON_STA2 = 0x02;
        const NO_GPRS_CONN_MON_STA1 = 0x04;
        const NO_GPRS_CONN_MON_STA2 = 0x08;
        const TIME_SERVER = 0x10;
        const GSM_INIT = 0x20;
        const MON_IP_STA1 = 0x40;
        const MON_IP_STA2 = 0x80;
    }
}

bitflags! {
    /// Per-zone technical trouble state, region source `Zones`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ZoneTrouble: u8 {
        const TECHNICAL = 0x01;
        const TECHNICAL_MEMORY = 0x02;
    }
}

bitflags! {
    /// Per-expander trouble state, region source `Expanders`. Which bits a
    /// given expander model can actually report depends on its runtime type
    /// (`CA-64 DR`, `ACU-100`, ...); this decoder reports every bit the wire
    /// format carries and leaves model-specific interpretation to the
    /// caller, which already has the expander's type from its element name.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExpanderTrouble: u32 {
        const AC = 0x000001;
        const OUTPUT_OVERLOAD = 0x000002;
        const BATT = 0x000004;
        const NO_BATT = 0x000008;
        const CARD_READER_HEAD_A = 0x000010;
        const CARD_READER_HEAD_B = 0x000020;
        const BUSY = 0x000040;
        const ACU_SYNCHRO = 0x000080;
        const NO_KNX_CONN = 0x000100;
        const HIGH_BATT_RES = 0x000200;
        const BATT_CHARGING = 0x000400;
        const SUPPLY_OUTPUT_OVERLOAD = 0x000800;
        const ACU_JAMMED = 0x001000;
        const ADDRESSABLE_ZONE_EXP_SHORT_CIRCUIT = 0x002000;
        const EXP_NO_COMM = 0x004000;
        const SUBSTED = 0x008000;
        const TAMPER = 0x010000;
    }
}

bitflags! {
    /// Per-manipulator (keypad) trouble state, region source `Manipulators`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ManipulatorTrouble: u16 {
        const PING = 0x0001;
        const AC = 0x0002;
        const MAC_ID_SRV = 0x0004;
        const IMEI_ID_SRV = 0x0008;
        const BAT1 = 0x0010;
        const BAT2 = 0x0020;
        const BATT = 0x0040;
        const CONN_SRV = 0x0080;
        const MAN_NO_COMM = 0x0100;
        const SUBSTED = 0x0200;
        const NO_LAN_CABLE = 0x0400;
        const NO_DSR_SIGNAL = 0x0800;
        const TAMPER = 0x1000;
        const INIT_FAILED = 0x2000;
        const AUX_STM = 0x4000;
    }
}

bitflags! {
    /// Per-user trouble state, region source `Users`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UserTrouble: u8 {
        const LOW_BATTERY = 0x01;
    }
}

bitflags! {
    /// Per-radio-device trouble state, region source `Radio`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RadioTrouble: u8 {
        const MODULE_JAM_LEVEL = 0x01;
        const LOW_BATTERY = 0x02;
        const DEVICE_NO_COMM = 0x04;
        const OUTPUT_NO_COMM = 0x08;
    }
}
