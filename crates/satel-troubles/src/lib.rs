//! Region table and decoder for the panel's `TROUBLES_PART*` /
//! `TROUBLES_MEMORY_PART*` notify payloads: byte-offset regions within each
//! block, decoded as either a little-endian system flag word or a per-device
//! bitmap, depending on what that region holds.

mod diff;
mod flags;
mod regions;

pub use diff::{RegionChange, RegionUpdate, TroublesDiffCache};
pub use flags::{
    ExpanderTrouble, ManipulatorTrouble, RadioTrouble, SystemMainTroubles, SystemOtherTroubles, UserTrouble, ZoneTrouble,
};
pub use regions::{decode_troubles, regions_for, Region, RegionSource, RegionValue};
