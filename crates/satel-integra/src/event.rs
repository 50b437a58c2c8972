use satel_diff::BitChange;
use satel_protocol::{NotifyEvent, Opcode};
use satel_troubles::RegionUpdate;

use crate::status::ClientStatus;

/// Everything the facade fans out to callers: lifecycle transitions plus
/// three views of the same raw notification, built in increasing order of
/// interpretation (raw bytes, bit-level deltas, decoded trouble regions).
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Status(ClientStatus),
    /// The raw opcode/payload exactly as the panel sent it — every
    /// notification produces one of these, regardless of what else it
    /// produces below.
    Data { opcode: Opcode, payload: Vec<u8> },
    /// Bits that flipped since the last snapshot of this event, for every
    /// notify-eligible opcode.
    StateDelta { event: NotifyEvent, changes: Vec<BitChange> },
    /// Present only for `ReadTroublesPart*`/`ReadTroublesMemoryPart*` events.
    /// Device-category regions carry only what changed since the previous
    /// snapshot of that region; system-level regions carry the full current
    /// flag word, since there's no per-device index to diff.
    Troubles { event: NotifyEvent, regions: Vec<RegionUpdate> },
}
