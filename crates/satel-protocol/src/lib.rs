//! Opcode table, request/response envelope, bit-packed codec, and the typed
//! entities (elements, users, events) the Satel Integra wire protocol
//! carries. `satel-channel` builds on top of this crate; it knows nothing
//! about framing, encryption, or transports itself.

mod bitlist;
mod capabilities;
mod codes;
mod commands;
mod date;
mod elements;
mod error_code;
mod events;
mod notify;
mod opcode;
mod request;
mod users;

pub use bitlist::*;
pub use capabilities::{caps_for, IntegraCaps};
pub use codes::{code_to_bytes, user_code_to_bytes};
pub use commands::*;
pub use date::{decode_date_hex, decode_date_str, decode_version, DecodedDate};
pub use elements::{
    decode_element_name, disambiguate_device_address, encode_element_read_name, DeviceAddress, ElementKind, ElementName,
};
pub use error_code::ResponseErrorCode;
pub use events::{
    decode_event_record, decode_event_text, encode_event_pointer, encode_event_text_request, EventClass, EventKindShort,
    EventMonitoringStatus, EventRecord, EventText, EVENT_RECORD_LEN,
};
pub use notify::{all_events, NotifyEvent, NotifySource};
pub use opcode::Opcode;
pub use request::Request;
pub use users::{decode_other_info, decode_self_info, encode_user_write, User, UserCodeFlags, UserKind, UserRights, UserType};
