//! Byte-stuffed framing (`FE FE <body> FE 0D`, `FE` escaped as `FE F0`) and
//! the panel's rolling CRC16 used by every plain (unencrypted) connection
//! and, underneath the AES layer, by encrypted ones too.

mod codec;
mod crc;

pub use codec::{encode_frame, verify_and_split, FrameDecoder, FRAME_LEN_MIN, SYNC, SYNC_END, SYNC_ESC};
pub use crc::checksum;
