use crate::crc::checksum;

/// Marks the start/end of a frame and introduces an escape sequence.
pub const SYNC: u8 = 0xFE;
/// Follows `SYNC` inside a frame body to mean "a literal `SYNC` byte".
pub const SYNC_ESC: u8 = 0xF0;
/// Follows `SYNC` to mean "end of frame".
pub const SYNC_END: u8 = 0x0D;

/// Minimum decoded body length: one command byte plus a two-byte CRC.
pub const FRAME_LEN_MIN: usize = 3;

/// Wraps `command` and `payload` in a complete wire frame: computes the
/// CRC16, appends it, byte-stuffs every `SYNC` byte in the result, and
/// surrounds it with the `FE FE ... FE 0D` markers.
pub fn encode_frame(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(1 + payload.len() + 2);
    body.push(command);
    body.extend_from_slice(payload);

    let crc = checksum(&body);
    body.push((crc >> 8) as u8);
    body.push((crc & 0xFF) as u8);

    let mut frame = Vec::with_capacity(body.len() * 2 + 4);
    frame.push(SYNC);
    frame.push(SYNC);
    for &b in &body {
        if b == SYNC {
            frame.push(SYNC);
            frame.push(SYNC_ESC);
        } else {
            frame.push(b);
        }
    }
    frame.push(SYNC);
    frame.push(SYNC_END);
    frame
}

/// Splits a decoded, unstuffed frame body into `(command, payload)` if its
/// trailing CRC matches. A mismatch means the frame was corrupted in
/// transit and is silently discarded — the panel will retransmit on its own
/// schedule, so the caller has nothing useful to report.
pub fn verify_and_split(body: &[u8]) -> Option<(u8, &[u8])> {
    if body.len() < FRAME_LEN_MIN {
        return None;
    }
    let (data, crc_bytes) = body.split_at(body.len() - 2);
    let crc = ((crc_bytes[0] as u16) << 8) | crc_bytes[1] as u16;
    if checksum(data) != crc {
        return None;
    }
    let (command, payload) = data.split_first()?;
    Some((*command, payload))
}

/// Incremental byte-stuffing decoder: feed bytes from the transport one at a
/// time via [`push`](Self::push); a return value of `Some` is a complete,
/// unstuffed frame body (command + payload + CRC, CRC not yet verified).
///
/// Mirrors the panel's own framing FSM: two consecutive `SYNC` bytes start a
/// frame, a `SYNC` while inside a frame begins an escape/end sequence, and
/// any other byte following that `SYNC` resyncs by discarding the
/// in-progress frame.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    in_message: bool,
    pending_sync: bool,
    sync_run: usize,
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, byte: u8) -> Option<Vec<u8>> {
        if byte == SYNC {
            if self.in_message {
                self.pending_sync = true;
            } else {
                self.sync_run += 1;
                if self.sync_run >= 2 {
                    self.in_message = true;
                    self.sync_run = 0;
                    self.buffer.clear();
                }
            }
            return None;
        }

        if self.in_message && self.pending_sync {
            self.pending_sync = false;
            return match byte {
                SYNC_ESC => {
                    self.buffer.push(SYNC);
                    None
                }
                SYNC_END => {
                    self.in_message = false;
                    Some(std::mem::take(&mut self.buffer))
                }
                _ => {
                    tracing::warn!(byte, "unexpected byte after SYNC inside frame, resyncing");
                    self.in_message = false;
                    self.buffer.clear();
                    self.sync_run = 0;
                    None
                }
            };
        }

        if self.in_message {
            self.buffer.push(byte);
        } else {
            self.sync_run = 0;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_frame_without_sync_bytes() {
        let frame = encode_frame(0x01, &[0x02, 0x03]);
        assert_eq!(&frame[0..2], &[SYNC, SYNC]);
        assert_eq!(&frame[frame.len() - 2..], &[SYNC, SYNC_END]);

        let mut dec = FrameDecoder::new();
        let mut out = None;
        for &b in &frame {
            if let Some(body) = dec.push(b) {
                out = Some(body);
            }
        }
        let body = out.expect("frame should have completed");
        let (cmd, payload) = verify_and_split(&body).expect("crc should verify");
        assert_eq!(cmd, 0x01);
        assert_eq!(payload, &[0x02, 0x03]);
    }

    #[test]
    fn escapes_and_unescapes_sync_bytes_in_the_payload() {
        let frame = encode_frame(0xEE, &[SYNC, 0x10]);
        // the stuffed SYNC must appear as SYNC, SYNC_ESC in the wire bytes
        assert!(frame.windows(2).any(|w| w == [SYNC, SYNC_ESC]));

        let mut dec = FrameDecoder::new();
        let mut out = None;
        for &b in &frame {
            if let Some(body) = dec.push(b) {
                out = Some(body);
            }
        }
        let (cmd, payload) = verify_and_split(&out.unwrap()).unwrap();
        assert_eq!(cmd, 0xEE);
        assert_eq!(payload, &[SYNC, 0x10]);
    }

    #[test]
    fn corrupted_crc_is_silently_rejected() {
        let mut frame = encode_frame(0x01, &[0x02]);
        let len = frame.len();
        frame[len - 1] ^= 0xFF;

        let mut dec = FrameDecoder::new();
        let mut out = None;
        for &b in &frame {
            if let Some(body) = dec.push(b) {
                out = Some(body);
            }
        }
        assert!(verify_and_split(&out.unwrap()).is_none());
    }

    #[test]
    fn resyncs_after_a_garbage_byte_following_sync() {
        let mut dec = FrameDecoder::new();
        // start a frame, push one byte, then send a malformed SYNC sequence
        dec.push(SYNC);
        dec.push(SYNC);
        dec.push(0xAA);
        dec.push(SYNC);
        dec.push(0x77); // neither ESC nor END -> discard + resync

        let frame = encode_frame(0x05, &[]);
        let mut out = None;
        for &b in &frame {
            if let Some(body) = dec.push(b) {
                out = Some(body);
            }
        }
        let (cmd, payload) = verify_and_split(&out.unwrap()).unwrap();
        assert_eq!(cmd, 0x05);
        assert!(payload.is_empty());
    }
}
