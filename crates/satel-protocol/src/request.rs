use crate::opcode::Opcode;

/// An outbound command. `payload` is the opcode-specific body (already
/// encoded by the caller — `satel-protocol`'s per-command modules build
/// this); framing and the CRC are added by [`Request::encode`].
#[derive(Debug, Clone)]
pub struct Request {
    pub command: Opcode,
    pub payload: Vec<u8>,
    explicit_broadcast: bool,
    pub result_allowed: bool,
}

impl Request {
    pub fn new(command: Opcode, payload: Vec<u8>) -> Self {
        Self {
            command,
            payload,
            explicit_broadcast: false,
            result_allowed: true,
        }
    }

    /// Marks this request as broadcast-eligible even if its opcode isn't in
    /// the auto-broadcast range — used for the handful of `EXEC_*` commands
    /// whose effects the panel also announces unsolicited.
    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.explicit_broadcast = broadcast;
        self
    }

    pub fn with_result_allowed(mut self, result_allowed: bool) -> Self {
        self.result_allowed = result_allowed;
        self
    }

    pub fn is_broadcast(&self) -> bool {
        self.explicit_broadcast || self.command.is_broadcast_eligible()
    }

    /// Produces the full wire frame: `FE FE <command><payload><crc> FE 0D`.
    pub fn encode(&self) -> Vec<u8> {
        satel_frame::encode_frame(self.command as u8, &self.payload)
    }
}
