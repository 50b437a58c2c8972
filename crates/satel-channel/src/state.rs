/// The channel's own lifecycle state, independent of the higher-level
/// `ClientStatus` state machine the facade layers on top (which adds
/// reconnect backoff).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    Connecting,
    Open,
    Closing,
}

/// Who initiated a channel close — determines whether the facade's
/// reconnect loop should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseSource {
    /// `disconnect()` was called — suppresses auto-reconnect.
    Caller,
    /// The read task hit a fatal transport error.
    ReadTask,
    /// The ping task's write failed.
    PingTask,
    /// The encryption handler rejected a PDU.
    InvalidEncryptionKey,
}

impl CloseSource {
    /// Only an explicit caller-initiated close and a fatal key mismatch
    /// suppress the facade's reconnect loop; every other close is "the
    /// channel died on its own" and should be retried.
    pub fn allows_reconnect(self) -> bool {
        !matches!(self, CloseSource::Caller | CloseSource::InvalidEncryptionKey)
    }
}
