use std::fmt;

/// Error taxonomy surfaced to callers of the client facade.
///
/// Lower layers (`satel-frame`, `satel-crypto`, `satel-transport`) define
/// their own narrow error enums; `satel-channel` converts those into one of
/// the variants below so callers only ever match on a single type, mirroring
/// the channel-level error code set the panel's TCP/serial protocol exposes.
#[derive(Debug)]
pub enum IntegraError {
    /// An operation was attempted on a channel that isn't connected.
    NotConnected,
    /// The initial connection attempt didn't complete within the configured timeout.
    ConnTimeout,
    /// The peer actively refused the connection.
    ConnRefused,
    /// A read from the transport failed.
    ReadError(String),
    /// A write to the transport failed.
    WriteError(String),
    /// The configured integration key was rejected by the panel (encrypted channels only).
    InvalidEncryptionKey,
    /// The remote end closed the connection.
    RemoteClosed,
    /// The remote end reported it is busy and cannot accept the connection.
    RemoteBusy,
    /// The panel rejected a request with the given `IntegraResponseErrorCode`.
    RequestError { command: u8, error_code: u16 },
    /// No response arrived before the per-request timeout elapsed.
    NoResponse,
}

impl fmt::Display for IntegraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "channel is not connected"),
            Self::ConnTimeout => write!(f, "connection attempt timed out"),
            Self::ConnRefused => write!(f, "connection refused"),
            Self::ReadError(e) => write!(f, "read error: {e}"),
            Self::WriteError(e) => write!(f, "write error: {e}"),
            Self::InvalidEncryptionKey => write!(f, "invalid encryption key"),
            Self::RemoteClosed => write!(f, "remote closed the connection"),
            Self::RemoteBusy => write!(f, "remote is busy"),
            Self::RequestError { command, error_code } => {
                write!(f, "command 0x{command:02X} rejected with error code 0x{error_code:02X}")
            }
            Self::NoResponse => write!(f, "no response received before timeout"),
        }
    }
}

impl std::error::Error for IntegraError {}
