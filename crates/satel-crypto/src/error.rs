use std::fmt;

#[derive(Debug)]
pub enum CryptoError {
    /// The panel's reflected `id_s` byte didn't match ours — the
    /// integration key the caller configured doesn't match the panel's.
    InvalidKey,
    /// A PDU arrived shorter than the 6-byte header it must carry.
    TruncatedPdu,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey => write!(f, "invalid encryption key"),
            Self::TruncatedPdu => write!(f, "PDU shorter than the header it must carry"),
        }
    }
}

impl std::error::Error for CryptoError {}
