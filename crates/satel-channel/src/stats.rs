use std::time::Instant;

/// Monotonic byte/time counters for one connection lifetime. Reset on every
/// successful `connect()`, never across reconnects.
#[derive(Debug, Clone, Copy)]
pub struct ChannelStats {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_bytes_encrypted: u64,
    pub tx_bytes_encrypted: u64,
    pub session_start: Instant,
}

impl ChannelStats {
    pub fn new() -> Self {
        Self {
            rx_bytes: 0,
            tx_bytes: 0,
            rx_bytes_encrypted: 0,
            tx_bytes_encrypted: 0,
            session_start: Instant::now(),
        }
    }
}

impl Default for ChannelStats {
    fn default() -> Self {
        Self::new()
    }
}
