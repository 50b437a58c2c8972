/// The facade's own connection state, layered above [`satel_channel::ChannelState`]
/// with the reconnect-loop states the channel itself knows nothing about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Disconnecting,
}
