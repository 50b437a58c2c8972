//! Ordered command/response correlation, ping keepalive, and lifecycle
//! tracking for one Satel Integra connection. Knows nothing about
//! reconnection policy or which transport to open — that's `satel-integra`'s
//! job; this crate just drives whatever `(BoxedRead, BoxedWrite)` pair it's
//! handed until it dies.

mod channel;
mod stats;
mod state;
mod waiter;

pub use channel::{Channel, ChannelEvent};
pub use state::{ChannelState, CloseSource};
pub use stats::ChannelStats;
pub use waiter::Response;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    use satel_protocol::{Opcode, Request};

    async fn open_pair() -> (Channel, Channel, mpsc::UnboundedReceiver<ChannelEvent>, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (client_events_tx, client_events_rx) = mpsc::unbounded_channel();
        let (server_events_tx, server_events_rx) = mpsc::unbounded_channel();
        let client = Channel::new(client_events_tx, Duration::from_secs(3600));
        let server = Channel::new(server_events_tx, Duration::from_secs(3600));

        let (client_halves, server_halves) = satel_transport::pair(4096);
        client.attach(client_halves.0, client_halves.1, None).await;
        server.attach(server_halves.0, server_halves.1, None).await;
        (client, server, client_events_rx, server_events_rx)
    }

    #[tokio::test]
    async fn connected_event_fires_on_attach() {
        let (_client, _server, mut client_events, _server_events) = open_pair().await;
        assert!(matches!(client_events.recv().await, Some(ChannelEvent::Connected)));
    }

    #[tokio::test]
    async fn send_command_round_trips_through_a_duplex_pair() {
        let (client, server, _client_events, mut server_events) = open_pair().await;

        let responder = tokio::spawn(async move {
            loop {
                match server_events.recv().await {
                    Some(ChannelEvent::Notification { opcode: Opcode::ReadIntegraVersion, .. }) => {
                        let reply = Request::new(Opcode::ReadIntegraVersion, vec![1, 2, 3, 4]);
                        server.send_command(reply, Duration::from_millis(50)).await;
                        return;
                    }
                    None => return,
                    _ => continue,
                }
            }
        });

        let response = client
            .send_command(Request::new(Opcode::ReadIntegraVersion, vec![]), Duration::from_secs(1))
            .await;
        assert_eq!(response.opcode, Opcode::ReadIntegraVersion);
        assert_eq!(response.payload, vec![1, 2, 3, 4]);
        let _ = responder.await;
    }

    #[tokio::test]
    async fn timeout_yields_a_no_response() {
        let (client, _server, _client_events, _server_events) = open_pair().await;
        let response = client
            .send_command(Request::new(Opcode::ReadIntegraVersion, vec![]), Duration::from_millis(20))
            .await;
        assert!(response.error_code.is_some());
        assert!(response.payload.is_empty());
    }

    #[tokio::test]
    async fn close_fans_pending_waiters_out_before_disconnect_event() {
        let (client, _server, mut client_events, _server_events) = open_pair().await;
        assert!(matches!(client_events.recv().await, Some(ChannelEvent::Connected)));

        let pending = tokio::spawn({
            let client = client.clone();
            async move { client.send_command(Request::new(Opcode::ReadIntegraVersion, vec![]), Duration::from_secs(5)).await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        client.close(CloseSource::Caller).await;

        let response = pending.await.unwrap();
        assert!(response.error_code.is_some());
        assert!(matches!(
            client_events.recv().await,
            Some(ChannelEvent::Disconnected { reconnect_allowed: false })
        ));
    }
}
