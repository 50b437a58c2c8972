//! Raw byte-stream transports. This layer knows nothing about framing,
//! encryption, or the panel's opcodes — it hands `satel-channel` a split
//! `AsyncRead`/`AsyncWrite` pair and gets out of the way, the same
//! separation of concerns the teacher's `StreamTransport` draws between the
//! socket and the framing it carries.

mod error;
mod serial;
mod tcp;

pub use error::TransportError;

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

/// Read half of a connected transport.
pub type BoxedRead = Box<dyn AsyncRead + Unpin + Send>;
/// Write half of a connected transport.
pub type BoxedWrite = Box<dyn AsyncWrite + Unpin + Send>;

/// Connects to `host:port` over TCP, bounded by `timeout`.
pub async fn connect_tcp(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<(BoxedRead, BoxedWrite), TransportError> {
    tcp::connect(host, port, timeout).await
}

/// Opens a serial device at `baud` bps. No connect timeout applies —
/// opening a local device either succeeds immediately or fails outright.
pub fn connect_serial(path: &str, baud: u32) -> Result<(BoxedRead, BoxedWrite), TransportError> {
    serial::open(path, baud)
}

/// An in-memory, loopback pair of transports for tests: bytes written to
/// one side's write half appear on the other's read half. Mirrors the
/// teacher's `StreamTransport::pair()`, built on the same `tokio::io::duplex`
/// primitive.
pub fn pair(buffer_size: usize) -> ((BoxedRead, BoxedWrite), (BoxedRead, BoxedWrite)) {
    let (a, b) = tokio::io::duplex(buffer_size);
    let (a_read, a_write) = tokio::io::split(a);
    let (b_read, b_write) = tokio::io::split(b);
    (
        (Box::new(a_read), Box::new(a_write)),
        (Box::new(b_read), Box::new(b_write)),
    )
}
