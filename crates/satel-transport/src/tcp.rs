use std::time::Duration;
use tokio::net::TcpStream;

use crate::{BoxedRead, BoxedWrite, TransportError};

pub async fn connect(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<(BoxedRead, BoxedWrite), TransportError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| TransportError::Timeout)??;
    stream.set_nodelay(true).ok();
    let (read, write) = stream.into_split();
    Ok((Box::new(read), Box::new(write)))
}
