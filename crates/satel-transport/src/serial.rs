use tokio_serial::SerialPortBuilderExt;

use crate::{BoxedRead, BoxedWrite, TransportError};

pub fn open(path: &str, baud: u32) -> Result<(BoxedRead, BoxedWrite), TransportError> {
    let stream = tokio_serial::new(path, baud)
        .open_native_async()
        .map_err(|e| TransportError::Io(e.into()))?;
    let (read, write) = tokio::io::split(stream);
    Ok((Box::new(read), Box::new(write)))
}
