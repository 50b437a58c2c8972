use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex as SyncMutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use satel_core::IntegraError;
use satel_crypto::EncryptionHandler;
use satel_frame::{verify_and_split, FrameDecoder};
use satel_protocol::{encode_element_read_name, ElementKind, Opcode, Request};
use satel_transport::{BoxedRead, BoxedWrite};

use crate::stats::ChannelStats;
use crate::waiter::{Response, Waiter};
pub use crate::state::{ChannelState, CloseSource};

/// Events the channel fans out to its owner (the `satel-integra` facade):
/// lifecycle transitions and unsolicited/broadcast notifications.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    Connected,
    Disconnected { reconnect_allowed: bool },
    Notification { opcode: Opcode, payload: Vec<u8> },
}

struct Tasks {
    read: Option<JoinHandle<()>>,
    ping: Option<JoinHandle<()>>,
}

struct Inner {
    state: SyncMutex<ChannelState>,
    write_half: AsyncMutex<Option<BoxedWrite>>,
    cmd_exec_lock: AsyncMutex<()>,
    waiters: SyncMutex<VecDeque<Waiter>>,
    stats: SyncMutex<ChannelStats>,
    crypto: SyncMutex<Option<EncryptionHandler>>,
    last_write: SyncMutex<Instant>,
    tasks: SyncMutex<Tasks>,
    events_tx: mpsc::UnboundedSender<ChannelEvent>,
    keep_alive: Duration,
}

/// A single panel connection: ordered send, FIFO response correlation,
/// ping keepalive, and the read loop that demultiplexes unsolicited
/// notifications from correlated responses. Cheap to clone — every clone
/// shares the same underlying state.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<Inner>,
}

impl Channel {
    /// Creates a disconnected channel. `events_tx` receives lifecycle and
    /// notification events for as long as the channel lives.
    pub fn new(events_tx: mpsc::UnboundedSender<ChannelEvent>, keep_alive: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: SyncMutex::new(ChannelState::Idle),
                write_half: AsyncMutex::new(None),
                cmd_exec_lock: AsyncMutex::new(()),
                waiters: SyncMutex::new(VecDeque::new()),
                stats: SyncMutex::new(ChannelStats::new()),
                crypto: SyncMutex::new(None),
                last_write: SyncMutex::new(Instant::now()),
                tasks: SyncMutex::new(Tasks { read: None, ping: None }),
                events_tx,
                keep_alive,
            }),
        }
    }

    pub fn state(&self) -> ChannelState {
        *self.inner.state.lock()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ChannelState::Open
    }

    pub fn stats(&self) -> ChannelStats {
        *self.inner.stats.lock()
    }

    /// Adopts already-established transport halves (opened by the caller —
    /// `satel-integra` decides TCP vs. serial and which port), spawns the
    /// read and ping tasks, and transitions to `Open`.
    pub async fn attach(&self, read: BoxedRead, write: BoxedWrite, integration_key: Option<&str>) {
        *self.inner.state.lock() = ChannelState::Connecting;
        *self.inner.write_half.lock().await = Some(write);
        *self.inner.crypto.lock() = integration_key.map(EncryptionHandler::new);
        *self.inner.stats.lock() = ChannelStats::new();
        *self.inner.last_write.lock() = Instant::now();

        let read_handle = tokio::spawn(Self::read_task(self.inner.clone(), read));
        let ping_handle = tokio::spawn(Self::ping_task(self.inner.clone()));
        {
            let mut tasks = self.inner.tasks.lock();
            tasks.read = Some(read_handle);
            tasks.ping = Some(ping_handle);
        }

        *self.inner.state.lock() = ChannelState::Open;
        let _ = self.inner.events_tx.send(ChannelEvent::Connected);
    }

    /// Exclusive-write-locked frame send: encodes `payload` into a framed
    /// (and, if keyed, encrypted) buffer and writes it out, updating
    /// `last_write` so the ping task doesn't also fire.
    async fn post_data(&self, payload: Vec<u8>) -> Result<(), IntegraError> {
        let mut guard = self.inner.write_half.lock().await;
        let Some(write) = guard.as_mut() else {
            return Err(IntegraError::NotConnected);
        };

        let wire_bytes = {
            let mut crypto = self.inner.crypto.lock();
            match crypto.as_mut() {
                Some(handler) => {
                    let encrypted = handler.write_data_with_pdu(&payload);
                    let mut framed = Vec::with_capacity(1 + encrypted.len());
                    framed.push(payload.len() as u8);
                    framed.extend_from_slice(&encrypted);
                    framed
                }
                None => payload.clone(),
            }
        };

        if let Err(e) = write.write_all(&wire_bytes).await {
            drop(guard);
            self.close(CloseSource::ReadTask).await;
            return Err(IntegraError::WriteError(e.to_string()));
        }

        let mut stats = self.inner.stats.lock();
        stats.tx_bytes += payload.len() as u64;
        if self.inner.crypto.lock().is_some() {
            stats.tx_bytes_encrypted += wire_bytes.len() as u64;
        }
        *self.inner.last_write.lock() = Instant::now();
        Ok(())
    }

    /// Sends `request` and awaits its correlated response, bounded by
    /// `timeout`. At most one `send_command` call is ever in flight on a
    /// given channel at once (`cmd_exec_lock`), which both orders the wire
    /// traffic and gives FIFO response correlation for free.
    pub async fn send_command(&self, request: Request, timeout: Duration) -> Response {
        let _exec_guard = self.inner.cmd_exec_lock.lock().await;

        if !self.is_open() {
            return Response::no_response(request.command);
        }

        let (tx, rx) = oneshot::channel();
        self.inner
            .waiters
            .lock()
            .push_back(Waiter::new(request.command, request.result_allowed, tx));

        if let Err(_e) = self.post_data(request.encode()).await {
            self.remove_waiter(request.command);
            return Response::no_response(request.command);
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => Response::no_response(request.command),
            Err(_) => {
                self.remove_waiter(request.command);
                Response::no_response(request.command)
            }
        }
    }

    fn remove_waiter(&self, command: Opcode) {
        let mut waiters = self.inner.waiters.lock();
        if let Some(pos) = waiters.iter().position(|w| w.expected == command) {
            waiters.remove(pos);
        }
    }

    /// Idempotent: a second call while already `Idle`/`Closing` is a no-op.
    /// Fans every pending waiter out with a transport error *before*
    /// emitting `Disconnected`, so callers never see a response future hang
    /// past the channel closing.
    pub async fn close(&self, source: CloseSource) {
        {
            let mut state = self.inner.state.lock();
            if matches!(*state, ChannelState::Idle | ChannelState::Closing) {
                return;
            }
            *state = ChannelState::Closing;
        }

        *self.inner.write_half.lock().await = None;

        let waiters: Vec<_> = self.inner.waiters.lock().drain(..).collect();
        for waiter in waiters {
            waiter.fail_transport();
        }

        {
            let mut tasks = self.inner.tasks.lock();
            if let Some(h) = tasks.read.take() {
                h.abort();
            }
            if let Some(h) = tasks.ping.take() {
                h.abort();
            }
        }

        *self.inner.state.lock() = ChannelState::Idle;
        let _ = self.inner.events_tx.send(ChannelEvent::Disconnected {
            reconnect_allowed: source.allows_reconnect(),
        });
    }

    async fn read_task(inner: Arc<Inner>, mut read: BoxedRead) {
        let mut decoder = FrameDecoder::new();
        let channel = Channel { inner: inner.clone() };
        loop {
            let chunk = if inner.crypto.lock().is_some() {
                match Self::read_encrypted_chunk(&inner, &mut read).await {
                    Ok(chunk) => chunk,
                    Err(source) => {
                        channel.close(source).await;
                        return;
                    }
                }
            } else {
                let mut buf = [0u8; 1024];
                match read.read(&mut buf).await {
                    Ok(0) => {
                        channel.close(CloseSource::ReadTask).await;
                        return;
                    }
                    Ok(n) => {
                        inner.stats.lock().rx_bytes += n as u64;
                        buf[..n].to_vec()
                    }
                    Err(_) => {
                        channel.close(CloseSource::ReadTask).await;
                        return;
                    }
                }
            };

            for byte in chunk {
                if let Some(body) = decoder.push(byte) {
                    if let Some((command, payload)) = verify_and_split(&body) {
                        if let Some(opcode) = Opcode::from_byte(command) {
                            channel.dispatch(opcode, payload.to_vec());
                        }
                    }
                }
            }
        }
    }

    async fn read_encrypted_chunk(inner: &Arc<Inner>, read: &mut BoxedRead) -> Result<Vec<u8>, CloseSource> {
        let mut size_buf = [0u8; 1];
        match read.read(&mut size_buf).await {
            Ok(0) => return Err(CloseSource::ReadTask),
            Ok(_) => {}
            Err(_) => return Err(CloseSource::ReadTask),
        }
        let size = size_buf[0];
        if size == 0 {
            return Err(CloseSource::ReadTask);
        }
        let mut pdu = vec![0u8; size as usize + 6];
        if read.read_exact(&mut pdu).await.is_err() {
            return Err(CloseSource::ReadTask);
        }
        inner.stats.lock().rx_bytes_encrypted += 1 + pdu.len() as u64;

        let mut crypto = inner.crypto.lock();
        let handler = crypto.as_mut().expect("crypto presence checked by caller");
        match handler.read_data_from_pdu(&pdu) {
            Ok(plain) => Ok(plain),
            Err(_) => Err(CloseSource::InvalidEncryptionKey),
        }
    }

    /// Correlates an incoming frame to its waiter (if any) and/or re-emits
    /// it as a notification. Broadcast-eligible opcodes always get a
    /// notification even when they also satisfy a waiter — the panel's own
    /// unsolicited-push path and a caller's explicit read share one wire
    /// format.
    fn dispatch(&self, opcode: Opcode, payload: Vec<u8>) {
        let mut matched = false;
        {
            let mut waiters = self.inner.waiters.lock();
            if let Some(pos) = waiters.iter().position(|w| w.matches(opcode)) {
                let waiter = waiters.remove(pos).unwrap();
                drop(waiters);
                waiter.complete(Response::from_frame(opcode, payload.clone()));
                matched = true;
            }
        }
        if !matched || opcode.is_broadcast_eligible() {
            let _ = self.inner.events_tx.send(ChannelEvent::Notification { opcode, payload });
        }
    }

    /// Sends a lightweight keepalive whenever `keep_alive` has elapsed
    /// since the last write; sleeps the remainder otherwise. Exits
    /// (without re-closing) once the channel is no longer `Open`.
    async fn ping_task(inner: Arc<Inner>) {
        let channel = Channel { inner: inner.clone() };
        loop {
            if channel.state() != ChannelState::Open {
                return;
            }
            let elapsed = inner.last_write.lock().elapsed();
            if elapsed < inner.keep_alive {
                tokio::time::sleep(inner.keep_alive - elapsed).await;
                continue;
            }
            let ping = Request::new(Opcode::ElementReadName, encode_element_read_name(ElementKind::Partition, 1).to_vec())
                .with_result_allowed(false);
            if channel.post_data(ping.encode()).await.is_err() {
                return;
            }
        }
    }
}
