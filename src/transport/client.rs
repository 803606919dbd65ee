//! Pipelined request/response client over a raw TCP connection.

use super::frame::{Frame, FrameDecoder, RESPONSE};
use crate::error::{ArchitectError, Result};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, oneshot, watch, Mutex};

/// Handles one kind of message pushed by the peer.
///
/// Called from the connection's read loop: long work belongs on its own task.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, client: &SocketClient, sequence: i32, payload: Vec<u8>);
}

impl<F> MessageHandler for F
where
    F: Fn(&SocketClient, i32, Vec<u8>) + Send + Sync,
{
    fn handle(&self, client: &SocketClient, sequence: i32, payload: Vec<u8>) {
        self(client, sequence, payload)
    }
}

/// Handlers by message type.
pub type Handlers = HashMap<u8, Arc<dyn MessageHandler>>;

type Pending = Arc<Mutex<HashMap<i32, oneshot::Sender<Vec<u8>>>>>;

enum Outgoing {
    Frame(Vec<u8>),
    Close,
}

/// One connection. Clones share it.
///
/// Requests are correlated with responses by sequence number only, so any
/// number of them may be in flight and answered in any order.
#[derive(Clone)]
pub struct SocketClient {
    peer: SocketAddr,
    outgoing: mpsc::UnboundedSender<Outgoing>,
    sequence: Arc<AtomicI32>,
    pending: Pending,
    shutdown: Arc<watch::Sender<bool>>,
}

impl std::fmt::Debug for SocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketClient")
            .field("peer", &self.peer)
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl SocketClient {
    /// Connect and identify. A handshake reply other than `1` is a refusal.
    pub async fn connect(
        addr: impl ToSocketAddrs,
        identity: u8,
        handlers: Handlers,
    ) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let client = Self::from_stream(stream, handlers)?;
        log::info!("connected to {}", client.peer);

        let reply = client.request(identity, Vec::new()).await?;
        if reply.first() == Some(&1) {
            log::info!("identification {} accepted by {}", identity, client.peer);
            Ok(client)
        } else {
            log::error!("identification {} refused by {}", identity, client.peer);
            client.close();
            Err(ArchitectError::Transport(format!(
                "identification {} refused",
                identity
            )))
        }
    }

    /// Start the read and write loops on an established stream.
    pub fn from_stream(stream: TcpStream, handlers: Handlers) -> Result<Self> {
        let peer = stream.peer_addr()?;
        let (read_half, write_half) = stream.into_split();
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);

        let client = Self {
            peer,
            outgoing,
            sequence: Arc::new(AtomicI32::new(0)),
            pending: Arc::new(Mutex::new(HashMap::new())),
            shutdown: Arc::new(shutdown),
        };

        tokio::spawn(write_loop(write_half, outgoing_rx, peer));
        tokio::spawn(read_loop(read_half, client.clone(), handlers, shutdown_rx));
        Ok(client)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn next_sequence(&self) -> i32 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn write(&self, frame: Frame) -> Result<()> {
        let bytes = frame.encode()?;
        self.outgoing
            .send(Outgoing::Frame(bytes))
            .map_err(|_| ArchitectError::ConnectionClosed)
    }

    /// Send a message and wait for the response with the same sequence number.
    pub async fn request(&self, message_type: u8, payload: Vec<u8>) -> Result<Vec<u8>> {
        check_type(message_type)?;
        let sequence = self.next_sequence();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(sequence, tx);

        if let Err(e) = self.write(Frame::new(message_type, sequence, payload)) {
            self.pending.lock().await.remove(&sequence);
            return Err(e);
        }
        rx.await.map_err(|_| ArchitectError::ConnectionClosed)
    }

    /// Send a message without waiting. Returns its sequence number.
    pub fn send(&self, message_type: u8, payload: Vec<u8>) -> Result<i32> {
        check_type(message_type)?;
        let sequence = self.next_sequence();
        self.write(Frame::new(message_type, sequence, payload))?;
        Ok(sequence)
    }

    /// Answer the peer's message `sequence`.
    pub fn respond(&self, sequence: i32, payload: Vec<u8>) -> Result<()> {
        self.write(Frame::response(sequence, payload))
    }

    /// Requests still waiting for their response.
    pub async fn pending_requests(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Flush queued frames, then shut the connection down.
    pub fn close(&self) {
        let _ = self.outgoing.send(Outgoing::Close);
        self.shutdown.send_replace(true);
    }

    async fn dispatch(&self, frame: Frame, handlers: &Handlers) {
        if frame.is_response() {
            match self.pending.lock().await.remove(&frame.sequence) {
                Some(tx) => {
                    let _ = tx.send(frame.payload);
                }
                None => log::warn!(
                    "no waiting request for response {} from {}",
                    frame.sequence,
                    self.peer
                ),
            }
            return;
        }
        match handlers.get(&frame.message_type) {
            Some(handler) => handler.handle(self, frame.sequence, frame.payload),
            None => log::warn!(
                "unknown message type {} from {}",
                frame.message_type,
                self.peer
            ),
        }
    }
}

fn check_type(message_type: u8) -> Result<()> {
    if message_type == RESPONSE {
        return Err(ArchitectError::Transport(
            "message type 0 is reserved for responses".to_string(),
        ));
    }
    Ok(())
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut outgoing: mpsc::UnboundedReceiver<Outgoing>,
    peer: SocketAddr,
) {
    while let Some(message) = outgoing.recv().await {
        match message {
            Outgoing::Frame(bytes) => {
                if let Err(e) = writer.write_all(&bytes).await {
                    log::error!("write to {} failed: {}", peer, e);
                    break;
                }
            }
            Outgoing::Close => break,
        }
    }
    let _ = writer.shutdown().await;
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    client: SocketClient,
    handlers: Handlers,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut decoder = FrameDecoder::new();
    let mut chunk = vec![0u8; 64 * 1024];
    loop {
        tokio::select! {
            read = reader.read(&mut chunk) => match read {
                Ok(0) => break,
                Ok(n) => {
                    decoder.push(&chunk[..n]);
                    while let Some(frame) = decoder.next_frame() {
                        client.dispatch(frame, &handlers).await;
                    }
                }
                Err(e) => {
                    log::error!("read from {} failed: {}", client.peer, e);
                    break;
                }
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    if decoder.buffered() > 0 {
        log::warn!(
            "discarding {} bytes of an incomplete frame from {}",
            decoder.buffered(),
            client.peer
        );
    }
    client.pending.lock().await.clear();
    let _ = client.outgoing.send(Outgoing::Close);
    log::info!("closed connection with {}", client.peer);
}
