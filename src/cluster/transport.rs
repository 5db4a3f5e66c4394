//! Framed TCP transport carrying [`ClusterMessage`] frames between nodes.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

// Layer 3: Internal module imports
use super::config::ClusterConfig;
use super::error::ClusterError;
use super::message::{ClusterMessage, ClusterMessageType};
use crate::util::NodeId;

const HANDSHAKE_DEADLINE: Duration = Duration::from_secs(10);
const READ_DEADLINE: Duration = Duration::from_secs(30);

/// Invoked for every inbound frame and every connection lifecycle change.
#[async_trait]
pub trait TransportHandler: Send + Sync {
    /// A frame arrived from `from` (already identified via its join handshake).
    async fn on_message(&self, from: NodeId, message: ClusterMessage);

    /// A connection to `node_id` was established (inbound or outbound).
    async fn on_connected(&self, node_id: NodeId) {
        let _ = node_id;
    }

    /// A connection to `node_id` was lost.
    async fn on_disconnected(&self, node_id: NodeId, reason: String) {
        let _ = (node_id, reason);
    }

    /// Payload to carry on this node's half of the join handshake (its
    /// current membership snapshot). Called once per handshake side.
    fn join_snapshot(&self) -> Vec<u8> {
        Vec::new()
    }

    /// The peer's join-handshake payload, received from `peer_id`.
    async fn on_join_snapshot(&self, peer_id: NodeId, snapshot: Vec<u8>) {
        let _ = (peer_id, snapshot);
    }
}

/// Point-in-time transport counters, surfaced through `health(ctx)` (§6).
#[derive(Debug, Clone, Default)]
pub struct TransportStatistics {
    /// Currently-open connections.
    pub connections: usize,
    /// Frames sent since startup.
    pub frames_sent: u64,
    /// Frames received since startup.
    pub frames_received: u64,
}

struct Connection {
    outbound: mpsc::Sender<ClusterMessage>,
}

struct Inner {
    config: ClusterConfig,
    connections: DashMap<NodeId, Connection>,
    handler: RwLock<Option<Arc<dyn TransportHandler>>>,
    running: RwLock<bool>,
    frames_sent: AtomicU64,
    frames_received: AtomicU64,
}

/// The node's TCP transport: accepts inbound connections, dials outbound ones,
/// and exchanges length-delimited, JSON-encoded [`ClusterMessage`] frames.
///
/// Grounded on the `Framed<TcpStream, _>` + `futures::{SinkExt, StreamExt}`
/// pattern used for line-delimited framing in chat-server examples, generalized
/// here to [`LengthDelimitedCodec`] so arbitrary binary payloads round-trip
/// without delimiter-escaping concerns.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<Inner>,
}

impl Transport {
    /// Build a transport for `config`. Does not bind or dial until [`Transport::start`].
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                connections: DashMap::new(),
                handler: RwLock::new(None),
                running: RwLock::new(false),
                frames_sent: AtomicU64::new(0),
                frames_received: AtomicU64::new(0),
            }),
        }
    }

    /// Register the frame/lifecycle handler. Must be called before [`Transport::start`].
    pub fn set_message_handler(&self, handler: Arc<dyn TransportHandler>) {
        *self.inner.handler.write() = Some(handler);
    }

    /// Bind the listener and spawn the accept loop.
    pub async fn start(&self, cancel: CancellationToken) -> Result<(), ClusterError> {
        {
            let mut running = self.inner.running.write();
            if *running {
                return Err(ClusterError::AlreadyRunning);
            }
            *running = true;
        }

        let bind_addr = format!("{}:{}", self.inner.config.bind_address, self.inner.config.bind_port);
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(%bind_addr, "cluster transport listening");

        let transport = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("transport accept loop stopping");
                        break;
                    }
                    accepted = listener.accept() => {
                        match accepted {
                            Ok((stream, peer_addr)) => {
                                debug!(%peer_addr, "accepted cluster connection");
                                transport.clone().spawn_accepted(stream);
                            }
                            Err(error) => {
                                warn!(%error, "failed to accept cluster connection");
                            }
                        }
                    }
                }
            }
        });

        Ok(())
    }

    /// Mark the transport stopped. Existing connection tasks drain and exit on their own.
    pub fn stop(&self) {
        *self.inner.running.write() = false;
        self.inner.connections.clear();
    }

    /// Dial `address`, complete the join handshake, and return the peer's node ID.
    ///
    /// Unlike an accepted connection, the peer's ID isn't known until it
    /// replies, so this awaits the handshake before handing the connection
    /// off to its background run loop.
    pub async fn connect(&self, address: &str) -> Result<NodeId, ClusterError> {
        let local_id = self.inner.config.node_id;
        let stream = TcpStream::connect(address)
            .await
            .map_err(|error| ClusterError::ConnectionFailed(local_id, format!("dialing {address}: {error}")))?;

        let local_snapshot = self.inner.handler.read().clone().map(|handler| handler.join_snapshot()).unwrap_or_default();
        let mut framed = self.framed(stream);
        let join = ClusterMessage::new(ClusterMessageType::Join, local_id, None, local_snapshot);
        send_frame(&mut framed, &join).await?;
        let reply = recv_frame(&mut framed)
            .await
            .filter(|message| message.message_type == ClusterMessageType::Join)
            .ok_or_else(|| ClusterError::ConnectionFailed(local_id, "peer did not complete join handshake".to_string()))?;
        let peer_id = reply.from;

        if let Some(handler) = self.inner.handler.read().clone() {
            handler.on_join_snapshot(peer_id, reply.payload.clone()).await;
        }

        self.clone().spawn_run_loop(framed, peer_id);
        Ok(peer_id)
    }

    /// Send `message` to a specific node, honoring `message_timeout`.
    pub async fn send(&self, node_id: NodeId, message: ClusterMessage) -> Result<(), ClusterError> {
        let sender = {
            let connection = self
                .inner
                .connections
                .get(&node_id)
                .ok_or(ClusterError::UnknownNode(node_id))?;
            connection.outbound.clone()
        };
        timeout(self.inner.config.message_timeout, sender.send(message))
            .await
            .map_err(|_| ClusterError::SendTimeout(node_id))?
            .map_err(|_| ClusterError::UnknownNode(node_id))?;
        self.inner.frames_sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Send `message` (with `to` cleared) to every currently-connected peer.
    pub async fn broadcast(&self, mut message: ClusterMessage) {
        message.to = None;
        let targets: Vec<NodeId> = self.inner.connections.iter().map(|entry| *entry.key()).collect();
        for node_id in targets {
            if let Err(error) = self.send(node_id, message.clone()).await {
                warn!(%node_id, %error, "broadcast send failed");
            }
        }
    }

    /// Point-in-time connection and frame counters.
    pub fn statistics(&self) -> TransportStatistics {
        TransportStatistics {
            connections: self.inner.connections.len(),
            frames_sent: self.inner.frames_sent.load(Ordering::Relaxed),
            frames_received: self.inner.frames_received.load(Ordering::Relaxed),
        }
    }

    fn framed(&self, stream: TcpStream) -> Framed<TcpStream, LengthDelimitedCodec> {
        let mut codec = LengthDelimitedCodec::new();
        codec.set_max_frame_length(self.inner.config.max_message_size);
        Framed::new(stream, codec)
    }

    /// Accepted connections learn the peer's ID by reading its inbound Join first.
    fn spawn_accepted(self, stream: TcpStream) {
        tokio::spawn(async move {
            let mut framed = self.framed(stream);
            let local_id = self.inner.config.node_id;

            let peer_id = match recv_frame(&mut framed).await {
                Some(message) if message.message_type == ClusterMessageType::Join => {
                    let local_snapshot =
                        self.inner.handler.read().clone().map(|handler| handler.join_snapshot()).unwrap_or_default();
                    let reply = ClusterMessage::new(ClusterMessageType::Join, local_id, Some(message.from), local_snapshot);
                    if send_frame(&mut framed, &reply).await.is_err() {
                        return;
                    }
                    if let Some(handler) = self.inner.handler.read().clone() {
                        handler.on_join_snapshot(message.from, message.payload.clone()).await;
                    }
                    message.from
                }
                _ => {
                    warn!("connection dropped before completing join handshake");
                    return;
                }
            };

            self.spawn_run_loop(framed, peer_id);
        });
    }

    /// Register the connection and drive its read/write loops until either side closes.
    fn spawn_run_loop(self, framed: Framed<TcpStream, LengthDelimitedCodec>, peer_id: NodeId) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let (outbound_tx, mut outbound_rx) = mpsc::channel(inner.config.send_queue_capacity);
            inner.connections.insert(peer_id, Connection { outbound: outbound_tx });

            if let Some(handler) = inner.handler.read().clone() {
                handler.on_connected(peer_id).await;
            }

            let (mut sink, mut stream) = framed.split();
            let inner_for_reader = Arc::clone(&inner);
            let reader = tokio::spawn(async move {
                loop {
                    let frame = match timeout(READ_DEADLINE, stream.next()).await {
                        Ok(frame) => frame,
                        Err(_elapsed) => {
                            warn!(%peer_id, "cluster connection read deadline exceeded");
                            break;
                        }
                    };
                    match frame {
                        Some(Ok(bytes)) => match serde_json::from_slice::<ClusterMessage>(&bytes) {
                            Ok(message) => {
                                inner_for_reader.frames_received.fetch_add(1, Ordering::Relaxed);
                                if let Some(handler) = inner_for_reader.handler.read().clone() {
                                    handler.on_message(peer_id, message).await;
                                }
                            }
                            Err(error) => warn!(%error, "failed to decode cluster frame"),
                        },
                        Some(Err(error)) => {
                            warn!(%error, "cluster connection read error");
                            break;
                        }
                        None => break,
                    }
                }
            });

            while let Some(message) = outbound_rx.recv().await {
                match serde_json::to_vec(&message) {
                    Ok(bytes) => {
                        if sink.send(bytes.into()).await.is_err() {
                            break;
                        }
                    }
                    Err(error) => error!(%error, "failed to encode cluster frame"),
                }
            }
            reader.abort();

            inner.connections.remove(&peer_id);
            if let Some(handler) = inner.handler.read().clone() {
                handler.on_disconnected(peer_id, "connection closed".to_string()).await;
            }
        });
    }
}

async fn send_frame(
    framed: &mut Framed<TcpStream, LengthDelimitedCodec>,
    message: &ClusterMessage,
) -> Result<(), ClusterError> {
    let bytes = serde_json::to_vec(message).map_err(|error| ClusterError::Decode(error.to_string()))?;
    framed.send(bytes.into()).await.map_err(ClusterError::from)
}

async fn recv_frame(framed: &mut Framed<TcpStream, LengthDelimitedCodec>) -> Option<ClusterMessage> {
    let frame = timeout(HANDSHAKE_DEADLINE, framed.next()).await.ok()??;
    let bytes = frame.ok()?;
    serde_json::from_slice(&bytes).ok()
}
