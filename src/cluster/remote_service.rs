//! Outbound and inbound remote-call plumbing over [`super::transport::Transport`].

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::warn;

// Layer 3: Internal module imports
use super::error::{ClusterError, DEFAULT_CALL_TIMEOUT};
use super::message::{ClusterMessage, ClusterMessageType};
use super::transport::Transport;
use crate::util::NodeId;

static NEXT_CALL_ID: AtomicU64 = AtomicU64::new(1);

/// Invoked when an inbound `ActorCall` targets a service registered locally.
#[async_trait]
pub trait RemoteCallHandler: Send + Sync {
    /// Handle one call for `service_id`/`method`, returning the encoded reply payload.
    async fn handle_call(&self, service_id: &str, method: &str, args: Vec<u8>) -> Result<Vec<u8>, String>;
}

/// `actor_call` frame payload: `{call_id, service_id, method, args}`.
#[derive(Debug, Serialize, Deserialize)]
struct CallEnvelope {
    call_id: String,
    service_id: String,
    method: String,
    args: Vec<u8>,
}

/// `actor_reply` frame payload, repeating the originating call's `call_id`.
#[derive(Debug, Serialize, Deserialize)]
struct ReplyEnvelope {
    call_id: String,
    result: Vec<u8>,
    error: Option<String>,
}

struct PendingCall {
    node_id: NodeId,
    result_tx: Option<oneshot::Sender<Result<Vec<u8>, String>>>,
}

/// Dispatches outbound remote calls and inbound replies, and routes inbound
/// `ActorCall` frames to locally-registered [`RemoteCallHandler`]s.
pub struct RemoteServiceDispatch {
    local_node: NodeId,
    transport: Transport,
    pending: DashMap<String, PendingCall>,
    handlers: DashMap<String, Arc<dyn RemoteCallHandler>>,
}

impl RemoteServiceDispatch {
    /// Build a dispatcher bound to `transport`, tagging outbound calls with `local_node`.
    pub fn new(local_node: NodeId, transport: Transport) -> Self {
        Self {
            local_node,
            transport,
            pending: DashMap::new(),
            handlers: DashMap::new(),
        }
    }

    /// Register a handler for inbound calls addressed to `service_id`.
    pub fn register(&self, service_id: impl Into<String>, handler: Arc<dyn RemoteCallHandler>) {
        self.handlers.insert(service_id.into(), handler);
    }

    /// Remove a previously-registered handler.
    pub fn unregister(&self, service_id: &str) {
        self.handlers.remove(service_id);
    }

    /// Whether a handler is registered locally for `service_id`.
    pub fn resolve(&self, service_id: &str) -> bool {
        self.handlers.contains_key(service_id)
    }

    /// Invoke `method` on `service_id` at `node_id` and wait up to `DEFAULT_CALL_TIMEOUT` for a reply.
    pub async fn call(
        &self,
        node_id: NodeId,
        service_id: &str,
        method: &str,
        args: Vec<u8>,
    ) -> Result<Vec<u8>, ClusterError> {
        self.call_with_timeout(node_id, service_id, method, args, DEFAULT_CALL_TIMEOUT).await
    }

    /// Invoke `method` on `service_id` at `node_id`, waiting up to `call_timeout` for a reply.
    pub async fn call_with_timeout(
        &self,
        node_id: NodeId,
        service_id: &str,
        method: &str,
        args: Vec<u8>,
        call_timeout: Duration,
    ) -> Result<Vec<u8>, ClusterError> {
        let call_id = format!("call-{}-{}", self.local_node, NEXT_CALL_ID.fetch_add(1, Ordering::Relaxed));
        let (result_tx, result_rx) = oneshot::channel();
        self.pending.insert(
            call_id.clone(),
            PendingCall {
                node_id,
                result_tx: Some(result_tx),
            },
        );

        let envelope = CallEnvelope {
            call_id: call_id.clone(),
            service_id: service_id.to_string(),
            method: method.to_string(),
            args,
        };
        let payload = match serde_json::to_vec(&envelope) {
            Ok(payload) => payload,
            Err(error) => {
                self.pending.remove(&call_id);
                return Err(ClusterError::CallFailed(call_id, error.to_string()));
            }
        };
        let message = ClusterMessage::new(ClusterMessageType::ActorCall, self.local_node, Some(node_id), payload);

        if let Err(error) = self.transport.send(node_id, message).await {
            self.pending.remove(&call_id);
            return Err(error);
        }

        match timeout(call_timeout, result_rx).await {
            Ok(Ok(result)) => result.map_err(|error| ClusterError::CallFailed(call_id, error)),
            Ok(Err(_)) => {
                self.pending.remove(&call_id);
                Err(ClusterError::Cancelled(call_id))
            }
            Err(_) => {
                self.pending.remove(&call_id);
                Err(ClusterError::CallTimeout(call_id))
            }
        }
    }

    /// Send `service_id`/`method` a fire-and-forget call with no reply expected.
    pub async fn send(&self, node_id: NodeId, service_id: &str, method: &str, args: Vec<u8>) -> Result<(), ClusterError> {
        let envelope = CallEnvelope {
            call_id: format!("call-{}-{}", self.local_node, NEXT_CALL_ID.fetch_add(1, Ordering::Relaxed)),
            service_id: service_id.to_string(),
            method: method.to_string(),
            args,
        };
        let payload = serde_json::to_vec(&envelope)
            .map_err(|error| ClusterError::CallFailed(envelope.call_id.clone(), error.to_string()))?;
        let message = ClusterMessage::new(ClusterMessageType::ActorCall, self.local_node, Some(node_id), payload)
            .with_fire_forget();
        self.transport.send(node_id, message).await
    }

    /// Dispatch one inbound frame: `ActorCall` is handled locally and replied to;
    /// `ActorReply` resolves a pending outbound call.
    pub async fn dispatch_inbound(&self, message: ClusterMessage) {
        match message.message_type {
            ClusterMessageType::ActorCall => self.handle_inbound_call(message).await,
            ClusterMessageType::ActorReply => self.handle_inbound_reply(message),
            _ => {}
        }
    }

    async fn handle_inbound_call(&self, message: ClusterMessage) {
        let fire_and_forget = message.is_fire_and_forget();
        let envelope: CallEnvelope = match serde_json::from_slice(&message.payload) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(%error, "inbound actor_call payload did not decode");
                return;
            }
        };

        let handler = self.handlers.get(&envelope.service_id).map(|entry| Arc::clone(entry.value()));
        let outcome = match handler {
            Some(handler) => handler.handle_call(&envelope.service_id, &envelope.method, envelope.args).await,
            None => Err(format!("no local handler for service {}", envelope.service_id)),
        };

        if fire_and_forget {
            return;
        }

        let (result, error) = match outcome {
            Ok(payload) => (payload, None),
            Err(error) => (Vec::new(), Some(error)),
        };
        let reply_envelope = ReplyEnvelope {
            call_id: envelope.call_id,
            result,
            error,
        };
        let payload = match serde_json::to_vec(&reply_envelope) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, "failed to encode actor_call reply");
                return;
            }
        };
        let reply = ClusterMessage::new(ClusterMessageType::ActorReply, self.local_node, Some(message.from), payload);
        if let Err(error) = self.transport.send(message.from, reply).await {
            warn!(%error, "failed to send actor_call reply");
        }
    }

    fn handle_inbound_reply(&self, message: ClusterMessage) {
        let envelope: ReplyEnvelope = match serde_json::from_slice(&message.payload) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(%error, "inbound actor_reply payload did not decode");
                return;
            }
        };
        if let Some((_, mut pending)) = self.pending.remove(&envelope.call_id) {
            if let Some(tx) = pending.result_tx.take() {
                let result = match envelope.error {
                    Some(error) => Err(error),
                    None => Ok(envelope.result),
                };
                let _ = tx.send(result);
            }
        }
    }

    /// Fail every call pending against `node_id`, used when that connection is lost.
    pub fn cancel_pending_for(&self, node_id: NodeId) {
        let stale: Vec<String> = self
            .pending
            .iter()
            .filter(|entry| entry.value().node_id == node_id)
            .map(|entry| entry.key().clone())
            .collect();
        for id in stale {
            if let Some((_, mut pending)) = self.pending.remove(&id) {
                if let Some(tx) = pending.result_tx.take() {
                    let _ = tx.send(Err("connection lost".to_string()));
                }
            }
        }
    }
}
