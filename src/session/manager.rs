//! Allocates sessions, holds their single-slot reply channels, and sweeps
//! expired entries on a background task.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

// Layer 3: Internal module imports
use super::error::SessionError;
use super::types::Session;
use crate::message::Message;
use crate::util::{ActorId, SessionId};

/// Default interval between sweeper passes (§5 Concurrency model).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

struct Pending {
    session: Session,
    reply_tx: oneshot::Sender<Message>,
}

/// Allocates monotonic [`SessionId`]s and correlates replies back to callers.
///
/// Cheap to clone: the counter and pending-call table are shared via `Arc`.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    counter: AtomicU32,
    pending: DashMap<SessionId, Pending>,
}

impl SessionManager {
    /// Create an empty session manager.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                counter: AtomicU32::new(1),
                pending: DashMap::new(),
            }),
        }
    }

    fn next_id(&self) -> SessionId {
        loop {
            let value = self.inner.counter.fetch_add(1, Ordering::Relaxed);
            if value != 0 {
                return SessionId::from_raw(value);
            }
        }
    }

    /// Allocate a session and its single-slot reply channel.
    pub fn create_session(
        &self,
        source: ActorId,
        target: ActorId,
        timeout: Duration,
    ) -> (Session, oneshot::Receiver<Message>) {
        let session = Session {
            id: self.next_id(),
            source,
            target,
            created_at: Utc::now(),
            timeout,
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        self.inner.pending.insert(
            session.id,
            Pending {
                session: session.clone(),
                reply_tx,
            },
        );
        (session, reply_rx)
    }

    /// Deliver `reply` to the waiting caller and remove the session.
    ///
    /// Removal happens atomically with the lookup so a session is never
    /// completed twice, even if `complete` races with the sweeper.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if the session has already been
    /// completed, swept, or never existed.
    pub fn complete(&self, session_id: SessionId, reply: Message) -> Result<(), SessionError> {
        let (_, pending) = self
            .inner
            .pending
            .remove(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;
        let _ = pending.reply_tx.send(reply);
        Ok(())
    }

    /// Remove a session without delivering a reply (caller gave up).
    pub fn cleanup(&self, session_id: SessionId) {
        self.inner.pending.remove(&session_id);
    }

    /// Whether a session is still pending.
    pub fn contains(&self, session_id: SessionId) -> bool {
        self.inner.pending.contains_key(&session_id)
    }

    /// Number of sessions currently awaiting a reply.
    pub fn len(&self) -> usize {
        self.inner.pending.len()
    }

    /// Whether no sessions are pending.
    pub fn is_empty(&self) -> bool {
        self.inner.pending.is_empty()
    }

    /// Remove every session whose age exceeds its own timeout. Returns how many were swept.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<SessionId> = self
            .inner
            .pending
            .iter()
            .filter(|entry| entry.value().session.is_expired(now))
            .map(|entry| *entry.key())
            .collect();
        for session_id in &expired {
            self.inner.pending.remove(session_id);
        }
        expired.len()
    }

    /// Spawn the background sweeper task, ticking every `interval` until `cancel` fires.
    pub fn spawn_sweeper(&self, interval: Duration, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("session sweeper stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let swept = manager.sweep_expired();
                        if swept > 0 {
                            warn!(swept, "session sweeper removed expired sessions");
                        }
                    }
                }
            }
        })
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::MessageType;

    #[test]
    fn create_and_complete_delivers_reply() {
        let manager = SessionManager::new();
        let (session, mut rx) = manager.create_session(ActorId::next(), ActorId::next(), Duration::from_secs(30));

        let reply = Message::new(MessageType::Response, session.target, session.source, session.id, "ok");
        manager.complete(session.id, reply.clone()).unwrap();

        let received = rx.try_recv().unwrap();
        assert_eq!(received.payload, reply.payload);
        assert!(!manager.contains(session.id));
    }

    #[test]
    fn complete_unknown_session_errors() {
        let manager = SessionManager::new();
        let result = manager.complete(SessionId::from_raw(999), Message::new(
            MessageType::Response,
            ActorId::next(),
            ActorId::next(),
            SessionId::from_raw(999),
            "x",
        ));
        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[test]
    fn complete_is_single_shot() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.create_session(ActorId::next(), ActorId::next(), Duration::from_secs(30));
        let reply = Message::new(MessageType::Response, session.target, session.source, session.id, "a");

        manager.complete(session.id, reply.clone()).unwrap();
        let second = manager.complete(session.id, reply);
        assert!(matches!(second, Err(SessionError::NotFound(_))));
    }

    #[test]
    fn cleanup_removes_without_reply() {
        let manager = SessionManager::new();
        let (session, rx) = manager.create_session(ActorId::next(), ActorId::next(), Duration::from_secs(30));
        manager.cleanup(session.id);
        assert!(!manager.contains(session.id));
        drop(rx);
    }

    #[test]
    fn sweep_expired_removes_stale_sessions() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.create_session(ActorId::next(), ActorId::next(), Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        let swept = manager.sweep_expired();
        assert_eq!(swept, 1);
        assert!(!manager.contains(session.id));
    }

    #[test]
    fn session_ids_are_unique() {
        let manager = SessionManager::new();
        let (a, _) = manager.create_session(ActorId::next(), ActorId::next(), Duration::from_secs(1));
        let (b, _) = manager.create_session(ActorId::next(), ActorId::next(), Duration::from_secs(1));
        assert_ne!(a.id, b.id);
    }
}
