//! Spawns an [`Actor`] onto its own task and exposes a non-generic handle to it.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// Layer 3: Internal module imports
use super::context::ActorContext;
use super::error::ActorError;
use super::state::{ActorState, ActorStats};
use super::traits::Actor;
use crate::mailbox::{BoundedMailbox, MailboxReceiver, TryRecvError, UnboundedMailbox};
use crate::message::Message;
use crate::router::{Router, RouterSender};
use crate::session::SessionManager;
use crate::util::{ActorId, NodeId};

/// Default per-message handler timeout (§5 Concurrency model).
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);
/// Default `call()` deadline (§5 Concurrency model).
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// The receiving half an actor was spawned with; either mailbox flavor.
pub enum ActorMailbox {
    /// A capacity-limited mailbox.
    Bounded(BoundedMailbox),
    /// An unlimited-capacity mailbox.
    Unbounded(UnboundedMailbox),
}

impl ActorMailbox {
    async fn recv(&mut self) -> Option<Message> {
        match self {
            Self::Bounded(mailbox) => mailbox.recv().await,
            Self::Unbounded(mailbox) => mailbox.recv().await,
        }
    }

    fn drain_one(&mut self) -> Option<Message> {
        let result = match self {
            Self::Bounded(mailbox) => mailbox.try_recv(),
            Self::Unbounded(mailbox) => mailbox.try_recv(),
        };
        match result {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Bounded(mailbox) => mailbox.len(),
            Self::Unbounded(mailbox) => mailbox.len(),
        }
    }
}

struct RuntimeState {
    state: ActorState,
    processed: u64,
    mailbox_len: usize,
    started_at: Option<chrono::DateTime<Utc>>,
    last_active_at: Option<chrono::DateTime<Utc>>,
}

impl RuntimeState {
    fn new() -> Self {
        Self {
            state: ActorState::Idle,
            processed: 0,
            mailbox_len: 0,
            started_at: None,
            last_active_at: None,
        }
    }
}

/// A non-generic handle to a spawned [`Actor`].
///
/// `ActorRef` never holds the actor value itself: a concrete `A: Actor` is
/// moved into the task spawned by [`ActorRef::spawn`] and lives there for the
/// task's lifetime, which is what lets a [`Router`] hold a single homogeneous
/// table of handles regardless of how many distinct actor types are running.
#[derive(Clone)]
pub struct ActorRef {
    actor_id: ActorId,
    sender: RouterSender,
    router: Router,
    sessions: SessionManager,
    state: Arc<RwLock<RuntimeState>>,
    started: Arc<AtomicBool>,
    go: Arc<Notify>,
    cancel: CancellationToken,
    task: Arc<parking_lot::Mutex<Option<tokio::task::JoinHandle<()>>>>,
}

impl ActorRef {
    /// Spawn `actor` onto its own task, wired to `router` and `sessions`.
    ///
    /// The task is created immediately but waits for [`ActorRef::start`]
    /// before dequeuing its first message, so construction alone can never
    /// race message delivery.
    pub fn spawn<A: Actor>(
        actor: A,
        actor_id: ActorId,
        node_id: NodeId,
        mailbox: ActorMailbox,
        mailbox_sender: RouterSender,
        router: Router,
        sessions: SessionManager,
        handler_timeout: Duration,
    ) -> Self {
        let state = Arc::new(RwLock::new(RuntimeState::new()));
        let started = Arc::new(AtomicBool::new(false));
        let go = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_loop(
            actor,
            ActorContext::new(actor_id, node_id, router.clone()),
            mailbox,
            sessions.clone(),
            handler_timeout,
            Arc::clone(&state),
            Arc::clone(&go),
            cancel.clone(),
        ));

        Self {
            actor_id,
            sender: mailbox_sender,
            router,
            sessions,
            state,
            started,
            go,
            cancel,
            task: Arc::new(parking_lot::Mutex::new(Some(task))),
        }
    }

    /// This actor's ID.
    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    /// The router this actor is registered on.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Release the task's start gate. Fails if already started.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::AlreadyStarted`] on a second call.
    pub fn start(&self) -> Result<(), ActorError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ActorError::AlreadyStarted);
        }
        self.go.notify_one();
        Ok(())
    }

    /// Enqueue `message` without waiting for a reply.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::NotRunning`] if the actor is stopping or stopped,
    /// or [`ActorError::MailboxFull`]/[`ActorError::MailboxClosed`] per the
    /// mailbox's own state.
    pub async fn send(&self, message: Message) -> Result<(), ActorError> {
        if self.state.read().state.rejects_new_work() {
            return Err(ActorError::NotRunning);
        }
        self.sender.deliver(message).await.map_err(ActorError::from)
    }

    /// Send `message` and await exactly one reply, a caller cancellation, or a timeout.
    ///
    /// `message.target` and `message.session` are overwritten to address this
    /// actor and its freshly allocated session.
    ///
    /// # Errors
    ///
    /// [`ActorError::NotRunning`] if stopping/stopped, [`ActorError::Timeout`]
    /// if `timeout` elapses first, [`ActorError::Cancelled`] if `cancel` fires
    /// first, or [`ActorError::Remote`] if the handler replied with an error.
    pub async fn call(
        &self,
        mut message: Message,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<bytes::Bytes, ActorError> {
        if self.state.read().state.rejects_new_work() {
            return Err(ActorError::NotRunning);
        }
        if cancel.is_cancelled() {
            return Err(ActorError::Cancelled);
        }

        let (session, reply_rx) = self.sessions.create_session(message.source, self.actor_id, timeout);
        message.target = self.actor_id;
        message.session = session.id;

        self.sender.deliver(message).await.map_err(ActorError::from)?;

        tokio::select! {
            result = reply_rx => {
                match result {
                    Ok(reply) if reply.message_type == crate::message::MessageType::Error => {
                        Err(ActorError::Remote(String::from_utf8_lossy(&reply.payload).into_owned()))
                    }
                    Ok(reply) => Ok(reply.payload),
                    Err(_) => Err(ActorError::NotRunning),
                }
            }
            _ = cancel.cancelled() => {
                self.sessions.cleanup(session.id);
                Err(ActorError::Cancelled)
            }
            _ = tokio::time::sleep(timeout) => {
                self.sessions.cleanup(session.id);
                Err(ActorError::Timeout)
            }
        }
    }

    /// Transition to stopping, cancel the run loop, and await its completion.
    ///
    /// Idempotent: calling `stop` on an already-stopped actor is a no-op.
    pub async fn stop(&self) {
        {
            let mut state = self.state.write();
            if state.state == ActorState::Stopped {
                return;
            }
            state.state = ActorState::Stopping;
        }
        self.cancel.cancel();
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(actor_id = %self.actor_id, error = %err, "actor task ended abnormally");
            }
        }
    }

    /// A snapshot of this actor's current runtime state.
    pub fn stats(&self) -> ActorStats {
        let guard = self.state.read();
        ActorStats {
            state: guard.state,
            processed: guard.processed,
            mailbox_len: guard.mailbox_len,
            started_at: guard.started_at,
            last_active_at: guard.last_active_at,
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_loop<A: Actor>(
    mut actor: A,
    ctx: ActorContext,
    mut mailbox: ActorMailbox,
    sessions: SessionManager,
    handler_timeout: Duration,
    state: Arc<RwLock<RuntimeState>>,
    go: Arc<Notify>,
    cancel: CancellationToken,
) {
    go.notified().await;

    {
        let mut guard = state.write();
        guard.started_at = Some(Utc::now());
    }

    if let Err(err) = actor.on_start(&ctx).await {
        warn!(actor_id = %ctx.actor_id(), error = %err, "actor on_start failed, not entering run loop");
        state.write().state = ActorState::Stopped;
        return;
    }

    info!(actor_id = %ctx.actor_id(), "actor started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            message = mailbox.recv() => {
                match message {
                    Some(message) => process_one(&mut actor, &ctx, message, handler_timeout, &sessions, &state).await,
                    None => break,
                }
            }
        }
    }

    state.write().state = ActorState::Stopping;
    debug!(actor_id = %ctx.actor_id(), "actor draining mailbox");
    while let Some(message) = mailbox.drain_one() {
        if !message.is_fire_and_forget() {
            let reply = message.respond_error("actor stopping");
            let _ = sessions.complete(message.session, reply);
        }
    }

    if let Err(err) = actor.on_stop(&ctx).await {
        warn!(actor_id = %ctx.actor_id(), error = %err, "actor on_stop returned an error");
    }

    state.write().state = ActorState::Stopped;
    info!(actor_id = %ctx.actor_id(), "actor stopped");
}

async fn process_one<A: Actor>(
    actor: &mut A,
    ctx: &ActorContext,
    message: Message,
    handler_timeout: Duration,
    sessions: &SessionManager,
    state: &Arc<RwLock<RuntimeState>>,
) {
    {
        let mut guard = state.write();
        guard.state = ActorState::Running;
        guard.last_active_at = Some(Utc::now());
    }

    debug!(actor_id = %ctx.actor_id(), message_id = %message.id, "dequeued message");

    let is_sessioned = !message.is_fire_and_forget();
    let outcome = tokio::time::timeout(handler_timeout, actor.handle(message.clone(), ctx)).await;

    if is_sessioned {
        let reply = match outcome {
            Ok(Ok(payload)) => message.respond(payload),
            Ok(Err(handler_err)) => {
                warn!(actor_id = %ctx.actor_id(), error = %handler_err, "handler returned an error");
                message.respond_error(handler_err.to_string())
            }
            Err(_elapsed) => {
                warn!(actor_id = %ctx.actor_id(), "handler timed out");
                message.respond_error("handler timed out")
            }
        };
        let _ = sessions.complete(message.session, reply);
    } else if let Ok(Err(handler_err)) = outcome {
        warn!(actor_id = %ctx.actor_id(), error = %handler_err, "handler returned an error for a fire-and-forget message");
    }

    {
        let mut guard = state.write();
        guard.state = ActorState::Idle;
        guard.processed += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::MessageType;
    use crate::util::SessionId;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::fmt;

    #[derive(Debug)]
    struct EchoError;
    impl fmt::Display for EchoError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "echo error")
        }
    }
    impl std::error::Error for EchoError {}

    struct Echo;

    #[async_trait]
    impl Actor for Echo {
        type Error = EchoError;

        async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
            Ok(message.payload)
        }
    }

    struct Failing;

    #[async_trait]
    impl Actor for Failing {
        type Error = EchoError;

        async fn handle(&mut self, _message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
            Err(EchoError)
        }
    }

    fn spawn_echo() -> (ActorRef, ActorId, Router, SessionManager) {
        let router = Router::new();
        let sessions = SessionManager::new();
        let actor_id = ActorId::next();
        let (mailbox, sender) = UnboundedMailbox::new();
        let actor_ref = ActorRef::spawn(
            Echo,
            actor_id,
            NodeId::new(0),
            ActorMailbox::Unbounded(mailbox),
            RouterSender::from(sender),
            router.clone(),
            sessions.clone(),
            DEFAULT_HANDLER_TIMEOUT,
        );
        router.register(actor_id, actor_ref.sender.clone()).unwrap();
        (actor_ref, actor_id, router, sessions)
    }

    #[tokio::test]
    async fn double_start_errors() {
        let (actor_ref, _id, _router, _sessions) = spawn_echo();
        actor_ref.start().unwrap();
        assert!(matches!(actor_ref.start(), Err(ActorError::AlreadyStarted)));
        actor_ref.stop().await;
    }

    #[tokio::test]
    async fn call_before_stop_round_trips() {
        let (actor_ref, actor_id, _router, _sessions) = spawn_echo();
        actor_ref.start().unwrap();

        let request = Message::new(MessageType::Request, ActorId::next(), actor_id, SessionId::NONE, "hi");
        let reply = actor_ref
            .call(request, Duration::from_secs(1), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply.as_ref(), b"hi");

        actor_ref.stop().await;
        assert_eq!(actor_ref.stats().state, ActorState::Stopped);
    }

    #[tokio::test]
    async fn call_after_stop_is_rejected() {
        let (actor_ref, actor_id, _router, _sessions) = spawn_echo();
        actor_ref.start().unwrap();
        actor_ref.stop().await;

        let request = Message::new(MessageType::Request, ActorId::next(), actor_id, SessionId::NONE, "hi");
        let result = actor_ref.call(request, Duration::from_secs(1), CancellationToken::new()).await;
        assert!(matches!(result, Err(ActorError::NotRunning)));
    }

    #[tokio::test]
    async fn handler_error_surfaces_as_remote_error() {
        let router = Router::new();
        let sessions = SessionManager::new();
        let actor_id = ActorId::next();
        let (mailbox, sender) = UnboundedMailbox::new();
        let actor_ref = ActorRef::spawn(
            Failing,
            actor_id,
            NodeId::new(0),
            ActorMailbox::Unbounded(mailbox),
            RouterSender::from(sender),
            router.clone(),
            sessions.clone(),
            DEFAULT_HANDLER_TIMEOUT,
        );
        actor_ref.start().unwrap();

        let request = Message::new(MessageType::Request, ActorId::next(), actor_id, SessionId::NONE, "hi");
        let result = actor_ref.call(request, Duration::from_secs(1), CancellationToken::new()).await;
        assert!(matches!(result, Err(ActorError::Remote(_))));

        actor_ref.stop().await;
    }

    #[tokio::test]
    async fn call_timeout_cleans_up_session() {
        struct Never;

        #[async_trait]
        impl Actor for Never {
            type Error = EchoError;

            async fn handle(&mut self, _message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(Bytes::new())
            }
        }

        let router = Router::new();
        let sessions = SessionManager::new();
        let actor_id = ActorId::next();
        let (mailbox, sender) = UnboundedMailbox::new();
        let actor_ref = ActorRef::spawn(
            Never,
            actor_id,
            NodeId::new(0),
            ActorMailbox::Unbounded(mailbox),
            RouterSender::from(sender),
            router.clone(),
            sessions.clone(),
            Duration::from_secs(30),
        );
        actor_ref.start().unwrap();

        let request = Message::new(MessageType::Request, ActorId::next(), actor_id, SessionId::NONE, "hi");
        let result = actor_ref
            .call(request, Duration::from_millis(20), CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ActorError::Timeout)));
        assert!(sessions.is_empty());

        actor_ref.stop().await;
    }

    #[tokio::test]
    async fn call_with_already_cancelled_token_never_enqueues() {
        let (actor_ref, actor_id, _router, sessions) = spawn_echo();
        actor_ref.start().unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let request = Message::new(MessageType::Request, ActorId::next(), actor_id, SessionId::NONE, "hi");
        let result = actor_ref.call(request, Duration::from_secs(1), cancel).await;
        assert!(matches!(result, Err(ActorError::Cancelled)));
        assert!(sessions.is_empty());
        assert_eq!(actor_ref.stats().processed, 0);

        actor_ref.stop().await;
    }
}
