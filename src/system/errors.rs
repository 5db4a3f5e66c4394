//! System-level error types.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use thiserror::Error;

// Layer 3: Internal
use crate::actor::ActorError;
use crate::cluster::ClusterError;
use crate::handle::HandleError;
use crate::router::RouterError;
use crate::service::ServiceError;
use crate::session::SessionError;
use crate::util::ActorId;

/// System-level errors surfaced by [`super::ActorSystem`].
///
/// Composes the per-component errors of the runtime it drives: routing,
/// handle lookup, session correlation, service discovery, and (when the
/// system is cluster-enabled) remote call and membership failures.
#[derive(Error, Debug)]
pub enum SystemError {
    /// Actor with given ID not found in registry
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// Failed to spawn actor
    #[error("failed to spawn actor: {0}")]
    SpawnFailed(String),

    /// System is shutting down, cannot accept new operations
    #[error("system shutdown in progress")]
    ShuttingDown,

    /// Actor mailbox is full (bounded mailbox with backpressure)
    #[error("actor mailbox full: {0}")]
    MailboxFull(ActorId),

    /// An actor-level operation (`start`/`stop`/`send`/`call`) failed.
    #[error(transparent)]
    Actor(#[from] ActorError),

    /// Message routing failed.
    #[error(transparent)]
    Router(#[from] RouterError),

    /// Handle allocation or lookup failed.
    #[error(transparent)]
    Handle(#[from] HandleError),

    /// A request/response session failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Service registration or discovery failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A cluster-wide operation failed (only reachable when the system is
    /// configured with [`crate::cluster::ClusterConfig`]).
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// Configuration validation error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Actor limit exceeded
    #[error("actor limit exceeded: current {current}, max {max}")]
    ActorLimitExceeded { current: usize, max: usize },

    /// Shutdown timeout exceeded
    #[error("shutdown timeout exceeded after {0:?}")]
    ShutdownTimeout(Duration),
}

impl SystemError {
    /// Whether retrying the same operation shortly could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SystemError::MailboxFull(_) => true,
            SystemError::Actor(error) => error.is_transient(),
            SystemError::Router(error) => error.is_transient(),
            SystemError::Session(error) => error.is_transient(),
            SystemError::Service(error) => error.is_transient(),
            SystemError::Cluster(error) => error.is_transient(),
            _ => false,
        }
    }

    /// Whether the system cannot continue operating and must shut down.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SystemError::ShuttingDown | SystemError::ShutdownTimeout(_))
    }

    /// Whether the caller can handle this without stopping the system.
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_not_found_display() {
        let id = ActorId::next();
        let err = SystemError::ActorNotFound(id);
        let msg = err.to_string();
        assert!(msg.contains("actor not found"));
        assert!(msg.contains(&id.to_string()));
    }

    #[test]
    fn test_spawn_failed_display() {
        let err = SystemError::SpawnFailed("initialization error".to_string());
        assert!(err.to_string().contains("failed to spawn"));
        assert!(err.to_string().contains("initialization error"));
    }

    #[test]
    fn test_shutting_down_display() {
        let err = SystemError::ShuttingDown;
        assert_eq!(err.to_string(), "system shutdown in progress");
    }

    #[test]
    fn test_mailbox_full_display() {
        let id = ActorId::next();
        let err = SystemError::MailboxFull(id);
        assert!(err.to_string().contains("mailbox full"));
    }

    #[test]
    fn test_config_error_display() {
        let err = SystemError::ConfigError("invalid timeout".to_string());
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("invalid timeout"));
    }

    #[test]
    fn test_actor_limit_exceeded_display() {
        let err = SystemError::ActorLimitExceeded { current: 100, max: 50 };
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
        assert!(msg.contains("exceeded"));
    }

    #[test]
    fn test_shutdown_timeout_display() {
        let timeout = Duration::from_secs(30);
        let err = SystemError::ShutdownTimeout(timeout);
        assert!(err.to_string().contains("timeout"));
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_transient_errors() {
        let mailbox_err = SystemError::MailboxFull(ActorId::next());
        assert!(mailbox_err.is_transient());
        assert!(!mailbox_err.is_fatal());
        assert!(mailbox_err.is_recoverable());

        let spawn_err = SystemError::SpawnFailed("error".to_string());
        assert!(!spawn_err.is_transient());
    }

    #[test]
    fn test_fatal_errors() {
        let shutdown_err = SystemError::ShuttingDown;
        assert!(!shutdown_err.is_transient());
        assert!(shutdown_err.is_fatal());
        assert!(!shutdown_err.is_recoverable());

        let timeout_err = SystemError::ShutdownTimeout(Duration::from_secs(30));
        assert!(timeout_err.is_fatal());
        assert!(!timeout_err.is_recoverable());
    }

    #[test]
    fn test_recoverable_errors() {
        let not_found = SystemError::ActorNotFound(ActorId::next());
        assert!(not_found.is_recoverable());

        let config_err = SystemError::ConfigError("test".to_string());
        assert!(config_err.is_recoverable());
    }

    #[test]
    fn test_router_error_conversion_is_transient() {
        let router_err = RouterError::MailboxFull(ActorId::next());
        let system_err: SystemError = router_err.into();
        assert!(matches!(system_err, SystemError::Router(_)));
        assert!(system_err.is_transient());
    }

    #[test]
    fn test_service_error_conversion() {
        let service_err = ServiceError::NotFound("worker".into());
        let system_err: SystemError = service_err.into();
        assert!(matches!(system_err, SystemError::Service(_)));
        assert!(!system_err.is_transient());
    }

    #[test]
    fn test_error_debug_impl() {
        let err = SystemError::SpawnFailed("test".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("SpawnFailed"));
    }
}
