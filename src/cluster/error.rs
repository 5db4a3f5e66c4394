//! Error types for the cluster transport, membership, and remote-call layers.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::util::NodeId;

/// Failures from [`super::transport`], [`super::membership`], [`super::remote_service`],
/// and [`super::registry`].
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The transport has not been started.
    #[error("cluster transport is not running")]
    NotRunning,

    /// `start` was called on an already-running transport.
    #[error("cluster transport is already running")]
    AlreadyRunning,

    /// Dialing or accepting a connection to/from `0` failed.
    #[error("connection to node {0} failed: {1}")]
    ConnectionFailed(NodeId, String),

    /// A send did not complete within its configured deadline.
    #[error("send to node {0} timed out")]
    SendTimeout(NodeId),

    /// The target node has no known address or connection.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// A frame failed to decode as a [`super::message::ClusterMessage`].
    #[error("failed to decode frame: {0}")]
    Decode(String),

    /// Underlying I/O failure.
    #[error("transport I/O error: {0}")]
    Io(String),

    /// `ClusterConfig::validate` rejected the configuration.
    #[error("invalid cluster configuration: {0}")]
    Config(String),

    /// No instance is registered for this service name anywhere in the cluster.
    #[error("service not found in cluster registry: {0}")]
    ServiceNotFound(String),

    /// Instances exist but none are healthy.
    #[error("no healthy remote instance for: {0}")]
    NoHealthyInstance(String),

    /// A remote call did not receive a reply within its deadline.
    #[error("remote call {0} timed out")]
    CallTimeout(String),

    /// The remote handler returned an application-level error.
    #[error("remote call {0} failed: {1}")]
    CallFailed(String, String),

    /// A remote call was cancelled by its caller.
    #[error("remote call {0} was cancelled")]
    Cancelled(String),
}

impl ClusterError {
    /// Whether retrying the same operation shortly could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClusterError::SendTimeout(_)
                | ClusterError::CallTimeout(_)
                | ClusterError::ConnectionFailed(_, _)
                | ClusterError::NoHealthyInstance(_)
        )
    }
}

impl From<std::io::Error> for ClusterError {
    fn from(error: std::io::Error) -> Self {
        ClusterError::Io(error.to_string())
    }
}

/// Default wall-clock deadline for a remote call (§4.I).
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
