//! Error types for service registration and discovery.

// Layer 2: Third-party crate imports
use thiserror::Error;

/// Failures from [`super::ServiceRegistry`] and [`super::LoadBalancer`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No service is registered under this name.
    #[error("service not found: {0}")]
    NotFound(String),

    /// The name is already registered to a different actor.
    #[error("service already registered under a different actor: {0}")]
    AlreadyExists(String),

    /// A candidate list existed but none of its entries were healthy.
    #[error("no healthy instance available for: {0}")]
    NoHealthy(String),
}

impl ServiceError {
    /// Whether retrying the same discovery shortly could succeed.
    ///
    /// `NoHealthy` is transient: a health sweep or a new registration may
    /// produce a healthy candidate. `NotFound`/`AlreadyExists` describe a
    /// registry state that will not change on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::NoHealthy(_))
    }
}
