//! Service discovery: named instances, health, and load-balanced selection.
//!
//! # Components
//!
//! - [`ServiceInfo`] / [`ServiceQuery`] / [`ServiceStatus`] - a registered instance and its filter
//! - [`ServiceRegistry`] - name-keyed table with register/discover/watch
//! - [`LoadBalancer`] / [`LoadBalanceStrategy`] - candidate selection over a discovered list
//! - [`ServiceError`] - registry and selection failures
//!
//! A service name is the unique registration key for one instance (typically
//! one per actor). Multiple instances of the same logical service share a
//! tag (e.g. `"role:worker"`); `discover` with that tag returns the candidate
//! list a [`LoadBalancer`] then picks from.

mod error;
mod load_balancer;
mod registry;
mod types;

pub use error::ServiceError;
pub use load_balancer::{LoadBalanceStrategy, LoadBalancer};
pub use registry::{ServiceRegistry, DEFAULT_EVENT_CAPACITY};
pub use types::{ServiceEvent, ServiceEventKind, ServiceInfo, ServiceMetrics, ServiceQuery, ServiceStatus};
