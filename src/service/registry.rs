//! Name-keyed registry of service instances with a broadcast change feed.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// Layer 3: Internal module imports
use super::error::ServiceError;
use super::types::{ServiceEvent, ServiceEventKind, ServiceInfo, ServiceQuery, ServiceStatus};
use crate::util::ActorId;

/// Default capacity of the `watch` broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Lock-free, name-keyed table of [`ServiceInfo`] with a fan-out change feed.
///
/// Cheap to clone: the table and event channel are shared via `Arc`/`Sender`.
#[derive(Clone)]
pub struct ServiceRegistry {
    services: std::sync::Arc<DashMap<String, ServiceInfo>>,
    events_tx: broadcast::Sender<ServiceEvent>,
}

impl ServiceRegistry {
    /// Create an empty registry with the default event-channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create an empty registry whose `watch` channel buffers `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(capacity);
        Self {
            services: std::sync::Arc::new(DashMap::new()),
            events_tx,
        }
    }

    fn emit(&self, kind: ServiceEventKind, name: &str) {
        let _ = self.events_tx.send(ServiceEvent {
            kind,
            name: name.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Register `info`, or re-register it if `info.name` was already owned by
    /// the same actor (an idempotent restart/refresh).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AlreadyExists`] if the name is registered to a
    /// different actor.
    pub fn register(&self, info: ServiceInfo) -> Result<(), ServiceError> {
        if let Some(existing) = self.services.get(&info.name) {
            if existing.actor_id != info.actor_id {
                return Err(ServiceError::AlreadyExists(info.name));
            }
        }
        let name = info.name.clone();
        self.services.insert(name.clone(), info);
        self.emit(ServiceEventKind::Registered, &name);
        Ok(())
    }

    /// Remove an instance by name.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if no instance is registered under `name`.
    pub fn unregister(&self, name: &str) -> Result<(), ServiceError> {
        self.services
            .remove(name)
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))?;
        self.emit(ServiceEventKind::Unregistered, name);
        Ok(())
    }

    /// Fetch a single instance by its registration key.
    pub fn get(&self, name: &str) -> Option<ServiceInfo> {
        self.services.get(name).map(|entry| entry.value().clone())
    }

    /// Every registered instance, in no particular order.
    pub fn list(&self) -> Vec<ServiceInfo> {
        self.services.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Instances matching `query`, capped by [`ServiceQuery::limit`] if set.
    pub fn discover(&self, query: &ServiceQuery) -> Vec<ServiceInfo> {
        let mut matches: Vec<ServiceInfo> = self
            .services
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|info| query.matches(info))
            .collect();
        if let Some(limit) = query.limit {
            matches.truncate(limit);
        }
        matches
    }

    /// Update an instance's health status, refreshing its health-check timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if `name` is not registered.
    pub fn update_status(&self, name: &str, status: ServiceStatus) -> Result<(), ServiceError> {
        let mut entry = self
            .services
            .get_mut(name)
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))?;
        entry.status = status;
        entry.last_health_check = Utc::now();
        drop(entry);
        self.emit(ServiceEventKind::StatusChanged, name);
        Ok(())
    }

    /// Set a single metadata key on a registered instance.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if `name` is not registered.
    pub fn update_metadata(
        &self,
        name: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ServiceError> {
        let mut entry = self
            .services
            .get_mut(name)
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))?;
        entry.metadata.insert(key.into(), value.into());
        drop(entry);
        self.emit(ServiceEventKind::MetadataChanged, name);
        Ok(())
    }

    /// Subscribe to the registry's change feed.
    ///
    /// Lagging subscribers see [`broadcast::error::RecvError::Lagged`] and
    /// should resynchronize with [`ServiceRegistry::list`].
    pub fn watch(&self) -> broadcast::Receiver<ServiceEvent> {
        self.events_tx.subscribe()
    }

    /// Actors registered by `actor_id` (normally zero or one, but an actor
    /// may register under more than one name).
    pub fn names_for(&self, actor_id: ActorId) -> Vec<String> {
        self.services
            .iter()
            .filter(|entry| entry.value().actor_id == actor_id)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no instances are registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Spawn the background sweeper that refreshes `last_health_check` on
    /// every instance whose configured interval has elapsed.
    ///
    /// The default sweep only refreshes the timestamp; actually probing a
    /// remote actor's health is left to a caller-driven `update_status`.
    pub fn spawn_health_sweeper(
        &self,
        tick: Duration,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("service health sweeper stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let now = Utc::now();
                        for mut entry in registry.services.iter_mut() {
                            let due = now
                                .signed_duration_since(entry.last_health_check)
                                .to_std()
                                .map(|elapsed| elapsed >= entry.health_check_interval)
                                .unwrap_or(false);
                            if due {
                                entry.last_health_check = now;
                            }
                        }
                    }
                }
            }
        })
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
