//! Candidate selection policies, generalized from the router's pool strategies.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicUsize, Ordering};

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::RwLock;
use rand::Rng;

// Layer 3: Internal module imports
use super::error::ServiceError;
use super::types::{ServiceInfo, ServiceMetrics, ServiceStatus};

/// Selection policy used by [`LoadBalancer::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadBalanceStrategy {
    /// Rotate through candidates in order, one pool-key counter per call site.
    #[default]
    RoundRobin,
    /// Pick uniformly at random.
    Random,
    /// Pick the candidate with the fewest [`ServiceMetrics::active_connections`].
    LeastConnections,
    /// Round-robin over an expanded list weighted by recent success rate and latency.
    WeightedRoundRobin,
    /// Reserved: falls back to [`LoadBalanceStrategy::Random`] until a consistent-hash
    /// ring is implemented.
    ConsistentHash,
}

/// Picks one instance from a caller-supplied candidate list.
///
/// Holds per-pool round-robin counters and per-instance metrics reported back
/// via [`LoadBalancer::record_metrics`]; does not itself own the candidate
/// list (callers pass the result of [`crate::service::ServiceRegistry::discover`]).
pub struct LoadBalancer {
    strategy: RwLock<LoadBalanceStrategy>,
    round_robin_counters: DashMap<String, AtomicUsize>,
    metrics: DashMap<String, ServiceMetrics>,
}

impl LoadBalancer {
    /// Build a load balancer defaulting to [`LoadBalanceStrategy::RoundRobin`].
    pub fn new() -> Self {
        Self {
            strategy: RwLock::new(LoadBalanceStrategy::default()),
            round_robin_counters: DashMap::new(),
            metrics: DashMap::new(),
        }
    }

    /// Build a load balancer with an explicit initial strategy.
    pub fn with_strategy(strategy: LoadBalanceStrategy) -> Self {
        Self {
            strategy: RwLock::new(strategy),
            round_robin_counters: DashMap::new(),
            metrics: DashMap::new(),
        }
    }

    /// The active strategy.
    pub fn strategy(&self) -> LoadBalanceStrategy {
        *self.strategy.read()
    }

    /// Change the active strategy.
    pub fn set_strategy(&self, strategy: LoadBalanceStrategy) {
        *self.strategy.write() = strategy;
    }

    /// Replace the recorded metrics for one instance.
    pub fn record_metrics(&self, name: &str, metrics: ServiceMetrics) {
        self.metrics.insert(name.to_string(), metrics);
    }

    /// Recorded metrics for one instance, or the default if none were reported.
    pub fn metrics_for(&self, name: &str) -> ServiceMetrics {
        self.metrics
            .get(name)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn weight_for(metrics: &ServiceMetrics) -> usize {
        let success_rate = if metrics.total_requests == 0 {
            1.0
        } else {
            1.0 - (metrics.failed_requests as f64 / metrics.total_requests as f64)
        };
        let avg = metrics.avg_response_time_ms.max(1.0);
        let raw = success_rate * (1000.0 / avg);
        raw.clamp(1.0, 100.0) as usize
    }

    /// Choose one instance from `candidates` under `pool_key`'s rotation state.
    ///
    /// `pool_key` scopes the round-robin/weighted-round-robin counters (two
    /// calls with different keys rotate independently, e.g. one counter per
    /// logical service name). Only [`ServiceStatus::Healthy`] candidates are
    /// eligible.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NoHealthy`] if `candidates` is empty or none
    /// of its entries are healthy.
    pub fn select(&self, pool_key: &str, candidates: &[ServiceInfo]) -> Result<ServiceInfo, ServiceError> {
        let healthy: Vec<&ServiceInfo> = candidates
            .iter()
            .filter(|info| info.status == ServiceStatus::Healthy)
            .collect();
        if healthy.is_empty() {
            return Err(ServiceError::NoHealthy(pool_key.to_string()));
        }

        match self.strategy() {
            LoadBalanceStrategy::RoundRobin => {
                let counter = self
                    .round_robin_counters
                    .entry(pool_key.to_string())
                    .or_insert_with(|| AtomicUsize::new(0));
                let index = counter.fetch_add(1, Ordering::Relaxed) % healthy.len();
                Ok(healthy[index].clone())
            }
            LoadBalanceStrategy::Random | LoadBalanceStrategy::ConsistentHash => {
                let index = rand::thread_rng().gen_range(0..healthy.len());
                Ok(healthy[index].clone())
            }
            LoadBalanceStrategy::LeastConnections => {
                let winner = healthy
                    .into_iter()
                    .min_by_key(|info| self.metrics_for(&info.name).active_connections)
                    .expect("healthy is non-empty");
                Ok(winner.clone())
            }
            LoadBalanceStrategy::WeightedRoundRobin => {
                let mut expanded: Vec<&ServiceInfo> = Vec::new();
                for info in &healthy {
                    let weight = Self::weight_for(&self.metrics_for(&info.name));
                    expanded.extend(std::iter::repeat(*info).take(weight));
                }
                let counter = self
                    .round_robin_counters
                    .entry(pool_key.to_string())
                    .or_insert_with(|| AtomicUsize::new(0));
                let index = counter.fetch_add(1, Ordering::Relaxed) % expanded.len();
                Ok(expanded[index].clone())
            }
        }
    }
}

impl Default for LoadBalancer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::util::{ActorId, NodeId};

    fn healthy(name: &str) -> ServiceInfo {
        let mut info = ServiceInfo::new(name, ActorId::next(), NodeId::new(0));
        info.status = ServiceStatus::Healthy;
        info
    }

    #[test]
    fn round_robin_rotates_through_candidates() {
        let balancer = LoadBalancer::new();
        let candidates = vec![healthy("a"), healthy("b"), healthy("c")];

        let first = balancer.select("pool", &candidates).unwrap();
        let second = balancer.select("pool", &candidates).unwrap();
        let third = balancer.select("pool", &candidates).unwrap();
        let fourth = balancer.select("pool", &candidates).unwrap();

        assert_eq!(first.name, "a");
        assert_eq!(second.name, "b");
        assert_eq!(third.name, "c");
        assert_eq!(fourth.name, "a");
    }

    #[test]
    fn no_healthy_candidates_errors() {
        let balancer = LoadBalancer::new();
        let mut unhealthy = healthy("a");
        unhealthy.status = ServiceStatus::Unhealthy;
        let result = balancer.select("pool", &[unhealthy]);
        assert!(matches!(result, Err(ServiceError::NoHealthy(_))));
    }

    #[test]
    fn least_connections_picks_lowest_load() {
        let balancer = LoadBalancer::new();
        balancer.set_strategy(LoadBalanceStrategy::LeastConnections);
        let candidates = vec![healthy("busy"), healthy("idle")];
        balancer.record_metrics(
            "busy",
            ServiceMetrics {
                active_connections: 10,
                ..Default::default()
            },
        );
        balancer.record_metrics(
            "idle",
            ServiceMetrics {
                active_connections: 0,
                ..Default::default()
            },
        );

        let chosen = balancer.select("pool", &candidates).unwrap();
        assert_eq!(chosen.name, "idle");
    }

    #[test]
    fn weighted_round_robin_favors_higher_success_rate() {
        let balancer = LoadBalancer::new();
        balancer.set_strategy(LoadBalanceStrategy::WeightedRoundRobin);
        let candidates = vec![healthy("reliable"), healthy("flaky")];
        balancer.record_metrics(
            "reliable",
            ServiceMetrics {
                total_requests: 100,
                failed_requests: 0,
                avg_response_time_ms: 10.0,
                ..Default::default()
            },
        );
        balancer.record_metrics(
            "flaky",
            ServiceMetrics {
                total_requests: 100,
                failed_requests: 90,
                avg_response_time_ms: 500.0,
                ..Default::default()
            },
        );

        let mut reliable_count = 0;
        let mut flaky_count = 0;
        for _ in 0..20 {
            match balancer.select("pool", &candidates).unwrap().name.as_str() {
                "reliable" => reliable_count += 1,
                "flaky" => flaky_count += 1,
                _ => unreachable!(),
            }
        }
        assert!(reliable_count > flaky_count);
    }

    #[test]
    fn random_always_returns_a_healthy_candidate() {
        let balancer = LoadBalancer::new();
        balancer.set_strategy(LoadBalanceStrategy::Random);
        let candidates = vec![healthy("a"), healthy("b")];
        for _ in 0..10 {
            let chosen = balancer.select("pool", &candidates).unwrap();
            assert!(chosen.name == "a" || chosen.name == "b");
        }
    }
}
