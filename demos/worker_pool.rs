//! Worker Pool with Load Balancing
//!
//! A pool of identical worker actors, each registered as a named service.
//! Tasks are distributed across the pool by discovering the registered
//! instances and handing the candidate list to a `LoadBalancer`. A worker
//! that starts failing is marked unhealthy so the balancer routes around it;
//! there is no automatic restart here, since this runtime has no supervision
//! tree.
//!
//! Run with: cargo run --bin worker_pool (plain reference code, not wired
//! into Cargo.toml).

use orbit_rt::service::{LoadBalanceStrategy, LoadBalancer, ServiceQuery, ServiceStatus};
use orbit_rt::{Actor, ActorContext, ActorSystem, Message, MessageType, SpawnOptions, SystemConfig};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct WorkerError(String);

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker error: {}", self.0)
    }
}

impl std::error::Error for WorkerError {}

struct PoolWorker {
    name: String,
    processed: Arc<AtomicU32>,
    fail_after: Option<u32>,
}

#[async_trait]
impl Actor for PoolWorker {
    type Error = WorkerError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        if let Some(threshold) = self.fail_after {
            if self.processed.load(Ordering::Relaxed) >= threshold {
                return Err(WorkerError(format!("{} is failing its health checks", self.name)));
            }
        }

        let input: u32 = String::from_utf8_lossy(&message.payload).parse().unwrap_or(0);
        let result = input * input;
        self.processed.fetch_add(1, Ordering::Relaxed);
        println!("[{}] compute({input}) = {result}", self.name);
        Ok(Bytes::from(result.to_string()))
    }

    async fn on_start(&mut self, _ctx: &ActorContext) -> Result<(), Self::Error> {
        println!("[{}] starting", self.name);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Worker Pool Example ===\n");

    let system = ActorSystem::new(SystemConfig::default());
    let caller = orbit_rt::util::ActorId::next();
    let balancer = LoadBalancer::with_strategy(LoadBalanceStrategy::RoundRobin);

    println!("Creating worker pool with 3 workers...");
    let mut processed_counts = Vec::new();
    for i in 0..3 {
        let name = format!("worker-{i}");
        let processed = Arc::new(AtomicU32::new(0));
        let fail_after = if i == 1 { Some(2) } else { None };
        system
            .new_service(
                name.clone(),
                PoolWorker {
                    name: name.clone(),
                    processed: Arc::clone(&processed),
                    fail_after,
                },
                SpawnOptions::default(),
            )
            .await?;
        system.update_service_health(&name, ServiceStatus::Healthy)?;
        processed_counts.push((name, processed));
    }
    println!("worker pool ready with 3 workers\n");

    println!("Processing 10 tasks with load balancing...");
    for task_id in 1..=10u32 {
        let candidates = system.discover_services(&ServiceQuery::default());
        let instance = match balancer.select("worker-pool", &candidates) {
            Ok(instance) => instance,
            Err(e) => {
                println!("  task {task_id} dropped: {e}");
                continue;
            }
        };

        let result = system
            .call(
                caller,
                instance.actor_id,
                MessageType::Request,
                Bytes::from(task_id.to_string()),
                Duration::from_secs(1),
            )
            .await;

        match result {
            Ok(response) => println!("  task {task_id} -> {}", String::from_utf8_lossy(&response)),
            Err(e) => {
                println!("  task {task_id} failed on {}: {e}", instance.name);
                system.update_service_health(&instance.name, ServiceStatus::Unhealthy)?;
            }
        }
    }

    println!("\n=== Worker Pool Statistics ===");
    for (name, processed) in &processed_counts {
        println!("{name}: {} tasks processed", processed.load(Ordering::Relaxed));
    }

    system.shutdown().await?;
    println!("\n=== Example Complete ===");
    Ok(())
}
