//! Event Processing Pipeline
//!
//! Three actors chained by address: an ingest actor forwards each event to a
//! transform actor, which enriches it and forwards to an output actor that
//! logs the final result. Each stage reports lifecycle events to a shared
//! `InMemoryMonitor<ActorEvent>` so the whole pipeline's activity can be
//! inspected from one place.
//!
//! Run with: cargo run --bin event_pipeline (plain reference code, not wired
//! into Cargo.toml).

use orbit_rt::monitoring::{ActorEvent, ActorEventKind, InMemoryMonitor, Monitor, MonitoringConfig};
use orbit_rt::{Actor, ActorContext, ActorSystem, Message, MessageType, SpawnOptions, SystemConfig};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct StageError(String);

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage error: {}", self.0)
    }
}

impl std::error::Error for StageError {}

struct IngestStage {
    transform: orbit_rt::util::ActorId,
    received: u32,
}

#[async_trait]
impl Actor for IngestStage {
    type Error = StageError;

    async fn handle(&mut self, message: Message, ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        self.received += 1;
        println!("[ingest] received: {}", String::from_utf8_lossy(&message.payload));
        ctx.send(self.transform, MessageType::Text, message.payload)
            .await
            .map_err(|e| StageError(e.to_string()))?;
        Ok(Bytes::new())
    }
}

struct TransformStage {
    output: orbit_rt::util::ActorId,
    processed: u32,
}

#[async_trait]
impl Actor for TransformStage {
    type Error = StageError;

    async fn handle(&mut self, message: Message, ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        self.processed += 1;
        let enriched = format!("{{\"enriched\":true,\"payload\":\"{}\"}}", String::from_utf8_lossy(&message.payload));
        println!("[transform] enriching: {enriched}");
        ctx.send(self.output, MessageType::Text, enriched)
            .await
            .map_err(|e| StageError(e.to_string()))?;
        Ok(Bytes::new())
    }
}

struct OutputStage {
    persisted: u32,
}

#[async_trait]
impl Actor for OutputStage {
    type Error = StageError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        self.persisted += 1;
        println!("[output] persisted: {}", String::from_utf8_lossy(&message.payload));
        Ok(Bytes::new())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Event Pipeline Example ===\n");

    let monitor = Arc::new(InMemoryMonitor::<ActorEvent>::new(MonitoringConfig::default()));
    let system = ActorSystem::new(SystemConfig::default());
    let caller = orbit_rt::util::ActorId::next();

    let output_ref = system
        .new_actor(OutputStage { persisted: 0 }, SpawnOptions::default())
        .await?;
    monitor
        .record(ActorEvent {
            timestamp: chrono::Utc::now(),
            actor_id: output_ref.actor_id(),
            event_kind: ActorEventKind::Spawned,
            metadata: HashMap::new(),
        })
        .await?;

    let transform_ref = system
        .new_actor(
            TransformStage {
                output: output_ref.actor_id(),
                processed: 0,
            },
            SpawnOptions::default(),
        )
        .await?;
    monitor
        .record(ActorEvent {
            timestamp: chrono::Utc::now(),
            actor_id: transform_ref.actor_id(),
            event_kind: ActorEventKind::Spawned,
            metadata: HashMap::new(),
        })
        .await?;

    let ingest_ref = system
        .new_actor(
            IngestStage {
                transform: transform_ref.actor_id(),
                received: 0,
            },
            SpawnOptions::default(),
        )
        .await?;
    monitor
        .record(ActorEvent {
            timestamp: chrono::Utc::now(),
            actor_id: ingest_ref.actor_id(),
            event_kind: ActorEventKind::Spawned,
            metadata: HashMap::new(),
        })
        .await?;

    println!("pipeline ready with 3 stages\n");

    for i in 1..=5 {
        system
            .send(
                caller,
                ingest_ref.actor_id(),
                MessageType::Text,
                Bytes::from(format!("event_{i}")),
            )
            .await?;
    }

    tokio::time::sleep(Duration::from_millis(100)).await;

    let snapshot = monitor.snapshot().await?;
    println!("\n=== Pipeline Statistics ===");
    println!("stages spawned (monitored): {}", snapshot.total_events);

    system.shutdown().await?;
    println!("\n=== Event Pipeline Example Complete ===");
    Ok(())
}
