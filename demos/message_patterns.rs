//! Message Passing Patterns Examples
//!
//! 1. Small message design (tiny payloads, low send latency)
//! 2. Zero-copy sharing via `bytes::Bytes` (refcounted, cheap to clone)
//! 3. Message batching inside a single actor
//!
//! Run with: cargo run --bin message_patterns (plain reference code, not
//! wired into Cargo.toml).

use orbit_rt::{Actor, ActorContext, ActorSystem, Message, MessageType, SpawnOptions, SystemConfig};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug)]
struct DemoError(String);

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DemoError {}

struct Counter {
    count: i32,
    name: String,
}

#[async_trait]
impl Actor for Counter {
    type Error = DemoError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        match message.payload.as_ref() {
            b"inc" => self.count += 1,
            b"dec" => self.count -= 1,
            b"reset" => self.count = 0,
            other => return Err(DemoError(format!("unknown op: {:?}", other))),
        }
        println!("[{}] now at {}", self.name, self.count);
        Ok(Bytes::new())
    }
}

struct DataProcessor {
    name: String,
    processed_count: usize,
}

#[async_trait]
impl Actor for DataProcessor {
    type Error = DemoError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        self.processed_count += 1;
        println!(
            "[{}] processed {} bytes (total: {})",
            self.name,
            message.payload.len(),
            self.processed_count
        );
        sleep(Duration::from_millis(10)).await;
        Ok(Bytes::new())
    }
}

struct BatchProcessor {
    name: String,
    batch: Vec<Bytes>,
    batch_size: usize,
    batches_processed: usize,
}

#[async_trait]
impl Actor for BatchProcessor {
    type Error = DemoError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        match message.message_type {
            MessageType::System => self.flush().await,
            _ => {
                self.batch.push(message.payload);
                if self.batch.len() >= self.batch_size {
                    self.flush().await;
                }
            }
        }
        Ok(Bytes::new())
    }
}

impl BatchProcessor {
    async fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        self.batches_processed += 1;
        println!(
            "[{}] processing batch #{} with {} items",
            self.name,
            self.batches_processed,
            self.batch.len()
        );
        sleep(Duration::from_millis(50)).await;
        self.batch.clear();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Message Passing Patterns Examples ===\n");

    let system = ActorSystem::new(SystemConfig::default());
    let caller = orbit_rt::util::ActorId::next();

    println!("--- Example 1: Small Message Design ---");
    let counter_ref = system
        .new_actor(
            Counter {
                count: 0,
                name: "MainCounter".to_string(),
            },
            SpawnOptions::default(),
        )
        .await?;
    for op in ["inc", "inc", "inc", "dec", "reset"] {
        system
            .send(caller, counter_ref.actor_id(), MessageType::Text, Bytes::from_static(op.as_bytes()))
            .await?;
    }
    println!();

    println!("--- Example 2: Zero-Copy Sharing via Bytes ---");
    let processor_ref = system
        .new_actor(
            DataProcessor {
                name: "DataProcessor".to_string(),
                processed_count: 0,
            },
            SpawnOptions::default(),
        )
        .await?;

    let large_data = Bytes::from(vec![0u8; 1_000_000]);
    println!("created 1MB buffer, sending two references to it (no copy)");
    system
        .send(caller, processor_ref.actor_id(), MessageType::Text, large_data.clone())
        .await?;
    system
        .send(caller, processor_ref.actor_id(), MessageType::Text, large_data.clone())
        .await?;
    println!();

    println!("--- Example 3: Message Batching ---");
    let batch_ref = system
        .new_actor(
            BatchProcessor {
                name: "BatchProc".to_string(),
                batch: Vec::with_capacity(5),
                batch_size: 5,
                batches_processed: 0,
            },
            SpawnOptions::default(),
        )
        .await?;

    for i in 1..=12 {
        system
            .send(
                caller,
                batch_ref.actor_id(),
                MessageType::Text,
                Bytes::from(format!("item-{i}")),
            )
            .await?;
        sleep(Duration::from_millis(5)).await;
    }
    sleep(Duration::from_millis(100)).await;
    system
        .send(caller, batch_ref.actor_id(), MessageType::System, Bytes::new())
        .await?;

    sleep(Duration::from_millis(100)).await;
    system.shutdown().await?;
    println!("\n=== Example Complete ===");
    Ok(())
}
