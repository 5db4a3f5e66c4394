//! Actor Lifecycle and State Transitions
//!
//! Demonstrates the actor state machine: Idle (waiting) → Running (handler in
//! flight) → Idle, and finally Stopping → Stopped once `stop()` is called.
//! There is no restart here: a handler error is returned to the caller (via
//! `call`) or dropped (via `send`) and the actor keeps running — this runtime
//! has no supervision tree, so recovery is the caller's responsibility.
//!
//! Run with: cargo run --bin actor_lifecycle (plain reference code, not wired
//! into Cargo.toml).

use orbit_rt::{Actor, ActorContext, ActorSystem, Message, MessageType, SpawnOptions, SystemConfig};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;

struct WorkerActor {
    processed: u32,
}

#[derive(Debug)]
struct WorkerError {
    reason: String,
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerError: {}", self.reason)
    }
}

impl std::error::Error for WorkerError {}

#[async_trait]
impl Actor for WorkerActor {
    type Error = WorkerError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        let should_fail = message.payload.as_ref() == b"fail";
        if should_fail {
            return Err(WorkerError {
                reason: "work item failed".to_string(),
            });
        }

        self.processed += 1;
        println!("[worker] processed {} items", self.processed);
        Ok(Bytes::new())
    }

    async fn on_start(&mut self, _ctx: &ActorContext) -> Result<(), Self::Error> {
        println!("[worker] starting");
        Ok(())
    }

    async fn on_stop(&mut self, _ctx: &ActorContext) -> Result<(), Self::Error> {
        println!("[worker] stopped after processing {} items", self.processed);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Actor Lifecycle Example ===");

    let system = ActorSystem::new(SystemConfig::default());
    let caller = orbit_rt::util::ActorId::next();

    let actor_ref = system
        .new_actor(WorkerActor { processed: 0 }, SpawnOptions::default())
        .await?;

    println!("state before any message: {:?}", actor_ref.stats().state);

    for payload in [&b"ok"[..], b"fail", b"ok", b"fail", b"ok"] {
        let result = system
            .call(
                caller,
                actor_ref.actor_id(),
                MessageType::Request,
                Bytes::from_static(payload),
                Duration::from_secs(1),
            )
            .await;

        match result {
            Ok(_) => println!("call succeeded"),
            Err(e) => println!("call failed (actor stays alive): {e}"),
        }
    }

    let stats = actor_ref.stats();
    println!("\nfinal state: {:?}", stats.state);
    println!("messages processed (including failures): {}", stats.processed);

    system.shutdown().await?;
    println!("\n=== Example Complete ===");
    Ok(())
}
