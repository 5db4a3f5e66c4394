//! Basic Actor Example - Core Actor Trait Fundamentals
//!
//! Demonstrates the actor lifecycle hooks and sequential message handling
//! through a counter actor with a boundary condition.
//!
//! # Key Concepts
//!
//! **Actor trait**: `handle` processes one message at a time; `on_start`/
//! `on_stop` are optional lifecycle hooks with default no-op bodies.
//!
//! Run with: cargo run --bin actor_basic (plain reference code, not wired
//! into Cargo.toml).

use orbit_rt::{Actor, ActorContext, ActorSystem, Message, MessageType, SpawnOptions, SystemConfig};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

struct CounterActor {
    value: i32,
    max_value: i32,
}

#[derive(Debug)]
struct CounterError {
    message: String,
}

impl fmt::Display for CounterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CounterError: {}", self.message)
    }
}

impl std::error::Error for CounterError {}

#[async_trait]
impl Actor for CounterActor {
    type Error = CounterError;

    async fn handle(&mut self, message: Message, ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        let delta: i32 = String::from_utf8_lossy(&message.payload)
            .parse()
            .unwrap_or(0);
        self.value += delta;

        if self.value > self.max_value {
            return Err(CounterError {
                message: format!("value {} exceeds maximum {}", self.value, self.max_value),
            });
        }

        println!("[actor {:?}] new value: {}", ctx.actor_id(), self.value);
        Ok(Bytes::from(self.value.to_string()))
    }

    async fn on_start(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        println!("[actor {:?}] starting with initial value: {}", ctx.actor_id(), self.value);
        Ok(())
    }

    async fn on_stop(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        println!("[actor {:?}] stopping with final value: {}", ctx.actor_id(), self.value);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Basic Actor Example ===\n");

    let system = ActorSystem::new(SystemConfig::default());
    let caller = orbit_rt::util::ActorId::next();

    let actor_ref = system
        .new_actor(
            CounterActor {
                value: 0,
                max_value: 100,
            },
            SpawnOptions::default(),
        )
        .await?;

    for delta in [10, 20, 15] {
        system
            .send(
                caller,
                actor_ref.actor_id(),
                MessageType::Text,
                Bytes::from(delta.to_string()),
            )
            .await?;
    }

    system.shutdown().await?;
    println!("\n=== Example Complete ===");
    Ok(())
}
