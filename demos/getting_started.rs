//! Getting Started - Your First Actor
//!
//! Builds a small counter actor, spawns it, and drives it through a few
//! fire-and-forget messages and a request/response call.
//!
//! Run with: cargo run --bin getting_started (or include it as a binary
//! target; it is plain reference code, not wired into Cargo.toml).

use orbit_rt::prelude::*;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
struct CounterError(String);

impl fmt::Display for CounterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "counter error: {}", self.0)
    }
}

impl std::error::Error for CounterError {}

struct CounterActor {
    value: i64,
}

#[async_trait]
impl Actor for CounterActor {
    type Error = CounterError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        match message.message_type {
            MessageType::Request => {
                self.value += 1;
                Ok(Bytes::from(self.value.to_string()))
            }
            MessageType::Text => {
                self.value -= 1;
                Ok(Bytes::new())
            }
            other => Err(CounterError(format!("unexpected message type: {other:?}"))),
        }
    }

    async fn on_start(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        println!("counter actor {:?} starting", ctx.actor_id());
        Ok(())
    }

    async fn on_stop(&mut self, ctx: &ActorContext) -> Result<(), Self::Error> {
        println!("counter actor {:?} stopped at {}", ctx.actor_id(), self.value);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let system = ActorSystem::new(SystemConfig::default());
    let caller = ActorId::next();

    let actor_ref = system
        .new_actor(CounterActor { value: 0 }, SpawnOptions::default())
        .await?;

    system
        .send(caller, actor_ref.actor_id(), MessageType::Text, Bytes::new())
        .await?;

    let response = system
        .call(
            caller,
            actor_ref.actor_id(),
            MessageType::Request,
            Bytes::new(),
            Duration::from_secs(1),
        )
        .await?;

    println!("counter replied: {}", String::from_utf8_lossy(&response));

    system.shutdown().await?;
    Ok(())
}
