//! End-to-end single-process scenarios: named service discovery, name
//! collision handling, and session timeout cleanup.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use orbit_rt::{Actor, ActorContext, ActorSystem, Message, MessageType, SpawnOptions, SystemConfig};

#[derive(Debug)]
struct ScenarioError(String);

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ScenarioError {}

struct EchoActor;

#[async_trait]
impl Actor for EchoActor {
    type Error = ScenarioError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        Ok(message.payload)
    }
}

struct CounterActor {
    calls: u32,
}

#[async_trait]
impl Actor for CounterActor {
    type Error = ScenarioError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        self.calls += 1;
        Ok(message.payload)
    }
}

struct SlowActor;

#[async_trait]
impl Actor for SlowActor {
    type Error = ScenarioError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(message.payload)
    }
}

#[tokio::test]
async fn single_node_echo() {
    let system = ActorSystem::new(SystemConfig::default());
    system
        .new_service("self", CounterActor { calls: 0 }, SpawnOptions::default())
        .await
        .unwrap();
    system
        .new_service("echo", EchoActor, SpawnOptions::default())
        .await
        .unwrap();

    let reply = system
        .call_by_name("self", "echo", MessageType::Request, Bytes::from_static(b"hi"), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(reply, Bytes::from_static(b"hi"));
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn name_collision_leaves_original_serving() {
    let system = ActorSystem::new(SystemConfig::default());
    system
        .new_service("self", CounterActor { calls: 0 }, SpawnOptions::default())
        .await
        .unwrap();
    system
        .new_service("db", CounterActor { calls: 0 }, SpawnOptions::default())
        .await
        .unwrap();

    let collision = system
        .new_service("db", CounterActor { calls: 0 }, SpawnOptions::default())
        .await;
    assert!(collision.is_err());

    let reply = system
        .call_by_name("self", "db", MessageType::Request, Bytes::from_static(b"still alive"), Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(reply, Bytes::from_static(b"still alive"));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn session_timeout_is_cleaned_up() {
    let system = ActorSystem::new(SystemConfig::default());
    system
        .new_service("self", CounterActor { calls: 0 }, SpawnOptions::default())
        .await
        .unwrap();
    system
        .new_service("slow", SlowActor, SpawnOptions::default())
        .await
        .unwrap();

    let result = system
        .call_by_name(
            "self",
            "slow",
            MessageType::Request,
            Bytes::from_static(b"wait"),
            Duration::from_millis(100),
        )
        .await;
    assert!(result.is_err());

    // The session was cleaned up on timeout, so a fresh call against a
    // different target still succeeds instead of hanging on stale state.
    system
        .new_service("echo", EchoActor, SpawnOptions::default())
        .await
        .unwrap();
    let reply = system
        .call_by_name("self", "echo", MessageType::Request, Bytes::from_static(b"ok"), Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(reply, Bytes::from_static(b"ok"));

    system.shutdown().await.unwrap();
}
