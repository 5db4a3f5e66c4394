//! Actor Development Patterns Example
//!
//! Demonstrates patterns for a single actor with richer internal state:
//! - Command/query/event message shapes multiplexed over one JSON payload
//! - A circuit breaker guarding a simulated capacity limit
//! - Propagating handler failures back to the caller via `call`
//!
//! Run with: cargo run --bin actor_patterns (plain reference code, not wired
//! into Cargo.toml).

use orbit_rt::{Actor, ActorContext, ActorSystem, Message, MessageType, SpawnOptions, SystemConfig};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize, Deserialize)]
enum CacheCommand {
    Set { key: String, value: String },
    Delete { key: String },
    Clear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum CacheQuery {
    Get { key: String },
    Stats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum CacheRequest {
    Command(CacheCommand),
    Query(CacheQuery),
}

struct CacheActor {
    cache: HashMap<String, String>,
    hits: u64,
    misses: u64,
    breaker: CircuitBreaker,
}

struct CircuitBreaker {
    state: BreakerState,
    failure_count: u32,
    threshold: u32,
    timeout: Duration,
    last_failure: Option<Instant>,
}

enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitBreaker {
    fn new(threshold: u32, timeout: Duration) -> Self {
        Self {
            state: BreakerState::Closed,
            failure_count: 0,
            threshold,
            timeout,
            last_failure: None,
        }
    }

    fn should_attempt(&mut self) -> bool {
        match self.state {
            BreakerState::Closed => true,
            BreakerState::Open => {
                if let Some(last) = self.last_failure {
                    if last.elapsed() > self.timeout {
                        self.state = BreakerState::HalfOpen;
                        true
                    } else {
                        false
                    }
                } else {
                    false
                }
            }
            BreakerState::HalfOpen => true,
        }
    }

    fn on_success(&mut self) {
        self.failure_count = 0;
        self.state = BreakerState::Closed;
    }

    fn on_failure(&mut self) {
        self.failure_count += 1;
        self.last_failure = Some(Instant::now());
        if self.failure_count >= self.threshold {
            self.state = BreakerState::Open;
        }
    }
}

#[derive(Debug)]
enum CacheError {
    StorageFull,
    BreakerOpen,
    Decode(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::StorageFull => write!(f, "cache storage full"),
            CacheError::BreakerOpen => write!(f, "circuit breaker open"),
            CacheError::Decode(reason) => write!(f, "malformed request: {reason}"),
        }
    }
}

impl std::error::Error for CacheError {}

#[async_trait]
impl Actor for CacheActor {
    type Error = CacheError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        if !self.breaker.should_attempt() {
            return Err(CacheError::BreakerOpen);
        }

        let request: CacheRequest = serde_json::from_slice(&message.payload)
            .map_err(|e| CacheError::Decode(e.to_string()))?;

        match request {
            CacheRequest::Command(cmd) => self.handle_command(cmd),
            CacheRequest::Query(query) => self.handle_query(query),
        }
    }

    async fn on_stop(&mut self, _ctx: &ActorContext) -> Result<(), Self::Error> {
        println!(
            "cache stopped: {} entries, {} hits, {} misses",
            self.cache.len(),
            self.hits,
            self.misses
        );
        Ok(())
    }
}

impl CacheActor {
    fn new() -> Self {
        Self {
            cache: HashMap::new(),
            hits: 0,
            misses: 0,
            breaker: CircuitBreaker::new(3, Duration::from_secs(5)),
        }
    }

    fn handle_command(&mut self, cmd: CacheCommand) -> Result<Bytes, CacheError> {
        match cmd {
            CacheCommand::Set { key, value } => {
                if self.cache.len() >= 100 {
                    self.breaker.on_failure();
                    return Err(CacheError::StorageFull);
                }
                self.cache.insert(key.clone(), value.clone());
                self.breaker.on_success();
                println!("set '{key}' = '{value}'");
                Ok(Bytes::new())
            }
            CacheCommand::Delete { key } => {
                let removed = self.cache.remove(&key).is_some();
                self.breaker.on_success();
                println!("delete '{key}': {removed}");
                Ok(Bytes::new())
            }
            CacheCommand::Clear => {
                let count = self.cache.len();
                self.cache.clear();
                self.hits = 0;
                self.misses = 0;
                self.breaker.on_success();
                println!("cleared {count} entries");
                Ok(Bytes::new())
            }
        }
    }

    fn handle_query(&mut self, query: CacheQuery) -> Result<Bytes, CacheError> {
        match query {
            CacheQuery::Get { key } => {
                let value = self.cache.get(&key).cloned();
                if value.is_some() {
                    self.hits += 1;
                } else {
                    self.misses += 1;
                }
                Ok(Bytes::from(value.unwrap_or_default()))
            }
            CacheQuery::Stats => {
                let stats = format!(
                    "{{\"entries\":{},\"hits\":{},\"misses\":{}}}",
                    self.cache.len(),
                    self.hits,
                    self.misses
                );
                Ok(Bytes::from(stats))
            }
        }
    }
}

async fn send_command(
    system: &ActorSystem,
    caller: orbit_rt::util::ActorId,
    target: orbit_rt::util::ActorId,
    cmd: CacheCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = serde_json::to_vec(&CacheRequest::Command(cmd))?;
    system
        .call(
            caller,
            target,
            MessageType::Request,
            Bytes::from(payload),
            Duration::from_secs(1),
        )
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Actor Patterns Example ===\n");

    let system = ActorSystem::new(SystemConfig::default());
    let caller = orbit_rt::util::ActorId::next();
    let actor_ref = system
        .new_actor(CacheActor::new(), SpawnOptions::default())
        .await?;
    let target = actor_ref.actor_id();

    println!("1. Command pattern:");
    send_command(
        &system,
        caller,
        target,
        CacheCommand::Set {
            key: "name".to_string(),
            value: "orbit".to_string(),
        },
    )
    .await?;

    println!("\n2. Query pattern:");
    let payload = serde_json::to_vec(&CacheRequest::Query(CacheQuery::Get {
        key: "name".to_string(),
    }))?;
    let response = system
        .call(
            caller,
            target,
            MessageType::Request,
            Bytes::from(payload),
            Duration::from_secs(1),
        )
        .await?;
    println!("got: {}", String::from_utf8_lossy(&response));

    println!("\n3. Circuit breaker under simulated overload:");
    for i in 0..105 {
        let result = send_command(
            &system,
            caller,
            target,
            CacheCommand::Set {
                key: format!("key{i}"),
                value: "value".to_string(),
            },
        )
        .await;
        if let Err(e) = result {
            println!("rejected at key{i}: {e}");
        }
    }

    system.shutdown().await?;
    println!("\n=== Example Complete ===");
    Ok(())
}
