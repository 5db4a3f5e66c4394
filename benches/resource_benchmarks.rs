//! Resource Usage Benchmarks
//!
//! Measures baseline resource consumption:
//! - Memory footprint per actor (incremental: 1 → 10 → 50)
//! - Memory comparison: bounded vs unbounded mailboxes

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

// Layer 1: Standard library imports
use std::fmt;
use std::hint::black_box;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use bytes::Bytes;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

// Layer 3: Internal module imports
use orbit_rt::actor::{Actor, ActorContext};
use orbit_rt::mailbox::{AtomicMetrics, BoundedMailbox, UnboundedMailbox};
use orbit_rt::message::Message;
use orbit_rt::system::{ActorSystem, SpawnOptions, SystemConfig};

#[derive(Debug)]
struct BenchError;

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BenchError")
    }
}

impl std::error::Error for BenchError {}

struct TestActor {
    state: u64,
}

impl TestActor {
    fn new() -> Self {
        Self { state: 0 }
    }
}

#[async_trait]
impl Actor for TestActor {
    type Error = BenchError;

    async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
        self.state += 1;
        Ok(message.payload)
    }
}

/// Benchmark: memory footprint as actor count scales (1, 10, 50 on one system).
fn memory_per_actor_baseline(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("memory_per_actor");

    for actor_count in [1, 10, 50] {
        group.bench_with_input(
            BenchmarkId::from_parameter(actor_count),
            &actor_count,
            |b, &count| {
                b.to_async(&rt).iter(|| async move {
                    let system = ActorSystem::new(SystemConfig::default());
                    let mut refs = Vec::with_capacity(count);
                    for _ in 0..count {
                        let actor_ref = system
                            .new_actor(TestActor::new(), SpawnOptions::default())
                            .await
                            .expect("spawn should succeed");
                        refs.push(actor_ref);
                    }
                    black_box(refs);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: bounded vs unbounded mailbox construction cost.
fn mailbox_memory_comparison(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("mailbox_memory");

    group.bench_function("bounded_mailbox_100", |b| {
        b.to_async(&rt).iter(|| async {
            let mailboxes: Vec<_> = (0..10)
                .map(|_| BoundedMailbox::<AtomicMetrics>::new(100))
                .collect();

            black_box(mailboxes);
        });
    });

    group.bench_function("unbounded_mailbox", |b| {
        b.to_async(&rt).iter(|| async {
            let mailboxes: Vec<_> = (0..10).map(|_| UnboundedMailbox::new()).collect();

            black_box(mailboxes);
        });
    });

    group.finish();
}

/// Configure criterion for resource-conscious benchmarking
fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2))
        .without_plots()
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets =
        memory_per_actor_baseline,
        mailbox_memory_comparison
}

criterion_main!(benches);
