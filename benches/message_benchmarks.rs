//! Message Passing Benchmarks
//!
//! Measures baseline performance of message routing and delivery:
//! - Point-to-point message delivery latency via the router
//! - Sustained message throughput
//! - Fan-out to multiple mailboxes (10 actors)
//! - Mailbox enqueue/dequeue operations

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

// Layer 1: Standard library imports
use std::hint::black_box;
use std::time::Duration;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use criterion::{criterion_group, criterion_main, Criterion};

// Layer 3: Internal module imports
use orbit_rt::mailbox::{AtomicMetrics, BoundedMailbox, MailboxReceiver, MailboxSender};
use orbit_rt::message::{Message, MessageType};
use orbit_rt::router::Router;
use orbit_rt::util::{ActorId, SessionId};

fn test_message(target: ActorId) -> Message {
    Message::new(
        MessageType::Text,
        ActorId::next(),
        target,
        SessionId::NONE,
        Bytes::from_static(b"payload"),
    )
}

/// Benchmark: point-to-point delivery through the router.
fn message_send_receive(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("message_send_receive", |b| {
        b.to_async(&rt).iter(|| async {
            let router = Router::new();
            let (mailbox, sender) = BoundedMailbox::<AtomicMetrics>::new(16);
            let actor_id = ActorId::next();
            router.register(actor_id, sender).unwrap();

            router.deliver(test_message(actor_id)).await.unwrap();

            let mut mailbox = mailbox;
            let received = mailbox.recv().await;

            black_box(received);
        });
    });
}

/// Benchmark: sustained message throughput through a single mailbox.
fn message_throughput(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("message_throughput", |b| {
        b.to_async(&rt).iter(|| async {
            let router = Router::new();
            let (mut mailbox, sender) = BoundedMailbox::<AtomicMetrics>::new(200);
            let actor_id = ActorId::next();
            router.register(actor_id, sender).unwrap();

            for _ in 0..100 {
                router.deliver(test_message(actor_id)).await.unwrap();
            }

            let mut count = 0;
            while count < 100 {
                if mailbox.recv().await.is_some() {
                    count += 1;
                }
            }

            black_box(count);
        });
    });
}

/// Benchmark: fan-out delivery to 10 mailboxes.
fn message_broadcast_small(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("message_broadcast_small", |b| {
        b.to_async(&rt).iter(|| async {
            let router = Router::new();
            let mut mailboxes = Vec::with_capacity(10);
            let mut actor_ids = Vec::with_capacity(10);
            for _ in 0..10 {
                let (mailbox, sender) = BoundedMailbox::<AtomicMetrics>::new(4);
                let actor_id = ActorId::next();
                router.register(actor_id, sender).unwrap();
                mailboxes.push(mailbox);
                actor_ids.push(actor_id);
            }

            for &actor_id in &actor_ids {
                router.deliver(test_message(actor_id)).await.unwrap();
            }

            for mailbox in &mut mailboxes {
                let _ = mailbox.recv().await;
            }

            black_box(mailboxes);
        });
    });
}

/// Benchmark: direct mailbox enqueue/dequeue, bypassing the router.
fn mailbox_operations(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("mailbox_operations", |b| {
        b.to_async(&rt).iter(|| async {
            let (mut mailbox, sender) = BoundedMailbox::<AtomicMetrics>::new(1000);
            let actor_id = ActorId::next();

            for _ in 0..100 {
                sender.send(test_message(actor_id)).await.unwrap();
            }

            for _ in 0..100 {
                let _ = mailbox.recv().await;
            }

            black_box((mailbox, sender));
        });
    });
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
        message_send_receive,
        message_throughput,
        message_broadcast_small,
        mailbox_operations
}

criterion_main!(benches);
