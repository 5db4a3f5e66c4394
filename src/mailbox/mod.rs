//! Mailbox system for actor message queuing with backpressure control.
//!
//! This module provides high-performance mailbox infrastructure for actor message queuing,
//! with configurable capacity limits, backpressure strategies, and comprehensive metrics
//! tracking for observability and system tuning.
//!
//! # Components
//!
//! - [`MailboxReceiver`] - Trait for receiving messages from mailbox
//! - [`MailboxSender`] - Trait for sending messages to mailbox
//! - [`BoundedMailbox`] - Fixed-capacity mailbox with backpressure
//! - [`UnboundedMailbox`] - Unlimited-capacity mailbox (use with caution)
//! - [`BackpressureStrategy`] - Flow control strategies (Block, Drop, Error)
//! - [`MetricsRecorder`] - Message queue metrics tracking
//!
//! # Design Philosophy
//!
//! - **Single message type**: every mailbox carries the same concrete
//!   [`Message`](crate::message::Message); generics are reserved for the metrics recorder.
//! - **Backpressure control**: prevent unbounded memory growth.
//! - **Observability**: comprehensive metrics for queue depth, throughput, and drops.
//!
//! # Bounded vs Unbounded Mailboxes
//!
//! ## Bounded Mailbox (Recommended)
//!
//! Fixed capacity with backpressure control:
//! - **Memory safety**: Prevents unbounded memory growth
//! - **Backpressure**: Configurable strategies (block, drop, reject)
//! - **Use case**: Production systems, resource-constrained environments
//!
//! ## Unbounded Mailbox (Use with Caution)
//!
//! Unlimited capacity without backpressure:
//! - **Risk**: Can cause out-of-memory if producers overwhelm consumers
//! - **Use case**: Development, testing, guaranteed low-volume scenarios
//!
//! # Backpressure Strategies
//!
//! ## Block Strategy (Default for Critical/High priority)
//! Sender waits until the mailbox has capacity. Guarantees delivery but may
//! stall the sender if the receiver is slow.
//!
//! ## Drop Strategy (Low priority)
//! Drop the incoming message if the mailbox is full. Non-blocking, used for
//! best-effort, high-volume traffic.
//!
//! ## Error Strategy (Normal priority, default)
//! Return an error immediately if the mailbox is full so the caller can
//! decide how to back off.

pub mod backpressure;
pub mod bounded;
pub mod metrics;
pub mod traits;
pub mod unbounded;

pub use backpressure::BackpressureStrategy;
pub use bounded::{BoundedMailbox, BoundedMailboxSender};
pub use metrics::{AtomicMetrics, MetricsRecorder};
pub use traits::{MailboxCapacity, MailboxError, MailboxReceiver, MailboxSender, TryRecvError};
pub use unbounded::{UnboundedMailbox, UnboundedMailboxSender};
