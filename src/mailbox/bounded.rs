// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::backpressure::BackpressureStrategy;
use super::metrics::{AtomicMetrics, MetricsRecorder};
use super::traits::{MailboxCapacity, MailboxError, MailboxReceiver, MailboxSender, TryRecvError};
use crate::message::Message;

/// Bounded mailbox with configurable capacity and backpressure handling.
///
/// `BoundedMailbox` uses a tokio mpsc channel for async message passing
/// with a fixed maximum capacity. When the mailbox is full, the configured
/// backpressure strategy determines how new messages are handled.
///
/// # Type Parameters
///
/// * `R` - The metrics recorder implementing [`MetricsRecorder`] (default: [`AtomicMetrics`])
pub struct BoundedMailbox<R: MetricsRecorder = AtomicMetrics> {
    receiver: mpsc::Receiver<Message>,
    capacity: usize,
    pub metrics: Arc<R>,
}

/// Sender for bounded mailbox with backpressure support.
#[derive(Clone)]
pub struct BoundedMailboxSender<R: MetricsRecorder = AtomicMetrics> {
    sender: mpsc::Sender<Message>,
    backpressure_strategy: Arc<BackpressureStrategy>,
    capacity: usize,
    pub metrics: Arc<R>,
}

impl<R: MetricsRecorder> BoundedMailbox<R> {
    /// Create a new bounded mailbox with custom metrics recorder.
    pub fn with_metrics(capacity: usize, metrics: R) -> (Self, BoundedMailboxSender<R>) {
        Self::with_backpressure_and_metrics(capacity, BackpressureStrategy::Error, metrics)
    }

    /// Create a bounded mailbox with a custom backpressure strategy and metrics recorder.
    pub fn with_backpressure_and_metrics(
        capacity: usize,
        strategy: BackpressureStrategy,
        metrics: R,
    ) -> (Self, BoundedMailboxSender<R>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let metrics = Arc::new(metrics);

        let mailbox = Self {
            receiver,
            capacity,
            metrics: Arc::clone(&metrics),
        };

        let sender = BoundedMailboxSender {
            sender,
            backpressure_strategy: Arc::new(strategy),
            capacity,
            metrics,
        };

        (mailbox, sender)
    }
}

// Convenience constructors for AtomicMetrics (common case)
impl BoundedMailbox<AtomicMetrics> {
    /// Create a new bounded mailbox with the default backpressure strategy and `AtomicMetrics`.
    pub fn new(capacity: usize) -> (Self, BoundedMailboxSender<AtomicMetrics>) {
        Self::with_metrics(capacity, AtomicMetrics::new())
    }

    /// Create a bounded mailbox with a custom backpressure strategy and `AtomicMetrics`.
    pub fn with_backpressure(
        capacity: usize,
        strategy: BackpressureStrategy,
    ) -> (Self, BoundedMailboxSender<AtomicMetrics>) {
        Self::with_backpressure_and_metrics(capacity, strategy, AtomicMetrics::new())
    }
}

#[async_trait]
impl<R: MetricsRecorder> MailboxReceiver for BoundedMailbox<R> {
    type Error = MailboxError;

    async fn recv(&mut self) -> Option<Message> {
        let message = self.receiver.recv().await?;
        self.metrics.record_received();
        self.metrics.update_last_message(chrono::Utc::now());
        Some(message)
    }

    fn try_recv(&mut self) -> Result<Message, TryRecvError> {
        match self.receiver.try_recv() {
            Ok(message) => {
                self.metrics.record_received();
                self.metrics.update_last_message(chrono::Utc::now());
                Ok(message)
            }
            Err(mpsc::error::TryRecvError::Empty) => Err(TryRecvError::Empty),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TryRecvError::Closed),
        }
    }

    fn capacity(&self) -> MailboxCapacity {
        MailboxCapacity::Bounded(self.capacity)
    }

    fn len(&self) -> usize {
        self.metrics.in_flight() as usize
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<R: MetricsRecorder + Clone> MailboxSender for BoundedMailboxSender<R> {
    type Error = MailboxError;

    async fn send(&self, message: Message) -> Result<(), Self::Error> {
        self.backpressure_strategy.apply(&self.sender, message).await?;
        self.metrics.record_sent();
        Ok(())
    }

    fn try_send(&self, message: Message) -> Result<(), Self::Error> {
        self.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => MailboxError::Full {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(_) => MailboxError::Closed,
        })?;

        self.metrics.record_sent();
        Ok(())
    }
}
