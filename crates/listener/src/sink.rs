use subscription::{Delivery, EventSink};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Emits one structured log event per delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn accept(&self, delivery: Delivery) {
        info!(
            delivery_id = %delivery.id,
            event_type = delivery.payload.event_type().unwrap_or("unknown"),
            app_id = delivery.payload.app_id(),
            peer = ?delivery.peer,
            received_at = %delivery.received_at,
            payload = %delivery.payload,
            "event received"
        );
    }
}

/// Forwards deliveries into an unbounded channel for a downstream consumer.
///
/// Meant for tests and in-process consumers that keep up with the listener.
/// A stalled consumer grows the queue without limit; use [`BoundedChannelSink`]
/// when the consumer may fall behind.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl ChannelSink {
    /// Creates a sink and the receiver its deliveries arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn accept(&self, delivery: Delivery) {
        if let Err(mpsc::error::SendError(dropped)) = self.tx.send(delivery) {
            warn!(delivery_id = %dropped.id, "event consumer gone; dropping delivery");
        }
    }
}

/// Forwards deliveries into a fixed-capacity channel.
///
/// Deliveries that arrive while the channel is full are dropped and logged;
/// the HTTP request is still acknowledged.
#[derive(Debug, Clone)]
pub struct BoundedChannelSink {
    tx: mpsc::Sender<Delivery>,
}

impl BoundedChannelSink {
    /// Creates a sink buffering at most `capacity` deliveries.
    ///
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Delivery>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl EventSink for BoundedChannelSink {
    fn accept(&self, delivery: Delivery) {
        match self.tx.try_send(delivery) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(
                    delivery_id = %dropped.id,
                    event_type = dropped.payload.event_type().unwrap_or("unknown"),
                    "event consumer is behind; dropping delivery"
                );
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                warn!(delivery_id = %dropped.id, "event consumer gone; dropping delivery");
            }
        }
    }
}
