//! Event publishing/subscription.
//!
//! The bus distributes committed events to consumers (reporting, audit).
//! It is transport only: the aggregates are the source of truth, so a bus
//! with no subscribers loses nothing. Subscribers get broadcast copies and
//! must tolerate seeing an event more than once.

use std::sync::{Mutex, mpsc};
use std::time::Duration;

use thiserror::Error;

/// A subscription handed out by [`EventBus::subscribe`].
///
/// Receives every message published after the subscription was created, in
/// publish order. Intended for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: mpsc::Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: mpsc::Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Pub/sub contract for distributing committed events.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    /// Publish failed because the subscriber list lock was poisoned.
    #[error("event bus subscriber list is poisoned")]
    Poisoned,
}

/// In-memory fan-out bus over std mpsc channels. No IO, no async.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?;

        // Drop disconnected subscribers while publishing.
        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcasts_to_every_subscriber() {
        let bus = InMemoryEventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.publish("hello").unwrap();

        assert_eq!(first.try_recv().unwrap(), "hello");
        assert_eq!(second.try_recv().unwrap(), "hello");
    }

    #[test]
    fn dropped_subscribers_do_not_break_publishing() {
        let bus = InMemoryEventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());

        bus.publish(1u32).unwrap();
        bus.publish(2u32).unwrap();

        assert_eq!(kept.try_recv().unwrap(), 1);
        assert_eq!(kept.try_recv().unwrap(), 2);
    }

    #[test]
    fn subscription_sees_only_later_messages() {
        let bus = InMemoryEventBus::new();
        bus.publish("early").unwrap();

        let sub = bus.subscribe();
        bus.publish("late").unwrap();

        assert_eq!(sub.try_recv().unwrap(), "late");
        assert!(sub.try_recv().is_err());
    }
}
