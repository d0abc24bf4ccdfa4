//! Domain event plumbing: the `Event` contract, the envelope appended to a
//! stream, and a pub/sub bus for distributing committed events to reporting
//! collaborators.

pub mod bus;
pub mod envelope;
pub mod event;

pub use bus::{EventBus, InMemoryEventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
