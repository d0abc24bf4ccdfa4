//! Aggregate traits: pure command handling, explicit event application.

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state, +1 per
    /// applied event.
    fn version(&self) -> u64;
}

/// Aggregate execution semantics.
///
/// - `handle(&self, cmd)` decides: validates against current state and
///   returns the events describing what happened. It must not mutate.
/// - `apply(&mut self, event)` evolves: deterministic state transition from
///   a single event, no validation, no IO.
///
/// Rejections surface from `handle`; once a command produced events, applying
/// them cannot fail. This split is what gives the orchestrator its
/// all-or-nothing commit.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Evolve in-memory state from a single event.
    fn apply(&mut self, event: &Self::Event);

    /// Decide which events to emit given the current state and a command.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;
}

/// Apply a batch of already-validated events in order.
pub fn apply_all<A: Aggregate>(aggregate: &mut A, events: &[A::Event]) {
    for event in events {
        aggregate.apply(event);
    }
}
