//! Checkout/return orchestration over the catalog and the member ledgers.

pub mod library;

pub use library::{CirculationEvent, Library};
