//! `bookstack-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod money;

pub use aggregate::{Aggregate, AggregateRoot, apply_all};
pub use error::{DomainError, DomainResult};
pub use id::{Isbn, MemberId};
pub use money::Money;
