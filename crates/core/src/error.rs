//! Domain error model.

use thiserror::Error;

use crate::id::{Isbn, MemberId};
use crate::money::Money;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Circulation business-rule rejection.
///
/// Every variant is a deterministic, recoverable-by-caller rejection, not a
/// system failure. Callers surface these to users; nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No book registered under this ISBN.
    #[error("book not found: {0}")]
    BookNotFound(Isbn),

    /// No member registered under this id.
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    /// Registration attempted over an existing ISBN or member id.
    #[error("already registered: {0}")]
    Duplicate(String),

    /// The book is currently lent out.
    #[error("book is not available: {0}")]
    Unavailable(Isbn),

    /// The member is at the active-loan limit.
    #[error("member cannot borrow more than {limit} books at a time")]
    BorrowLimit { limit: usize },

    /// The member already holds an active loan on this ISBN.
    #[error("member already has this book checked out: {0}")]
    DuplicateLoan(Isbn),

    /// The member's live overdue balance exceeds the fine-block threshold.
    #[error("unpaid fines of {balance} block new checkouts")]
    FineBlocked { balance: Money },

    /// Return attempted for a loan this member does not hold.
    #[error("this member did not borrow this book: {0}")]
    NotBorrowed(Isbn),

    /// Return date precedes the loan's checkout date.
    #[error("return date cannot be before checkout date")]
    InvalidReturnDate,
}

impl DomainError {
    pub fn duplicate(what: impl Into<String>) -> Self {
        Self::Duplicate(what.into())
    }
}
