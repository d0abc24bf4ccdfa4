//! Member ledger: active loans, borrowing history, fine balance.

pub mod member;

pub use member::{BorrowRecord, MemberCommand, MemberEvent, MemberLedger, MAX_ACTIVE_LOANS};
