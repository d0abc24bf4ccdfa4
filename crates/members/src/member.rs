use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bookstack_core::{Aggregate, AggregateRoot, DomainError, Isbn, MemberId, Money};
use bookstack_events::Event;
use bookstack_fines::{blocks_checkout, due_date, fine_for_loan, total_fine};

/// A member may hold at most this many active loans.
pub const MAX_ACTIVE_LOANS: usize = 3;

/// One line of borrowing history.
///
/// Created open at checkout; closed exactly once at return, when
/// `return_date` and `fine_charged` are set. A closed record is a historical
/// fact and is never recomputed, even as fine policy dates move on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRecord {
    pub isbn: Isbn,
    pub checkout_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub fine_charged: Money,
}

impl BorrowRecord {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

/// Aggregate root: a member's loans, history and fine balance.
///
/// `fine_balance` is a derived snapshot, refreshed whenever a loan opens or
/// closes; it equals the total fine over the active loans as of the latest
/// transition date. Between transitions it goes stale — rule checks and the
/// balance query recompute live instead of reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLedger {
    member_id: MemberId,
    name: String,
    /// Active loans: ISBN -> checkout date. One active loan per ISBN.
    loans: BTreeMap<Isbn, NaiveDate>,
    history: Vec<BorrowRecord>,
    fine_balance: Money,
    version: u64,
    registered: bool,
}

impl MemberLedger {
    /// Create an empty, not-yet-registered ledger for the given member id.
    pub fn empty(member_id: MemberId) -> Self {
        Self {
            member_id,
            name: String::new(),
            loans: BTreeMap::new(),
            history: Vec::new(),
            fine_balance: Money::ZERO,
            version: 0,
            registered: false,
        }
    }

    pub fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot balance as of the most recent checkout/return transition.
    pub fn fine_balance(&self) -> Money {
        self.fine_balance
    }

    pub fn active_loan_count(&self) -> usize {
        self.loans.len()
    }

    pub fn has_active_loan(&self, isbn: &Isbn) -> bool {
        self.loans.contains_key(isbn)
    }

    /// Full borrowing history, open and closed records, oldest first.
    pub fn history(&self) -> &[BorrowRecord] {
        &self.history
    }

    /// Live balance: total fine over the active loans as of `as_of`.
    ///
    /// Unlike [`MemberLedger::fine_balance`] this never lags; it is the value
    /// the fine-block gate runs against.
    pub fn live_fine(&self, as_of: NaiveDate) -> Money {
        total_fine(self.loans.values(), as_of)
    }

    /// Invariant helper: the fine-block gate, against the live balance.
    pub fn ensure_fines_unblocked(&self, as_of: NaiveDate) -> Result<(), DomainError> {
        let balance = self.live_fine(as_of);
        if blocks_checkout(balance) {
            return Err(DomainError::FineBlocked { balance });
        }
        Ok(())
    }
}

impl AggregateRoot for MemberLedger {
    type Id = MemberId;

    fn id(&self) -> &Self::Id {
        &self.member_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterMember.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMember {
    pub member_id: MemberId,
    pub name: String,
    pub occurred_on: NaiveDate,
}

/// Command: OpenLoan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLoan {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub checkout_date: NaiveDate,
}

/// Command: CloseLoan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseLoan {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub return_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberCommand {
    RegisterMember(RegisterMember),
    OpenLoan(OpenLoan),
    CloseLoan(CloseLoan),
}

/// Event: MemberRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRegistered {
    pub member_id: MemberId,
    pub name: String,
    pub occurred_on: NaiveDate,
}

/// Event: LoanOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanOpened {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub checkout_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// Event: LoanClosed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanClosed {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub return_date: NaiveDate,
    /// Fine attributable to this loan alone, fixed at close time.
    pub fine_charged: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberEvent {
    MemberRegistered(MemberRegistered),
    LoanOpened(LoanOpened),
    LoanClosed(LoanClosed),
}

impl Event for MemberEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MemberEvent::MemberRegistered(_) => "members.member.registered",
            MemberEvent::LoanOpened(_) => "members.loan.opened",
            MemberEvent::LoanClosed(_) => "members.loan.closed",
        }
    }

    fn schema_version(&self) -> u32 {
        1
    }

    fn occurred_on(&self) -> NaiveDate {
        match self {
            MemberEvent::MemberRegistered(e) => e.occurred_on,
            MemberEvent::LoanOpened(e) => e.checkout_date,
            MemberEvent::LoanClosed(e) => e.return_date,
        }
    }
}

impl Aggregate for MemberLedger {
    type Command = MemberCommand;
    type Event = MemberEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            MemberEvent::MemberRegistered(e) => {
                self.member_id = e.member_id.clone();
                self.name = e.name.clone();
                self.loans.clear();
                self.history.clear();
                self.fine_balance = Money::ZERO;
                self.registered = true;
            }
            MemberEvent::LoanOpened(e) => {
                self.loans.insert(e.isbn.clone(), e.checkout_date);
                self.history.push(BorrowRecord {
                    isbn: e.isbn.clone(),
                    checkout_date: e.checkout_date,
                    due_date: e.due_date,
                    return_date: None,
                    fine_charged: Money::ZERO,
                });
                self.fine_balance = total_fine(self.loans.values(), e.checkout_date);
            }
            MemberEvent::LoanClosed(e) => {
                // Close the most recent still-open record for this ISBN.
                if let Some(record) = self
                    .history
                    .iter_mut()
                    .rev()
                    .find(|r| r.isbn == e.isbn && r.is_open())
                {
                    record.return_date = Some(e.return_date);
                    record.fine_charged = e.fine_charged;
                }
                self.loans.remove(&e.isbn);
                self.fine_balance = total_fine(self.loans.values(), e.return_date);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            MemberCommand::RegisterMember(cmd) => self.handle_register(cmd),
            MemberCommand::OpenLoan(cmd) => self.handle_open_loan(cmd),
            MemberCommand::CloseLoan(cmd) => self.handle_close_loan(cmd),
        }
    }
}

impl MemberLedger {
    fn handle_register(&self, cmd: &RegisterMember) -> Result<Vec<MemberEvent>, DomainError> {
        if self.registered {
            return Err(DomainError::duplicate(format!("member {}", self.member_id)));
        }

        Ok(vec![MemberEvent::MemberRegistered(MemberRegistered {
            member_id: cmd.member_id.clone(),
            name: cmd.name.clone(),
            occurred_on: cmd.occurred_on,
        })])
    }

    fn handle_open_loan(&self, cmd: &OpenLoan) -> Result<Vec<MemberEvent>, DomainError> {
        if !self.registered {
            return Err(DomainError::MemberNotFound(self.member_id.clone()));
        }

        self.ensure_fines_unblocked(cmd.checkout_date)?;

        if self.loans.len() >= MAX_ACTIVE_LOANS {
            return Err(DomainError::BorrowLimit {
                limit: MAX_ACTIVE_LOANS,
            });
        }

        if self.loans.contains_key(&cmd.isbn) {
            return Err(DomainError::DuplicateLoan(cmd.isbn.clone()));
        }

        Ok(vec![MemberEvent::LoanOpened(LoanOpened {
            member_id: cmd.member_id.clone(),
            isbn: cmd.isbn.clone(),
            checkout_date: cmd.checkout_date,
            due_date: due_date(cmd.checkout_date),
        })])
    }

    fn handle_close_loan(&self, cmd: &CloseLoan) -> Result<Vec<MemberEvent>, DomainError> {
        if !self.registered {
            return Err(DomainError::MemberNotFound(self.member_id.clone()));
        }

        let checkout_date = self
            .loans
            .get(&cmd.isbn)
            .copied()
            .ok_or_else(|| DomainError::NotBorrowed(cmd.isbn.clone()))?;

        if cmd.return_date < checkout_date {
            return Err(DomainError::InvalidReturnDate);
        }

        Ok(vec![MemberEvent::LoanClosed(LoanClosed {
            member_id: cmd.member_id.clone(),
            isbn: cmd.isbn.clone(),
            return_date: cmd.return_date,
            fine_charged: fine_for_loan(checkout_date, cmd.return_date),
        })])
    }
}
