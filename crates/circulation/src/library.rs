use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bookstack_catalog::book::{Book, BookCommand, BookEvent, CheckOutBook, RegisterBook, ReturnBook};
use bookstack_core::{Aggregate, DomainError, DomainResult, Isbn, MemberId, Money, apply_all};
use bookstack_events::{Event, EventBus, EventEnvelope, InMemoryEventBus, Subscription};
use bookstack_members::member::{
    BorrowRecord, CloseLoan, MemberCommand, MemberEvent, MemberLedger, OpenLoan, RegisterMember,
};

/// Union of the events a circulation transition can commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CirculationEvent {
    Book(BookEvent),
    Member(MemberEvent),
}

impl Event for CirculationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CirculationEvent::Book(e) => e.event_type(),
            CirculationEvent::Member(e) => e.event_type(),
        }
    }

    fn schema_version(&self) -> u32 {
        match self {
            CirculationEvent::Book(e) => e.schema_version(),
            CirculationEvent::Member(e) => e.schema_version(),
        }
    }

    fn occurred_on(&self) -> NaiveDate {
        match self {
            CirculationEvent::Book(e) => e.occurred_on(),
            CirculationEvent::Member(e) => e.occurred_on(),
        }
    }
}

/// The checkout/return orchestrator.
///
/// Owns the catalog and the member ledgers; all mutation goes through the
/// operations here. Each operation validates every business rule against
/// current state first and only then applies the produced events, so a
/// rejection leaves both collections exactly as they were.
///
/// Committed events are wrapped in envelopes and published on an in-memory
/// bus for reporting subscribers; the aggregates themselves are the source of
/// truth, so publishing is fire-and-forget.
pub struct Library {
    books: BTreeMap<Isbn, Book>,
    members: BTreeMap<MemberId, MemberLedger>,
    bus: InMemoryEventBus<EventEnvelope<CirculationEvent>>,
    sequence: u64,
}

impl Library {
    pub fn new() -> Self {
        Self {
            books: BTreeMap::new(),
            members: BTreeMap::new(),
            bus: InMemoryEventBus::new(),
            sequence: 0,
        }
    }

    /// Subscribe to the committed-event stream (reporting, audit).
    pub fn subscribe(&self) -> Subscription<EventEnvelope<CirculationEvent>> {
        self.bus.subscribe()
    }

    /// Register a book in the catalog. New books start available.
    pub fn add_book(
        &mut self,
        isbn: Isbn,
        title: impl Into<String>,
        author: impl Into<String>,
        on: NaiveDate,
    ) -> DomainResult<()> {
        if self.books.contains_key(&isbn) {
            return Err(DomainError::duplicate(format!("ISBN {isbn}")));
        }

        let book = Book::empty(isbn.clone());
        let events = book.handle(&BookCommand::RegisterBook(RegisterBook {
            isbn: isbn.clone(),
            title: title.into(),
            author: author.into(),
            occurred_on: on,
        }))?;

        let mut book = book;
        apply_all(&mut book, &events);
        self.books.insert(isbn, book);
        self.publish_book_events(events);
        Ok(())
    }

    /// Register a member with an empty ledger.
    pub fn register_member(
        &mut self,
        member_id: MemberId,
        name: impl Into<String>,
        on: NaiveDate,
    ) -> DomainResult<()> {
        if self.members.contains_key(&member_id) {
            return Err(DomainError::duplicate(format!("member {member_id}")));
        }

        let ledger = MemberLedger::empty(member_id.clone());
        let events = ledger.handle(&MemberCommand::RegisterMember(RegisterMember {
            member_id: member_id.clone(),
            name: name.into(),
            occurred_on: on,
        }))?;

        let mut ledger = ledger;
        apply_all(&mut ledger, &events);
        self.members.insert(member_id, ledger);
        self.publish_member_events(events);
        Ok(())
    }

    /// Check a book out to a member on the given date.
    ///
    /// Rules run in a fixed order against current state: fine block (live
    /// recompute, never the snapshot), availability, borrow limit, duplicate
    /// loan. Only when every rule passes are the loan, the availability flag,
    /// and the history entry committed together.
    pub fn checkout(
        &mut self,
        member_id: &MemberId,
        isbn: &Isbn,
        checkout_date: NaiveDate,
    ) -> DomainResult<()> {
        let member = self.member(member_id)?;
        let book = self.book(isbn)?;

        member.ensure_fines_unblocked(checkout_date)?;
        book.ensure_available()?;

        let member_events = member.handle(&MemberCommand::OpenLoan(OpenLoan {
            member_id: member_id.clone(),
            isbn: isbn.clone(),
            checkout_date,
        }))?;
        let book_events = book.handle(&BookCommand::CheckOutBook(CheckOutBook {
            isbn: isbn.clone(),
            occurred_on: checkout_date,
        }))?;

        // Every rule passed; commit both sides.
        apply_all(self.member_mut(member_id)?, &member_events);
        apply_all(self.book_mut(isbn)?, &book_events);
        self.publish_member_events(member_events);
        self.publish_book_events(book_events);

        tracing::info!(member = %member_id, %isbn, date = %checkout_date, "book checked out");
        Ok(())
    }

    /// Return a borrowed book, closing its history record.
    ///
    /// Returns the fine attributable to this loan alone — distinct from the
    /// member's refreshed aggregate balance.
    pub fn return_book(
        &mut self,
        member_id: &MemberId,
        isbn: &Isbn,
        return_date: NaiveDate,
    ) -> DomainResult<Money> {
        let member = self.member(member_id)?;
        let book = self.book(isbn)?;

        let member_events = member.handle(&MemberCommand::CloseLoan(CloseLoan {
            member_id: member_id.clone(),
            isbn: isbn.clone(),
            return_date,
        }))?;
        let book_events = book.handle(&BookCommand::ReturnBook(ReturnBook {
            isbn: isbn.clone(),
            occurred_on: return_date,
        }))?;

        let fine_charged = member_events
            .iter()
            .find_map(|event| match event {
                MemberEvent::LoanClosed(closed) => Some(closed.fine_charged),
                _ => None,
            })
            .unwrap_or(Money::ZERO);

        apply_all(self.member_mut(member_id)?, &member_events);
        apply_all(self.book_mut(isbn)?, &book_events);
        self.publish_member_events(member_events);
        self.publish_book_events(book_events);

        tracing::info!(
            member = %member_id,
            %isbn,
            date = %return_date,
            fine = %fine_charged,
            "book returned"
        );
        Ok(fine_charged)
    }

    /// Live fine total for a member's active loans as of `as_of`.
    ///
    /// Read-only: the stored snapshot is left alone (it refreshes only at
    /// checkout/return transitions).
    pub fn calculate_fine(&self, member_id: &MemberId, as_of: NaiveDate) -> DomainResult<Money> {
        Ok(self.member(member_id)?.live_fine(as_of))
    }

    /// Books currently available for checkout, in stable catalog order.
    pub fn available_books(&self) -> Vec<&Book> {
        self.books.values().filter(|b| b.is_available()).collect()
    }

    pub fn book(&self, isbn: &Isbn) -> DomainResult<&Book> {
        self.books
            .get(isbn)
            .ok_or_else(|| DomainError::BookNotFound(isbn.clone()))
    }

    pub fn member(&self, member_id: &MemberId) -> DomainResult<&MemberLedger> {
        self.members
            .get(member_id)
            .ok_or_else(|| DomainError::MemberNotFound(member_id.clone()))
    }

    /// Full borrowing history for a member, oldest first.
    pub fn member_history(&self, member_id: &MemberId) -> DomainResult<&[BorrowRecord]> {
        Ok(self.member(member_id)?.history())
    }

    fn member_mut(&mut self, member_id: &MemberId) -> DomainResult<&mut MemberLedger> {
        self.members
            .get_mut(member_id)
            .ok_or_else(|| DomainError::MemberNotFound(member_id.clone()))
    }

    fn book_mut(&mut self, isbn: &Isbn) -> DomainResult<&mut Book> {
        self.books
            .get_mut(isbn)
            .ok_or_else(|| DomainError::BookNotFound(isbn.clone()))
    }

    fn publish_book_events(&mut self, events: Vec<BookEvent>) {
        for event in events {
            let stream_id = match &event {
                BookEvent::BookRegistered(e) => e.isbn.to_string(),
                BookEvent::BookCheckedOut(e) => e.isbn.to_string(),
                BookEvent::BookReturned(e) => e.isbn.to_string(),
            };
            self.publish(stream_id, "book", CirculationEvent::Book(event));
        }
    }

    fn publish_member_events(&mut self, events: Vec<MemberEvent>) {
        for event in events {
            let stream_id = match &event {
                MemberEvent::MemberRegistered(e) => e.member_id.to_string(),
                MemberEvent::LoanOpened(e) => e.member_id.to_string(),
                MemberEvent::LoanClosed(e) => e.member_id.to_string(),
            };
            self.publish(stream_id, "member_ledger", CirculationEvent::Member(event));
        }
    }

    fn publish(&mut self, stream_id: String, aggregate_type: &str, payload: CirculationEvent) {
        self.sequence += 1;
        let envelope = EventEnvelope::new(stream_id, aggregate_type, self.sequence, payload);
        tracing::debug!(
            event_type = envelope.payload().event_type(),
            sequence = envelope.sequence_number(),
            "event committed"
        );
        // Publishing is distribution, not truth; a failed publish is logged
        // and the transition stands.
        if let Err(err) = self.bus.publish(envelope) {
            tracing::warn!(error = ?err, "event bus publish failed");
        }
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}
