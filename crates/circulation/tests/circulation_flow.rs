//! End-to-end circulation walkthrough: three overdue checkouts, a late
//! return, and the fine-block gate, on frozen calendar dates.

use chrono::NaiveDate;

use bookstack_circulation::Library;
use bookstack_core::{DomainError, Isbn, MemberId, Money};

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, m, d).unwrap()
}

fn m1() -> MemberId {
    MemberId::from("M1")
}

/// Catalog of four books and one member, as the front desk would seed it.
fn seeded_library() -> Library {
    let mut library = Library::new();
    let on = date(1, 1);
    library.add_book(Isbn::from("111"), "A", "Auth1", on).unwrap();
    library.add_book(Isbn::from("222"), "B", "Auth2", on).unwrap();
    library.add_book(Isbn::from("333"), "C", "Auth3", on).unwrap();
    library.add_book(Isbn::from("444"), "D", "Auth4", on).unwrap();
    library.register_member(m1(), "Saurabh", on).unwrap();
    library
}

/// Checkout three books on Feb 1; used by most scenarios below.
fn checkout_three(library: &mut Library) {
    let d = date(2, 1);
    library.checkout(&m1(), &Isbn::from("111"), d).unwrap();
    library.checkout(&m1(), &Isbn::from("222"), d).unwrap();
    library.checkout(&m1(), &Isbn::from("333"), d).unwrap();
}

#[test]
fn fourth_checkout_hits_the_borrow_limit() {
    let mut library = seeded_library();
    checkout_three(&mut library);

    let err = library
        .checkout(&m1(), &Isbn::from("444"), date(2, 1))
        .unwrap_err();
    assert_eq!(err, DomainError::BorrowLimit { limit: 3 });

    // The rejected checkout left the book and the ledger untouched.
    assert!(library.book(&Isbn::from("444")).unwrap().is_available());
    assert_eq!(library.member(&m1()).unwrap().active_loan_count(), 3);
}

#[test]
fn three_books_six_days_overdue_owe_nine_dollars() {
    let mut library = seeded_library();
    checkout_three(&mut library);

    // Due Feb 15; as of Feb 21 each book is 6 days overdue at $0.50/day.
    let fine = library.calculate_fine(&m1(), date(2, 21)).unwrap();
    assert_eq!(fine, Money::from_cents(900));

    // Read-only: the snapshot still reads zero from the Feb 1 transition.
    assert_eq!(library.member(&m1()).unwrap().fine_balance(), Money::ZERO);
}

#[test]
fn calculate_fine_is_idempotent() {
    let mut library = seeded_library();
    checkout_three(&mut library);

    let first = library.calculate_fine(&m1(), date(2, 21)).unwrap();
    let second = library.calculate_fine(&m1(), date(2, 21)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn late_return_charges_this_loan_and_refreshes_the_balance() {
    let mut library = seeded_library();
    checkout_three(&mut library);

    let fine = library
        .return_book(&m1(), &Isbn::from("111"), date(2, 21))
        .unwrap();
    assert_eq!(fine, Money::from_cents(300));

    let member = library.member(&m1()).unwrap();
    assert_eq!(member.fine_balance(), Money::from_cents(600));
    assert_eq!(
        library.calculate_fine(&m1(), date(2, 21)).unwrap(),
        Money::from_cents(600)
    );
    assert!(library.book(&Isbn::from("111")).unwrap().is_available());
    assert_eq!(member.active_loan_count(), 2);

    let record = member
        .history()
        .iter()
        .find(|r| r.isbn == Isbn::from("111"))
        .unwrap();
    assert_eq!(record.return_date, Some(date(2, 21)));
    assert_eq!(record.fine_charged, Money::from_cents(300));
}

#[test]
fn overdue_balance_past_ten_dollars_blocks_checkout() {
    let mut library = seeded_library();
    checkout_three(&mut library);
    library
        .return_book(&m1(), &Isbn::from("111"), date(2, 21))
        .unwrap();

    // By Mar 10 the two remaining books are 23 days overdue: $23.00 total.
    let err = library
        .checkout(&m1(), &Isbn::from("444"), date(3, 10))
        .unwrap_err();
    assert!(matches!(err, DomainError::FineBlocked { .. }));

    // Blocked, not mutated.
    assert!(library.book(&Isbn::from("444")).unwrap().is_available());
    assert_eq!(library.member(&m1()).unwrap().active_loan_count(), 2);
}

#[test]
fn return_before_checkout_date_is_rejected_without_state_change() {
    let mut library = seeded_library();
    library.checkout(&m1(), &Isbn::from("111"), date(2, 10)).unwrap();

    let err = library
        .return_book(&m1(), &Isbn::from("111"), date(2, 9))
        .unwrap_err();
    assert_eq!(err, DomainError::InvalidReturnDate);

    let member = library.member(&m1()).unwrap();
    assert!(member.has_active_loan(&Isbn::from("111")));
    assert!(member.history()[0].is_open());
    assert!(!library.book(&Isbn::from("111")).unwrap().is_available());
}

#[test]
fn returning_a_book_the_member_never_borrowed_is_rejected() {
    let mut library = seeded_library();
    let err = library
        .return_book(&m1(), &Isbn::from("111"), date(2, 21))
        .unwrap_err();
    assert_eq!(err, DomainError::NotBorrowed(Isbn::from("111")));
}

#[test]
fn on_time_return_charges_nothing() {
    let mut library = seeded_library();
    library.checkout(&m1(), &Isbn::from("111"), date(2, 1)).unwrap();

    // Feb 15 is the due date itself.
    let fine = library
        .return_book(&m1(), &Isbn::from("111"), date(2, 15))
        .unwrap();
    assert_eq!(fine, Money::ZERO);
    assert_eq!(library.member(&m1()).unwrap().fine_balance(), Money::ZERO);
}

#[test]
fn history_keeps_open_and_closed_records_oldest_first() {
    let mut library = seeded_library();
    checkout_three(&mut library);
    library
        .return_book(&m1(), &Isbn::from("222"), date(2, 21))
        .unwrap();

    let history = library.member_history(&m1()).unwrap();
    assert_eq!(history.len(), 3);
    let isbns: Vec<&str> = history.iter().map(|r| r.isbn.as_str()).collect();
    assert_eq!(isbns, vec!["111", "222", "333"]);
    assert!(history[0].is_open());
    assert!(!history[1].is_open());
    assert!(history[2].is_open());
}
