//! Front-desk walkthrough of the circulation core.
//!
//! Seeds a small catalog, runs a member through the borrow limit, overdue
//! fines, a late return and the fine-block gate, then dumps the borrowing
//! history and the committed event stream.

use anyhow::Result;
use chrono::NaiveDate;

use bookstack_circulation::Library;
use bookstack_core::{Isbn, MemberId};
use bookstack_events::Event;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, m, d).expect("valid demo date")
}

fn main() -> Result<()> {
    bookstack_observability::init();

    let mut library = Library::new();
    let events = library.subscribe();
    let seeded = date(1, 1);

    library.add_book(Isbn::from("111"), "Clean Code", "Robert C. Martin", seeded)?;
    library.add_book(Isbn::from("222"), "Design Patterns", "GoF", seeded)?;
    library.add_book(Isbn::from("333"), "The Pragmatic Programmer", "Hunt & Thomas", seeded)?;
    library.add_book(Isbn::from("444"), "Effective Python", "Brett Slatkin", seeded)?;

    library.register_member(MemberId::from("M1"), "Saurabh", seeded)?;
    library.register_member(MemberId::from("M2"), "Alex", seeded)?;

    let m1 = MemberId::from("M1");
    let titles: Vec<&str> = library.available_books().iter().map(|b| b.title()).collect();
    tracing::info!(?titles, "available books initially");

    let checkout_date = date(2, 1);
    library.checkout(&m1, &Isbn::from("111"), checkout_date)?;
    library.checkout(&m1, &Isbn::from("222"), checkout_date)?;
    library.checkout(&m1, &Isbn::from("333"), checkout_date)?;

    match library.checkout(&m1, &Isbn::from("444"), checkout_date) {
        Err(err) => tracing::info!(%err, "fourth checkout rejected as expected"),
        Ok(()) => anyhow::bail!("fourth checkout should have been rejected"),
    }

    let as_of = date(2, 21);
    let fine = library.calculate_fine(&m1, as_of)?;
    tracing::info!(%fine, %as_of, "total overdue fine");

    let charged = library.return_book(&m1, &Isbn::from("111"), as_of)?;
    tracing::info!(
        %charged,
        balance = %library.member(&m1)?.fine_balance(),
        "late return settled"
    );

    match library.checkout(&m1, &Isbn::from("444"), date(3, 10)) {
        Err(err) => tracing::info!(%err, "fine-blocked checkout rejected as expected"),
        Ok(()) => anyhow::bail!("fine-blocked checkout should have been rejected"),
    }

    let titles: Vec<&str> = library.available_books().iter().map(|b| b.title()).collect();
    tracing::info!(?titles, "available books after return");

    println!(
        "Borrowing history for M1:\n{}",
        serde_json::to_string_pretty(library.member_history(&m1)?)?
    );

    println!("\nCommitted event stream:");
    while let Ok(envelope) = events.try_recv() {
        println!(
            "  #{:<3} {:<28} stream={} on={}",
            envelope.sequence_number(),
            envelope.payload().event_type(),
            envelope.stream_id(),
            envelope.payload().occurred_on()
        );
    }

    Ok(())
}
