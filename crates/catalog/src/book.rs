use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bookstack_core::{Aggregate, AggregateRoot, DomainError, Isbn};
use bookstack_events::Event;

/// Aggregate root: a catalogued book and its availability flag.
///
/// A book is available unless exactly one member holds it on loan. The member
/// ledger tracks who; the catalog only tracks whether.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    isbn: Isbn,
    title: String,
    author: String,
    available: bool,
    version: u64,
    registered: bool,
}

impl Book {
    /// Create an empty, not-yet-registered instance for the given ISBN.
    pub fn empty(isbn: Isbn) -> Self {
        Self {
            isbn,
            title: String::new(),
            author: String::new(),
            available: false,
            version: 0,
            registered: false,
        }
    }

    pub fn isbn(&self) -> &Isbn {
        &self.isbn
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Invariant helper: a checkout may only proceed on an available book.
    pub fn ensure_available(&self) -> Result<(), DomainError> {
        if !self.available {
            return Err(DomainError::Unavailable(self.isbn.clone()));
        }
        Ok(())
    }
}

impl AggregateRoot for Book {
    type Id = Isbn;

    fn id(&self) -> &Self::Id {
        &self.isbn
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterBook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBook {
    pub isbn: Isbn,
    pub title: String,
    pub author: String,
    pub occurred_on: NaiveDate,
}

/// Command: CheckOutBook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutBook {
    pub isbn: Isbn,
    pub occurred_on: NaiveDate,
}

/// Command: ReturnBook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub isbn: Isbn,
    pub occurred_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookCommand {
    RegisterBook(RegisterBook),
    CheckOutBook(CheckOutBook),
    ReturnBook(ReturnBook),
}

/// Event: BookRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRegistered {
    pub isbn: Isbn,
    pub title: String,
    pub author: String,
    pub occurred_on: NaiveDate,
}

/// Event: BookCheckedOut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCheckedOut {
    pub isbn: Isbn,
    pub occurred_on: NaiveDate,
}

/// Event: BookReturned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReturned {
    pub isbn: Isbn,
    pub occurred_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookEvent {
    BookRegistered(BookRegistered),
    BookCheckedOut(BookCheckedOut),
    BookReturned(BookReturned),
}

impl Event for BookEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BookEvent::BookRegistered(_) => "catalog.book.registered",
            BookEvent::BookCheckedOut(_) => "catalog.book.checked_out",
            BookEvent::BookReturned(_) => "catalog.book.returned",
        }
    }

    fn schema_version(&self) -> u32 {
        1
    }

    fn occurred_on(&self) -> NaiveDate {
        match self {
            BookEvent::BookRegistered(e) => e.occurred_on,
            BookEvent::BookCheckedOut(e) => e.occurred_on,
            BookEvent::BookReturned(e) => e.occurred_on,
        }
    }
}

impl Aggregate for Book {
    type Command = BookCommand;
    type Event = BookEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BookEvent::BookRegistered(e) => {
                self.isbn = e.isbn.clone();
                self.title = e.title.clone();
                self.author = e.author.clone();
                self.available = true;
                self.registered = true;
            }
            BookEvent::BookCheckedOut(_) => {
                self.available = false;
            }
            BookEvent::BookReturned(_) => {
                self.available = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BookCommand::RegisterBook(cmd) => self.handle_register(cmd),
            BookCommand::CheckOutBook(cmd) => self.handle_check_out(cmd),
            BookCommand::ReturnBook(cmd) => self.handle_return(cmd),
        }
    }
}

impl Book {
    fn handle_register(&self, cmd: &RegisterBook) -> Result<Vec<BookEvent>, DomainError> {
        if self.registered {
            return Err(DomainError::duplicate(format!("ISBN {}", self.isbn)));
        }

        Ok(vec![BookEvent::BookRegistered(BookRegistered {
            isbn: cmd.isbn.clone(),
            title: cmd.title.clone(),
            author: cmd.author.clone(),
            occurred_on: cmd.occurred_on,
        })])
    }

    fn handle_check_out(&self, cmd: &CheckOutBook) -> Result<Vec<BookEvent>, DomainError> {
        if !self.registered {
            return Err(DomainError::BookNotFound(self.isbn.clone()));
        }
        self.ensure_available()?;

        Ok(vec![BookEvent::BookCheckedOut(BookCheckedOut {
            isbn: cmd.isbn.clone(),
            occurred_on: cmd.occurred_on,
        })])
    }

    fn handle_return(&self, cmd: &ReturnBook) -> Result<Vec<BookEvent>, DomainError> {
        if !self.registered {
            return Err(DomainError::BookNotFound(self.isbn.clone()));
        }
        if self.available {
            // The ledger guards this upstream; reject if reached directly.
            return Err(DomainError::NotBorrowed(self.isbn.clone()));
        }

        Ok(vec![BookEvent::BookReturned(BookReturned {
            isbn: cmd.isbn.clone(),
            occurred_on: cmd.occurred_on,
        })])
    }
}
