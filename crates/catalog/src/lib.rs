//! Catalog: books and their availability lifecycle.

pub mod book;

pub use book::{Book, BookCommand, BookEvent};
