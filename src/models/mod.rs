//! Data models for the Owl library

pub mod author;
pub mod book;
pub mod book_copy;
pub mod borrow_record;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use book_copy::{BookCopy, CopyType};
pub use borrow_record::{BorrowRecord, NewBorrowRecord, NextBorrowDate};
pub use user::{LibraryUser, UserClaims};
