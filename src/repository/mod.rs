//! Repository layer: storage capabilities the services are written against.
//!
//! The services only see the [`CatalogRepository`] and [`BorrowRecordRepository`]
//! traits. Postgres implementations live in `catalog` and `borrow_records`.

pub mod borrow_records;
pub mod catalog;
#[cfg(test)]
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::{Author, NewAuthor},
        book::{Book, NewBook},
        book_copy::{BookCopy, CopyType, NewBookCopy},
        borrow_record::{BorrowRecord, NewBorrowRecord},
        user::{LibraryUser, NewLibraryUser},
    },
};

/// Authors, books, copies and users.
///
/// Update and delete calls return the number of affected rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Round trip to the store
    async fn ping(&self) -> AppResult<()>;

    async fn insert_author(&self, author: &NewAuthor) -> AppResult<Author>;
    async fn find_author_exact(&self, name: &str) -> AppResult<Option<Author>>;
    /// Case-insensitive substring match on the name
    async fn find_authors_like(&self, fragment: &str) -> AppResult<Vec<Author>>;
    async fn find_author_by_book_id(&self, owl_id: Uuid) -> AppResult<Option<Author>>;
    async fn update_author_name(&self, id: Uuid, name: &str) -> AppResult<u64>;
    async fn update_author_popularity(&self, id: Uuid, is_popular: bool) -> AppResult<u64>;
    async fn delete_author(&self, id: Uuid) -> AppResult<u64>;

    async fn insert_book(&self, book: &NewBook) -> AppResult<Book>;
    async fn find_book_by_id(&self, owl_id: Uuid) -> AppResult<Option<Book>>;
    /// Titles are only unique per author, so several books may match
    async fn find_books_exact_title(&self, title: &str) -> AppResult<Vec<Book>>;
    async fn find_books_like_title(&self, fragment: &str) -> AppResult<Vec<Book>>;
    async fn find_books_by_author_ids(&self, author_ids: &[Uuid]) -> AppResult<Vec<Book>>;
    async fn list_books(&self) -> AppResult<Vec<Book>>;
    async fn update_book_title(&self, owl_id: Uuid, title: &str) -> AppResult<u64>;
    async fn update_book_author(&self, owl_id: Uuid, author_id: Uuid) -> AppResult<u64>;
    /// Title and author in one statement
    async fn update_book(&self, owl_id: Uuid, title: &str, author_id: Uuid) -> AppResult<u64>;
    async fn delete_book(&self, owl_id: Uuid) -> AppResult<u64>;

    async fn insert_copy(&self, copy: &NewBookCopy) -> AppResult<BookCopy>;
    async fn find_copy_by_id(&self, id: Uuid) -> AppResult<Option<BookCopy>>;
    async fn find_copies_by_book_id(&self, owl_id: Uuid) -> AppResult<Vec<BookCopy>>;
    async fn list_copies(&self) -> AppResult<Vec<BookCopy>>;
    async fn update_copy_type(&self, id: Uuid, copy_type: CopyType) -> AppResult<u64>;
    async fn delete_copy(&self, id: Uuid) -> AppResult<u64>;

    async fn insert_user(&self, user: &NewLibraryUser) -> AppResult<LibraryUser>;
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<LibraryUser>>;
}

/// Borrow records.
///
/// At most one record exists per (copy, user); a second insert for the same
/// pair fails with `AppError::Conflict`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowRecordRepository: Send + Sync {
    async fn insert(&self, record: &NewBorrowRecord) -> AppResult<BorrowRecord>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<BorrowRecord>>;
    /// Most recent record of the user on any copy of the book
    async fn find_by_book_and_user(
        &self,
        owl_id: Uuid,
        username: &str,
    ) -> AppResult<Option<BorrowRecord>>;
    async fn find_all_by_user(&self, username: &str) -> AppResult<Vec<BorrowRecord>>;
    async fn find_all_by_return_status(&self, is_returned: bool) -> AppResult<Vec<BorrowRecord>>;
    async fn update_return_status(&self, id: Uuid, is_returned: bool) -> AppResult<u64>;
    async fn update_dates_and_status(
        &self,
        id: Uuid,
        borrow_date: DateTime<Utc>,
        return_date: DateTime<Utc>,
        is_returned: bool,
    ) -> AppResult<u64>;
    async fn delete_by_id(&self, id: Uuid) -> AppResult<u64>;
}

/// Main repository struct handed to the services
#[derive(Clone)]
pub struct Repository {
    pub catalog: Arc<dyn CatalogRepository>,
    pub borrow_records: Arc<dyn BorrowRecordRepository>,
}

impl Repository {
    /// Create Postgres-backed repositories sharing the given pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            catalog: Arc::new(catalog::PgCatalogRepository::new(pool.clone())),
            borrow_records: Arc::new(borrow_records::PgBorrowRecordRepository::new(pool)),
        }
    }

    pub fn from_parts(
        catalog: Arc<dyn CatalogRepository>,
        borrow_records: Arc<dyn BorrowRecordRepository>,
    ) -> Self {
        Self {
            catalog,
            borrow_records,
        }
    }
}

/// Constraint a failed statement ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    Unique,
    ForeignKey,
    Check,
}

pub(crate) fn violation(err: &sqlx::Error) -> Option<Violation> {
    let db = err.as_database_error()?;
    if db.is_unique_violation() {
        Some(Violation::Unique)
    } else if db.is_foreign_key_violation() {
        Some(Violation::ForeignKey)
    } else if db.is_check_violation() {
        Some(Violation::Check)
    } else {
        None
    }
}

/// `%fragment%` with LIKE wildcards in the fragment escaped
pub(crate) fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
