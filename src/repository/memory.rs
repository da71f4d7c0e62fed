//! In-memory store implementing both repository traits, with the same
//! constraints as the database schema. Test-only.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{BorrowRecordRepository, CatalogRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, NewAuthor},
        book::{Book, NewBook},
        book_copy::{BookCopy, CopyType, NewBookCopy},
        borrow_record::{check_chronology, BorrowRecord, NewBorrowRecord},
        user::{LibraryUser, NewLibraryUser},
    },
};

#[derive(Default)]
struct Tables {
    authors: Vec<Author>,
    books: Vec<(Uuid, String, Uuid)>,
    copies: Vec<BookCopy>,
    users: Vec<LibraryUser>,
    records: Vec<BorrowRecord>,
}

impl Tables {
    fn book(&self, owl_id: Uuid) -> Option<Book> {
        let (owl_id, title, author_id) = self.books.iter().find(|(id, _, _)| *id == owl_id)?;
        let author = self.authors.iter().find(|a| a.id == *author_id)?;
        Some(Book {
            owl_id: *owl_id,
            title: title.clone(),
            author: author.clone(),
        })
    }

    fn books_where(&self, keep: impl Fn(&Book) -> bool) -> Vec<Book> {
        let mut books: Vec<Book> = self
            .books
            .iter()
            .filter_map(|(id, _, _)| self.book(*id))
            .filter(|b| keep(b))
            .collect();
        books.sort_by(|a, b| (&a.title, &a.author.name).cmp(&(&b.title, &b.author.name)));
        books
    }
}

#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Move a record's borrow date, to simulate elapsed time
    pub fn backdate(&self, record_id: Uuid, borrow_date: DateTime<Utc>) {
        let mut tables = self.lock();
        if let Some(record) = tables.records.iter_mut().find(|r| r.id == record_id) {
            record.borrow_date = borrow_date;
        }
    }

    pub fn record_count(&self) -> usize {
        self.lock().records.len()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn insert_author(&self, author: &NewAuthor) -> AppResult<Author> {
        let mut tables = self.lock();
        if author.name.trim().is_empty() {
            return Err(AppError::Validation("Author name must not be empty".to_string()));
        }
        if tables.authors.iter().any(|a| a.name == author.name) {
            return Err(AppError::BusinessRule(format!(
                "Author '{}' already exists",
                author.name
            )));
        }
        let created = Author {
            id: Uuid::new_v4(),
            name: author.name.clone(),
            is_popular: author.is_popular,
        };
        tables.authors.push(created.clone());
        Ok(created)
    }

    async fn find_author_exact(&self, name: &str) -> AppResult<Option<Author>> {
        Ok(self.lock().authors.iter().find(|a| a.name == name).cloned())
    }

    async fn find_authors_like(&self, fragment: &str) -> AppResult<Vec<Author>> {
        let mut authors: Vec<Author> = self
            .lock()
            .authors
            .iter()
            .filter(|a| contains_ignore_case(&a.name, fragment))
            .cloned()
            .collect();
        authors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(authors)
    }

    async fn find_author_by_book_id(&self, owl_id: Uuid) -> AppResult<Option<Author>> {
        Ok(self.lock().book(owl_id).map(|b| b.author))
    }

    async fn update_author_name(&self, id: Uuid, name: &str) -> AppResult<u64> {
        let mut tables = self.lock();
        if tables.authors.iter().any(|a| a.name == name && a.id != id) {
            return Err(AppError::BusinessRule(format!("Author '{}' already exists", name)));
        }
        match tables.authors.iter_mut().find(|a| a.id == id) {
            Some(author) => {
                author.name = name.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_author_popularity(&self, id: Uuid, is_popular: bool) -> AppResult<u64> {
        let mut tables = self.lock();
        match tables.authors.iter_mut().find(|a| a.id == id) {
            Some(author) => {
                author.is_popular = is_popular;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_author(&self, id: Uuid) -> AppResult<u64> {
        let mut tables = self.lock();
        if tables.books.iter().any(|(_, _, author_id)| *author_id == id) {
            return Err(AppError::BusinessRule(
                "Author is still referenced and cannot be deleted".to_string(),
            ));
        }
        let before = tables.authors.len();
        tables.authors.retain(|a| a.id != id);
        Ok((before - tables.authors.len()) as u64)
    }

    async fn insert_book(&self, book: &NewBook) -> AppResult<Book> {
        let mut tables = self.lock();
        if !tables.authors.iter().any(|a| a.id == book.author_id) {
            return Err(AppError::NotFound(format!(
                "Author with id {} not found",
                book.author_id
            )));
        }
        if tables
            .books
            .iter()
            .any(|(_, title, author_id)| *title == book.title && *author_id == book.author_id)
        {
            return Err(AppError::BusinessRule(format!(
                "Book '{}' already exists for this author",
                book.title
            )));
        }
        let owl_id = Uuid::new_v4();
        tables.books.push((owl_id, book.title.clone(), book.author_id));
        tables
            .book(owl_id)
            .ok_or_else(|| AppError::Internal(format!("Inserted book {} vanished", owl_id)))
    }

    async fn find_book_by_id(&self, owl_id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.lock().book(owl_id))
    }

    async fn find_books_exact_title(&self, title: &str) -> AppResult<Vec<Book>> {
        Ok(self.lock().books_where(|b| b.title == title))
    }

    async fn find_books_like_title(&self, fragment: &str) -> AppResult<Vec<Book>> {
        Ok(self.lock().books_where(|b| contains_ignore_case(&b.title, fragment)))
    }

    async fn find_books_by_author_ids(&self, author_ids: &[Uuid]) -> AppResult<Vec<Book>> {
        Ok(self.lock().books_where(|b| author_ids.contains(&b.author.id)))
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        Ok(self.lock().books_where(|_| true))
    }

    async fn update_book_title(&self, owl_id: Uuid, title: &str) -> AppResult<u64> {
        let mut tables = self.lock();
        let Some(author_id) = tables
            .books
            .iter()
            .find(|(id, _, _)| *id == owl_id)
            .map(|(_, _, author_id)| *author_id)
        else {
            return Ok(0);
        };
        if tables
            .books
            .iter()
            .any(|(id, t, a)| *id != owl_id && t == title && *a == author_id)
        {
            return Err(AppError::BusinessRule(format!(
                "Book '{}' already exists for this author",
                title
            )));
        }
        if let Some(book) = tables.books.iter_mut().find(|(id, _, _)| *id == owl_id) {
            book.1 = title.to_string();
        }
        Ok(1)
    }

    async fn update_book_author(&self, owl_id: Uuid, author_id: Uuid) -> AppResult<u64> {
        let mut tables = self.lock();
        if !tables.authors.iter().any(|a| a.id == author_id) {
            return Err(AppError::NotFound(format!("Author with id {} not found", author_id)));
        }
        match tables.books.iter_mut().find(|(id, _, _)| *id == owl_id) {
            Some(book) => {
                book.2 = author_id;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_book(&self, owl_id: Uuid, title: &str, author_id: Uuid) -> AppResult<u64> {
        let mut tables = self.lock();
        if !tables.authors.iter().any(|a| a.id == author_id) {
            return Err(AppError::NotFound(format!("Author with id {} not found", author_id)));
        }
        if tables
            .books
            .iter()
            .any(|(id, t, a)| *id != owl_id && t == title && *a == author_id)
        {
            return Err(AppError::BusinessRule(format!(
                "Book '{}' already exists for this author",
                title
            )));
        }
        match tables.books.iter_mut().find(|(id, _, _)| *id == owl_id) {
            Some(book) => {
                book.1 = title.to_string();
                book.2 = author_id;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_book(&self, owl_id: Uuid) -> AppResult<u64> {
        let mut tables = self.lock();
        if tables.copies.iter().any(|c| c.book_id == owl_id) {
            return Err(AppError::BusinessRule(
                "Book is still referenced and cannot be deleted".to_string(),
            ));
        }
        let before = tables.books.len();
        tables.books.retain(|(id, _, _)| *id != owl_id);
        Ok((before - tables.books.len()) as u64)
    }

    async fn insert_copy(&self, copy: &NewBookCopy) -> AppResult<BookCopy> {
        let mut tables = self.lock();
        if !tables.books.iter().any(|(id, _, _)| *id == copy.book_id) {
            return Err(AppError::NotFound(format!(
                "Book with owl id {} not found",
                copy.book_id
            )));
        }
        let created = BookCopy {
            id: Uuid::new_v4(),
            book_id: copy.book_id,
            copy_type: copy.copy_type,
        };
        tables.copies.push(created.clone());
        Ok(created)
    }

    async fn find_copy_by_id(&self, id: Uuid) -> AppResult<Option<BookCopy>> {
        Ok(self.lock().copies.iter().find(|c| c.id == id).cloned())
    }

    async fn find_copies_by_book_id(&self, owl_id: Uuid) -> AppResult<Vec<BookCopy>> {
        let mut copies: Vec<BookCopy> = self
            .lock()
            .copies
            .iter()
            .filter(|c| c.book_id == owl_id)
            .cloned()
            .collect();
        copies.sort_by_key(|c| c.id);
        Ok(copies)
    }

    async fn list_copies(&self) -> AppResult<Vec<BookCopy>> {
        let mut copies = self.lock().copies.clone();
        copies.sort_by_key(|c| c.id);
        Ok(copies)
    }

    async fn update_copy_type(&self, id: Uuid, copy_type: CopyType) -> AppResult<u64> {
        let mut tables = self.lock();
        match tables.copies.iter_mut().find(|c| c.id == id) {
            Some(copy) => {
                copy.copy_type = copy_type;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_copy(&self, id: Uuid) -> AppResult<u64> {
        let mut tables = self.lock();
        if tables.records.iter().any(|r| r.book_copy_id == id) {
            return Err(AppError::BusinessRule(
                "Book copy is still referenced and cannot be deleted".to_string(),
            ));
        }
        let before = tables.copies.len();
        tables.copies.retain(|c| c.id != id);
        Ok((before - tables.copies.len()) as u64)
    }

    async fn insert_user(&self, user: &NewLibraryUser) -> AppResult<LibraryUser> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        let created = LibraryUser {
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            is_admin: user.is_admin,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<LibraryUser>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BorrowRecordRepository for InMemoryRepository {
    async fn insert(&self, record: &NewBorrowRecord) -> AppResult<BorrowRecord> {
        check_chronology(record.borrow_date, record.return_date)?;
        let mut tables = self.lock();
        let copy = tables
            .copies
            .iter()
            .find(|c| c.id == record.book_copy_id)
            .cloned();
        let user_exists = tables.users.iter().any(|u| u.username == record.library_user);
        let Some(copy) = copy.filter(|_| user_exists) else {
            return Err(AppError::NotFound(format!(
                "Book copy {} or user '{}' not found",
                record.book_copy_id, record.library_user
            )));
        };
        if tables
            .records
            .iter()
            .any(|r| r.book_copy_id == copy.id && r.library_user == record.library_user)
        {
            return Err(AppError::Conflict(format!(
                "A borrow record for copy {} and user '{}' already exists",
                copy.id, record.library_user
            )));
        }
        let created = BorrowRecord {
            id: Uuid::new_v4(),
            borrow_date: record.borrow_date,
            return_date: record.return_date,
            is_returned: record.is_returned,
            book_copy_id: copy.id,
            owl_id: copy.book_id,
            library_user: record.library_user.clone(),
        };
        tables.records.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<BorrowRecord>> {
        Ok(self.lock().records.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_book_and_user(
        &self,
        owl_id: Uuid,
        username: &str,
    ) -> AppResult<Option<BorrowRecord>> {
        Ok(self
            .lock()
            .records
            .iter()
            .filter(|r| r.owl_id == owl_id && r.library_user == username)
            .max_by_key(|r| r.borrow_date)
            .cloned())
    }

    async fn find_all_by_user(&self, username: &str) -> AppResult<Vec<BorrowRecord>> {
        let mut records: Vec<BorrowRecord> = self
            .lock()
            .records
            .iter()
            .filter(|r| r.library_user == username)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date));
        Ok(records)
    }

    async fn find_all_by_return_status(&self, is_returned: bool) -> AppResult<Vec<BorrowRecord>> {
        let mut records: Vec<BorrowRecord> = self
            .lock()
            .records
            .iter()
            .filter(|r| r.is_returned == is_returned)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.borrow_date);
        Ok(records)
    }

    async fn update_return_status(&self, id: Uuid, is_returned: bool) -> AppResult<u64> {
        let mut tables = self.lock();
        match tables.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.is_returned = is_returned;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_dates_and_status(
        &self,
        id: Uuid,
        borrow_date: DateTime<Utc>,
        return_date: DateTime<Utc>,
        is_returned: bool,
    ) -> AppResult<u64> {
        check_chronology(borrow_date, return_date)?;
        let mut tables = self.lock();
        match tables.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.borrow_date = borrow_date;
                record.return_date = return_date;
                record.is_returned = is_returned;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<u64> {
        let mut tables = self.lock();
        let before = tables.records.len();
        tables.records.retain(|r| r.id != id);
        Ok((before - tables.records.len()) as u64)
    }
}
