//! Catalog management service

use uuid::Uuid;

use super::popularity;
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, NewAuthor, UpdateAuthor},
        book::{Book, NewBook, UpdateBook},
        book_copy::{BookCopy, CopyType, NewBookCopy},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

/// Zero affected rows means the target does not exist
fn expect_affected(rows: u64, what: impl FnOnce() -> String) -> AppResult<()> {
    if rows == 0 {
        Err(AppError::NotFound(what()))
    } else {
        Ok(())
    }
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register an author; popularity is derived from the name
    pub async fn add_author(&self, name: &str) -> AppResult<Author> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Author name must not be empty".to_string()));
        }
        let author = NewAuthor {
            name: name.to_string(),
            is_popular: popularity::is_popular(name),
        };
        let created = self.repository.catalog.insert_author(&author).await?;
        tracing::info!(
            "Author '{}' added (popular: {})",
            created.name, created.is_popular
        );
        Ok(created)
    }

    /// Add a book by an existing author, designated by exact name
    pub async fn add_book(&self, title: &str, author_name: &str) -> AppResult<Book> {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }
        let author = self.author_by_name(author_name).await?;
        let created = self
            .repository
            .catalog
            .insert_book(&NewBook {
                title: title.to_string(),
                author_id: author.id,
            })
            .await?;
        tracing::info!("Book '{}' by '{}' added as {}", created.title, author.name, created.owl_id);
        Ok(created)
    }

    /// Add a copy of the book with this exact title
    pub async fn add_book_copy(&self, book_title: &str, copy_type: CopyType) -> AppResult<BookCopy> {
        let mut books = self
            .repository
            .catalog
            .find_books_exact_title(book_title)
            .await?;
        let book = match books.len() {
            0 => {
                return Err(AppError::NotFound(format!(
                    "Book titled '{}' not found",
                    book_title
                )))
            }
            1 => books.remove(0),
            n => {
                return Err(AppError::Validation(format!(
                    "{} books are titled '{}', designate the book by owl id",
                    n, book_title
                )))
            }
        };
        self.insert_copy(book.owl_id, copy_type).await
    }

    /// Add a copy of the book with this owl id
    pub async fn add_book_copy_by_id(&self, owl_id: Uuid, copy_type: CopyType) -> AppResult<BookCopy> {
        self.book(owl_id).await?;
        self.insert_copy(owl_id, copy_type).await
    }

    async fn insert_copy(&self, owl_id: Uuid, copy_type: CopyType) -> AppResult<BookCopy> {
        let created = self
            .repository
            .catalog
            .insert_copy(&NewBookCopy {
                book_id: owl_id,
                copy_type,
            })
            .await?;
        tracing::info!("Copy {} ({}) of book {} added", created.id, copy_type, owl_id);
        Ok(created)
    }

    /// Whether the catalog store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.catalog.ping().await
    }

    pub async fn get_all_books(&self) -> AppResult<Vec<Book>> {
        self.repository.catalog.list_books().await
    }

    pub async fn book(&self, owl_id: Uuid) -> AppResult<Book> {
        self.repository
            .catalog
            .find_book_by_id(owl_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with owl id {} not found", owl_id)))
    }

    /// Case-insensitive title search
    pub async fn find_books_by_title(&self, fragment: &str) -> AppResult<Vec<Book>> {
        self.repository.catalog.find_books_like_title(fragment).await
    }

    /// Books of every author whose name contains the fragment, ignoring case
    pub async fn get_all_books_by_similar_author_name(&self, fragment: &str) -> AppResult<Vec<Book>> {
        let author_ids: Vec<Uuid> = self
            .repository
            .catalog
            .find_authors_like(fragment)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        self.repository
            .catalog
            .find_books_by_author_ids(&author_ids)
            .await
    }

    // =========================================================================
    // MAINTENANCE
    // =========================================================================

    pub async fn update_author(&self, id: Uuid, update: UpdateAuthor) -> AppResult<()> {
        if let Some(ref name) = update.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Author name must not be empty".to_string()));
            }
            let rows = self.repository.catalog.update_author_name(id, name).await?;
            expect_affected(rows, || format!("Author with id {} not found", id))?;
        }
        if let Some(is_popular) = update.is_popular {
            let rows = self
                .repository
                .catalog
                .update_author_popularity(id, is_popular)
                .await?;
            expect_affected(rows, || format!("Author with id {} not found", id))?;
        }
        Ok(())
    }

    /// Fails while any book references the author
    pub async fn delete_author(&self, id: Uuid) -> AppResult<()> {
        let rows = self.repository.catalog.delete_author(id).await?;
        expect_affected(rows, || format!("Author with id {} not found", id))?;
        tracing::info!("Author {} deleted", id);
        Ok(())
    }

    /// Change title and/or author. Everything is resolved before the single write.
    pub async fn update_book(&self, owl_id: Uuid, update: UpdateBook) -> AppResult<Book> {
        if let Some(ref title) = update.title {
            if title.trim().is_empty() {
                return Err(AppError::Validation("Title must not be empty".to_string()));
            }
        }
        let author = match update.author_name {
            Some(ref name) => Some(self.author_by_name(name).await?),
            None => None,
        };

        let catalog = &self.repository.catalog;
        let rows = match (update.title.as_deref(), author) {
            (Some(title), Some(author)) => catalog.update_book(owl_id, title, author.id).await?,
            (Some(title), None) => catalog.update_book_title(owl_id, title).await?,
            (None, Some(author)) => catalog.update_book_author(owl_id, author.id).await?,
            (None, None) => return self.book(owl_id).await,
        };
        expect_affected(rows, || format!("Book with owl id {} not found", owl_id))?;
        tracing::info!("Book {} updated", owl_id);
        self.book(owl_id).await
    }

    /// Fails while any copy references the book
    pub async fn delete_book(&self, owl_id: Uuid) -> AppResult<()> {
        let rows = self.repository.catalog.delete_book(owl_id).await?;
        expect_affected(rows, || format!("Book with owl id {} not found", owl_id))?;
        tracing::info!("Book {} deleted", owl_id);
        Ok(())
    }

    pub async fn update_copy_type(&self, id: Uuid, copy_type: CopyType) -> AppResult<BookCopy> {
        let rows = self.repository.catalog.update_copy_type(id, copy_type).await?;
        expect_affected(rows, || format!("Book copy {} not found", id))?;
        self.repository
            .catalog
            .find_copy_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    /// Fails while any borrow record references the copy
    pub async fn delete_copy(&self, id: Uuid) -> AppResult<()> {
        let rows = self.repository.catalog.delete_copy(id).await?;
        expect_affected(rows, || format!("Book copy {} not found", id))?;
        tracing::info!("Book copy {} deleted", id);
        Ok(())
    }

    async fn author_by_name(&self, name: &str) -> AppResult<Author> {
        self.repository
            .catalog
            .find_author_exact(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author '{}' not found", name)))
    }
}
