//! Availability of copies and books

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, book_copy::BookCopy},
    repository::Repository,
};

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
}

impl AvailabilityService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Distinct copy ids with an active (not returned) borrow record
    pub async fn borrowed_copy_ids(&self) -> AppResult<HashSet<Uuid>> {
        let active = self
            .repository
            .borrow_records
            .find_all_by_return_status(false)
            .await?;
        Ok(active.into_iter().map(|r| r.book_copy_id).collect())
    }

    /// All copies minus the borrowed ones
    pub async fn available_book_copy_ids(&self) -> AppResult<HashSet<Uuid>> {
        let borrowed = self.borrowed_copy_ids().await?;
        let copies = self.repository.catalog.list_copies().await?;
        Ok(copies
            .into_iter()
            .map(|c| c.id)
            .filter(|id| !borrowed.contains(id))
            .collect())
    }

    /// Books none of whose copies is borrowed.
    ///
    /// A single borrowed copy excludes its book even if other copies are on
    /// the shelf. Books without any copy are listed.
    pub async fn available_books(&self) -> AppResult<Vec<Book>> {
        let borrowed = self.borrowed_copy_ids().await?;
        let excluded: HashSet<Uuid> = self
            .repository
            .catalog
            .list_copies()
            .await?
            .into_iter()
            .filter(|c| borrowed.contains(&c.id))
            .map(|c| c.book_id)
            .collect();

        let books = self.repository.catalog.list_books().await?;
        Ok(books
            .into_iter()
            .filter(|b| !excluded.contains(&b.owl_id))
            .collect())
    }

    /// First copy of the book (by id) nobody currently holds
    pub async fn first_available_copy(&self, owl_id: Uuid) -> AppResult<BookCopy> {
        let copies = self.repository.catalog.find_copies_by_book_id(owl_id).await?;
        if copies.is_empty() {
            return Err(AppError::NotFound(format!(
                "No copy of book {} found",
                owl_id
            )));
        }
        let borrowed = self.borrowed_copy_ids().await?;
        copies
            .into_iter()
            .find(|c| !borrowed.contains(&c.id))
            .ok_or_else(|| {
                AppError::NotFound(format!("No copy of book {} is currently available", owl_id))
            })
    }
}
