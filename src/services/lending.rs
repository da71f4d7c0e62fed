//! Borrowing lifecycle: first borrow, re-borrow after cooldown, return
//!
//! Each (book, user) pair moves from no record to active, then cycles
//! between returned and active. A re-borrow reuses the existing record.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{availability::AvailabilityService, cooldown::CooldownPolicy, popularity};
use crate::{
    error::{AppError, AppResult},
    models::borrow_record::{check_chronology, BorrowRecord, NewBorrowRecord, NextBorrowDate},
    repository::Repository,
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    availability: AvailabilityService,
    policy: CooldownPolicy,
}

impl LendingService {
    pub fn new(repository: Repository, policy: CooldownPolicy) -> Self {
        Self {
            availability: AvailabilityService::new(repository.clone()),
            repository,
            policy,
        }
    }

    /// End of the cooldown started by a borrow of the given book
    pub async fn cooldown_end_date(
        &self,
        previous_borrow_date: DateTime<Utc>,
        owl_id: Uuid,
    ) -> AppResult<DateTime<Utc>> {
        let author = self
            .repository
            .catalog
            .find_author_by_book_id(owl_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with owl id {} not found", owl_id)))?;
        let popular = popularity::is_popular(&author.name);
        Ok(self.policy.cooldown_end_date(previous_borrow_date, popular))
    }

    /// Borrow a book, creating the record on first borrow or renewing the
    /// existing one once its cooldown is over
    pub async fn borrow_book(&self, owl_id: Uuid, username: &str) -> AppResult<BorrowRecord> {
        match self
            .repository
            .borrow_records
            .find_by_book_and_user(owl_id, username)
            .await?
        {
            None => self.create_borrow_record(owl_id, username).await,
            Some(previous) => self.try_borrow_again(owl_id, &previous).await,
        }
    }

    async fn create_borrow_record(&self, owl_id: Uuid, username: &str) -> AppResult<BorrowRecord> {
        let copy = self.availability.first_available_copy(owl_id).await?;
        let user = self
            .repository
            .catalog
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))?;

        let now = Utc::now();
        let record = NewBorrowRecord {
            borrow_date: now,
            return_date: now + self.policy.borrow_duration(),
            is_returned: false,
            book_copy_id: copy.id,
            library_user: user.username,
        };
        record.validate()?;

        let created = self.repository.borrow_records.insert(&record).await?;
        tracing::info!(
            "Borrow record {} created: copy {} of book {} to '{}' until {}",
            created.id, created.book_copy_id, owl_id, created.library_user, created.return_date
        );
        Ok(created)
    }

    async fn try_borrow_again(
        &self,
        owl_id: Uuid,
        previous: &BorrowRecord,
    ) -> AppResult<BorrowRecord> {
        let cooldown_end = self.cooldown_end_date(previous.borrow_date, owl_id).await?;
        let now = Utc::now();
        if !CooldownPolicy::is_elapsed(cooldown_end, now) {
            tracing::warn!(
                "Re-borrow of book {} by '{}' refused, cooldown runs until {}",
                owl_id, previous.library_user, cooldown_end
            );
            return Err(AppError::BusinessRule(
                "Cannot borrow book again too frequently".to_string(),
            ));
        }

        let return_date = now + self.policy.borrow_duration();
        check_chronology(now, return_date)?;
        let rows = self
            .repository
            .borrow_records
            .update_dates_and_status(previous.id, now, return_date, false)
            .await?;
        if rows != 1 {
            return Err(AppError::Internal(format!(
                "Re-borrow of record {} affected {} rows",
                previous.id, rows
            )));
        }

        let updated = self
            .repository
            .borrow_records
            .find_by_id(previous.id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Borrow record {} vanished after update", previous.id))
            })?;
        tracing::info!(
            "Borrow record {} renewed for '{}' until {}",
            updated.id, updated.library_user, updated.return_date
        );
        Ok(updated)
    }

    /// Mark the user's record for this book as returned.
    ///
    /// Returning an already returned book is accepted. Returns whether
    /// exactly one record was updated.
    pub async fn return_book(&self, owl_id: Uuid, username: &str) -> AppResult<bool> {
        let record = self
            .repository
            .borrow_records
            .find_by_book_and_user(owl_id, username)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No borrow record of book {} for user '{}'",
                    owl_id, username
                ))
            })?;

        let rows = self
            .repository
            .borrow_records
            .update_return_status(record.id, true)
            .await?;
        tracing::info!("Borrow record {} returned by '{}'", record.id, username);
        Ok(rows == 1)
    }

    /// When the user may borrow the book next
    pub async fn next_borrow_date(&self, owl_id: Uuid, username: &str) -> AppResult<NextBorrowDate> {
        self.repository
            .catalog
            .find_book_by_id(owl_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with owl id {} not found", owl_id)))?;

        let Some(record) = self
            .repository
            .borrow_records
            .find_by_book_and_user(owl_id, username)
            .await?
        else {
            return Ok(NextBorrowDate::NeverBorrowed);
        };
        if !record.is_returned {
            return Ok(NextBorrowDate::NotReturned);
        }

        let cooldown_end = self.cooldown_end_date(record.borrow_date, owl_id).await?;
        if CooldownPolicy::is_elapsed(cooldown_end, Utc::now()) {
            Ok(NextBorrowDate::CooldownOver)
        } else {
            Ok(NextBorrowDate::After(cooldown_end))
        }
    }

    /// Every record of the user, returned or not
    pub async fn my_borrow_records(&self, username: &str) -> AppResult<Vec<BorrowRecord>> {
        self.repository
            .borrow_records
            .find_all_by_user(username)
            .await
    }

    /// Administrative removal of a record
    pub async fn delete_borrow_record(&self, id: Uuid) -> AppResult<()> {
        match self.repository.borrow_records.delete_by_id(id).await? {
            0 => Err(AppError::NotFound(format!("Borrow record {} not found", id))),
            _ => {
                tracing::info!("Borrow record {} deleted", id);
                Ok(())
            }
        }
    }
}
