//! Borrow record model and related types

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Lending history of one user for one copy. Re-borrowing updates it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: Uuid,
    pub borrow_date: DateTime<Utc>,
    /// Due date
    pub return_date: DateTime<Utc>,
    pub is_returned: bool,
    pub book_copy_id: Uuid,
    /// Owl id of the borrowed copy's book
    pub owl_id: Uuid,
    pub library_user: String,
}

/// Borrow record insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBorrowRecord {
    pub borrow_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub is_returned: bool,
    pub book_copy_id: Uuid,
    pub library_user: String,
}

impl NewBorrowRecord {
    pub fn validate(&self) -> AppResult<()> {
        check_chronology(self.borrow_date, self.return_date)
    }
}

/// Borrow date must not be after the return date
pub fn check_chronology(borrow_date: DateTime<Utc>, return_date: DateTime<Utc>) -> AppResult<()> {
    if borrow_date > return_date {
        return Err(AppError::Validation(format!(
            "Borrow date {} is after return date {}",
            borrow_date, return_date
        )));
    }
    Ok(())
}

/// When a user may borrow a book next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextBorrowDate {
    /// The user never borrowed this book
    NeverBorrowed,
    /// The user still holds the book
    NotReturned,
    /// Returned and the cooldown is over
    CooldownOver,
    /// Returned, cooldown runs until the given instant
    After(DateTime<Utc>),
}

impl std::fmt::Display for NextBorrowDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextBorrowDate::NeverBorrowed => write!(f, "You can borrow this book immediately"),
            NextBorrowDate::NotReturned => write!(
                f,
                "You have not returned this book yet, kindly return it first"
            ),
            NextBorrowDate::CooldownOver => {
                write!(f, "Book is now available, you can borrow it immediately")
            }
            NextBorrowDate::After(date) => write!(
                f,
                "You can borrow this book again on {}",
                format_day_month_year(*date)
            ),
        }
    }
}

/// `D/M/YYYY` without zero padding
pub fn format_day_month_year(date: DateTime<Utc>) -> String {
    let day = date.date_naive();
    format!("{}/{}/{}", day.day(), day.month(), day.year())
}

/// Borrow / return request
#[derive(Debug, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub owl_id: Option<String>,
}
