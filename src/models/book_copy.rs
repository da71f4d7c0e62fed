//! Book copy (lendable unit) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Physical kind of a copy, stored as a two letter code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum CopyType {
    Paperback,
    Hardcover,
    Handmade,
    #[default]
    #[serde(rename = "NOTDEFINED", alias = "UNDEFINED")]
    Undefined,
}

impl CopyType {
    pub fn code(&self) -> &'static str {
        match self {
            CopyType::Paperback => "pb",
            CopyType::Hardcover => "hc",
            CopyType::Handmade => "hm",
            CopyType::Undefined => "nd",
        }
    }
}

impl std::fmt::Display for CopyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CopyType::Paperback => "PAPERBACK",
            CopyType::Hardcover => "HARDCOVER",
            CopyType::Handmade => "HANDMADE",
            CopyType::Undefined => "NOTDEFINED",
        };
        write!(f, "{}", label)
    }
}

/// Accepts the stored code (`pb`) or the label (`PAPERBACK`), any case
impl std::str::FromStr for CopyType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pb" | "paperback" => Ok(CopyType::Paperback),
            "hc" | "hardcover" => Ok(CopyType::Hardcover),
            "hm" | "handmade" => Ok(CopyType::Handmade),
            "nd" | "notdefined" | "undefined" | "" => Ok(CopyType::Undefined),
            other => Err(AppError::Validation(format!("Invalid copy type: {}", other))),
        }
    }
}

/// Copy of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookCopy {
    pub id: Uuid,
    pub book_id: Uuid,
    pub copy_type: CopyType,
}

/// Row as stored, with the raw type code
#[derive(Debug, FromRow)]
pub struct BookCopyRow {
    pub id: Uuid,
    pub book_id: Uuid,
    pub copy_type: String,
}

impl From<BookCopyRow> for BookCopy {
    fn from(row: BookCopyRow) -> Self {
        Self {
            id: row.id,
            book_id: row.book_id,
            // the table constrains codes; anything else reads as undefined
            copy_type: row.copy_type.parse().unwrap_or_default(),
        }
    }
}

/// Copy insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookCopy {
    pub book_id: Uuid,
    pub copy_type: CopyType,
}

/// Create copy request. The book is designated by owl id or by exact title.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookCopy {
    pub owl_id: Option<String>,
    pub title: Option<String>,
    /// `pb`, `hc`, `hm`, `nd` or the matching label; defaults to undefined
    pub copy_type: Option<String>,
}

/// Update copy request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookCopy {
    pub copy_type: String,
}
