//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::author::Author;

/// Book with its author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub owl_id: Uuid,
    pub title: String,
    pub author: Author,
}

/// Flat row of a book joined with its author
#[derive(Debug, FromRow)]
pub struct BookRow {
    pub owl_id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_is_popular: bool,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            owl_id: row.owl_id,
            title: row.title,
            author: Author {
                id: row.author_id,
                name: row.author_name,
                is_popular: row.author_is_popular,
            },
        }
    }
}

/// Book insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author_id: Uuid,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    /// Exact name of an existing author
    pub author_name: String,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub author_name: Option<String>,
}
