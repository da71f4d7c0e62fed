//! Public catalog browsing

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{error::AppResult, models::book::Book};

/// Book listing filter
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive fragment of the title
    pub title: Option<String>,
}

/// List books, optionally filtered by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Books ordered by title", body = Vec<Book>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = match query.title.as_deref() {
        Some(fragment) => state.services.catalog.find_books_by_title(fragment).await?,
        None => state.services.catalog.get_all_books().await?,
    };
    Ok(Json(books))
}

/// Get a book by owl id
#[utoipa::path(
    get,
    path = "/books/{owl_id}",
    tag = "books",
    params(
        ("owl_id" = Uuid, Path, description = "Book owl id")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(owl_id): Path<Uuid>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.book(owl_id).await?;
    Ok(Json(book))
}

/// Books none of whose copies is currently borrowed
#[utoipa::path(
    get,
    path = "/books/available",
    tag = "books",
    responses(
        (status = 200, description = "Available books", body = Vec<Book>)
    )
)]
pub async fn list_available_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.availability.available_books().await?;
    Ok(Json(books))
}

/// Books by every author whose name contains the fragment
#[utoipa::path(
    get,
    path = "/books/by-author/{name}",
    tag = "books",
    params(
        ("name" = String, Path, description = "Fragment of the author name, case ignored")
    ),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>)
    )
)]
pub async fn list_books_by_author(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state
        .services
        .catalog
        .get_all_books_by_similar_author_name(&name)
        .await?;
    Ok(Json(books))
}
