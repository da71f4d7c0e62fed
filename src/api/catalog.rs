//! Catalog maintenance endpoints, restricted to administrators

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{Book, CreateBook, UpdateBook},
        book_copy::{BookCopy, CopyType, CreateBookCopy, UpdateBookCopy},
    },
};

use super::{lending::parse_owl_id, AuthenticatedUser};

// =============================================================================
// AUTHORS
// =============================================================================

/// Register an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 403, description = "Administrator required"),
        (status = 422, description = "Author already exists")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    claims.require_admin()?;
    request.validate()?;

    let author = state.services.catalog.add_author(&request.name).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Rename an author or override its popularity
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Author ID")
    ),
    request_body = UpdateAuthor,
    responses(
        (status = 204, description = "Author updated"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAuthor>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    request.validate()?;

    state.services.catalog.update_author(id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an author without books
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 422, description = "Author still has books")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// BOOKS
// =============================================================================

/// Add a book by an existing author
#[utoipa::path(
    post,
    path = "/books",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 404, description = "Author not found"),
        (status = 422, description = "Book already exists for this author")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_admin()?;
    request.validate()?;

    let book = state
        .services
        .catalog
        .add_book(&request.title, &request.author_name)
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Change a book's title or author
#[utoipa::path(
    put,
    path = "/books/{owl_id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("owl_id" = Uuid, Path, description = "Book owl id")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book or author not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(owl_id): Path<Uuid>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require_admin()?;
    request.validate()?;

    let book = state.services.catalog.update_book(owl_id, request).await?;
    Ok(Json(book))
}

/// Delete a book without copies
#[utoipa::path(
    delete,
    path = "/books/{owl_id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("owl_id" = Uuid, Path, description = "Book owl id")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(owl_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_book(owl_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// COPIES
// =============================================================================

/// Add a physical copy of a book
#[utoipa::path(
    post,
    path = "/copies",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateBookCopy,
    responses(
        (status = 201, description = "Copy created", body = BookCopy),
        (status = 400, description = "Unknown copy type, or ambiguous title"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBookCopy>,
) -> AppResult<(StatusCode, Json<BookCopy>)> {
    claims.require_admin()?;

    let copy_type = match request.copy_type.as_deref() {
        Some(raw) => raw.parse::<CopyType>()?,
        None => CopyType::default(),
    };
    let copy = match (request.owl_id.as_deref(), request.title.as_deref()) {
        (Some(raw), _) => {
            let owl_id = parse_owl_id(Some(raw))?;
            state.services.catalog.add_book_copy_by_id(owl_id, copy_type).await?
        }
        (None, Some(title)) => state.services.catalog.add_book_copy(title, copy_type).await?,
        (None, None) => {
            return Err(AppError::Validation(
                "Either owl_id or title is required".to_string(),
            ))
        }
    };
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Change the binding of a copy
#[utoipa::path(
    put,
    path = "/copies/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = UpdateBookCopy,
    responses(
        (status = 200, description = "Copy updated", body = BookCopy),
        (status = 400, description = "Unknown copy type"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookCopy>,
) -> AppResult<Json<BookCopy>> {
    claims.require_admin()?;

    let copy_type = request.copy_type.parse::<CopyType>()?;
    let copy = state.services.catalog.update_copy_type(id, copy_type).await?;
    Ok(Json(copy))
}

/// Delete a copy that was never borrowed
#[utoipa::path(
    delete,
    path = "/copies/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found"),
        (status = 422, description = "Copy still has borrow records")
    )
)]
pub async fn delete_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_copy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ids of the copies nobody currently holds
#[utoipa::path(
    get,
    path = "/copies/available",
    tag = "catalog",
    responses(
        (status = 200, description = "Available copy ids", body = Vec<Uuid>)
    )
)]
pub async fn list_available_copies(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Uuid>>> {
    let mut ids: Vec<Uuid> = state
        .services
        .availability
        .available_book_copy_ids()
        .await?
        .into_iter()
        .collect();
    ids.sort();
    Ok(Json(ids))
}

// =============================================================================
// BORROW RECORDS
// =============================================================================

/// Remove a borrow record
#[utoipa::path(
    delete,
    path = "/borrow-records/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Borrow record ID")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Record not found")
    )
)]
pub async fn delete_borrow_record(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.lending.delete_borrow_record(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
