//! Borrowing endpoints for the authenticated user

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::borrow_record::{BorrowRecord, BorrowRequest, NextBorrowDate},
};

use super::AuthenticatedUser;

/// Plain status message
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// When the caller may borrow a book next
#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub owl_id: Uuid,
    pub message: String,
    /// Set only while a cooldown is running
    pub next_borrow_date: Option<DateTime<Utc>>,
}

/// Owl ids arrive as strings in request bodies
pub(crate) fn parse_owl_id(raw: Option<&str>) -> AppResult<Uuid> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("owl_id is required".to_string()))?;
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid owl id '{}'", raw)))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "lending",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowRecord),
        (status = 400, description = "Missing or malformed owl id"),
        (status = 404, description = "Book, free copy or user not found"),
        (status = 409, description = "Concurrent borrow of the same copy"),
        (status = 422, description = "Cooldown not elapsed")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    let owl_id = parse_owl_id(request.owl_id.as_deref())?;

    let record = state.services.lending.borrow_book(owl_id, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Return a borrowed book
#[utoipa::path(
    put,
    path = "/return",
    tag = "lending",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Return processed", body = MessageResponse),
        (status = 400, description = "Missing or malformed owl id"),
        (status = 404, description = "No borrow record for this book")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<MessageResponse>> {
    let owl_id = parse_owl_id(request.owl_id.as_deref())?;

    let returned = state.services.lending.return_book(owl_id, &claims.sub).await?;
    let message = if returned {
        "Book returned successfully"
    } else {
        "Book not returned, please try again"
    };
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

/// When the caller may borrow the book next
#[utoipa::path(
    get,
    path = "/books/{owl_id}/availability",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(
        ("owl_id" = Uuid, Path, description = "Book owl id")
    ),
    responses(
        (status = 200, description = "Next borrow date", body = AvailabilityResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn next_borrow_date(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(owl_id): Path<Uuid>,
) -> AppResult<Json<AvailabilityResponse>> {
    let next = state
        .services
        .lending
        .next_borrow_date(owl_id, &claims.sub)
        .await?;

    let next_borrow_date = match next {
        NextBorrowDate::After(date) => Some(date),
        _ => None,
    };
    Ok(Json(AvailabilityResponse {
        owl_id,
        message: next.to_string(),
        next_borrow_date,
    }))
}

/// Every borrow record of the caller
#[utoipa::path(
    get,
    path = "/me/borrow-records",
    tag = "lending",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrow records, newest first", body = Vec<BorrowRecord>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_borrow_records(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    let records = state.services.lending.my_borrow_records(&claims.sub).await?;
    Ok(Json(records))
}
