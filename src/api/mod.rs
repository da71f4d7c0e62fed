//! API handlers for the Owl library REST endpoints

pub mod books;
pub mod catalog;
pub mod health;
pub mod lending;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Users
        .route("/users", post(users::register))
        .route("/auth/login", post(users::login))
        // Browsing
        .route("/books", get(books::list_books).post(catalog::create_book))
        .route("/books/available", get(books::list_available_books))
        .route("/books/by-author/:name", get(books::list_books_by_author))
        .route(
            "/books/:owl_id",
            get(books::get_book)
                .put(catalog::update_book)
                .delete(catalog::delete_book),
        )
        // Lending
        .route("/books/:owl_id/availability", get(lending::next_borrow_date))
        .route("/borrow", post(lending::borrow_book))
        .route("/return", put(lending::return_book))
        .route("/me/borrow-records", get(lending::my_borrow_records))
        // Catalog maintenance
        .route("/authors", post(catalog::create_author))
        .route(
            "/authors/:id",
            put(catalog::update_author).delete(catalog::delete_author),
        )
        .route("/copies", post(catalog::create_copy))
        .route("/copies/available", get(catalog::list_available_copies))
        .route(
            "/copies/:id",
            put(catalog::update_copy).delete(catalog::delete_copy),
        )
        .route("/borrow-records/:id", delete(catalog::delete_borrow_record))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
