//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, catalog, health, lending, users};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Owl Library API",
        version = "1.0.0",
        description = "Book lending catalog REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Users
        users::register,
        users::login,
        // Books
        books::list_books,
        books::get_book,
        books::list_available_books,
        books::list_books_by_author,
        // Lending
        lending::borrow_book,
        lending::return_book,
        lending::next_borrow_date,
        lending::my_borrow_records,
        // Catalog maintenance
        catalog::create_author,
        catalog::update_author,
        catalog::delete_author,
        catalog::create_book,
        catalog::update_book,
        catalog::delete_book,
        catalog::create_copy,
        catalog::update_copy,
        catalog::delete_copy,
        catalog::list_available_copies,
        catalog::delete_borrow_record,
    ),
    components(
        schemas(
            // Users
            users::LoginRequest,
            users::LoginResponse,
            crate::models::user::LibraryUser,
            crate::models::user::RegisterUser,
            // Catalog
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book_copy::BookCopy,
            crate::models::book_copy::CopyType,
            crate::models::book_copy::CreateBookCopy,
            crate::models::book_copy::UpdateBookCopy,
            // Lending
            crate::models::borrow_record::BorrowRecord,
            crate::models::borrow_record::BorrowRequest,
            lending::MessageResponse,
            lending::AvailabilityResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User registration"),
        (name = "books", description = "Catalog browsing"),
        (name = "lending", description = "Borrowing and returning books"),
        (name = "catalog", description = "Catalog maintenance")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
