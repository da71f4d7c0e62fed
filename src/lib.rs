//! Owl Library lending server
//!
//! A REST JSON API over a small library catalog: authors, books, physical
//! copies, users and the borrow records that tie them together. Re-borrowing
//! a book is throttled by a cooldown that depends on the author's popularity.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
