//! Shared setup for service and router tests

use std::sync::Arc;

use uuid::Uuid;

use super::Services;
use crate::{
    config::{AuthConfig, LendingConfig},
    models::{book_copy::CopyType, user::NewLibraryUser},
    repository::{memory::InMemoryRepository, CatalogRepository, Repository},
};

pub(crate) struct Library {
    pub store: Arc<InMemoryRepository>,
    pub services: Services,
}

impl Library {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryRepository::new());
        let repository = Repository::from_parts(store.clone(), store.clone());
        let services = Services::new(repository, AuthConfig::default(), &LendingConfig::default())
            .expect("default lending configuration is valid");
        Self { store, services }
    }

    /// Add the author if needed, the book and one copy; returns the owl id
    pub async fn shelve(&self, author: &str, title: &str) -> Uuid {
        if self.store.find_author_exact(author).await.unwrap().is_none() {
            self.services.catalog.add_author(author).await.unwrap();
        }
        let book = self.services.catalog.add_book(title, author).await.unwrap();
        self.services
            .catalog
            .add_book_copy_by_id(book.owl_id, CopyType::Hardcover)
            .await
            .unwrap();
        book.owl_id
    }

    /// Insert a user without paying for password hashing
    pub async fn member(&self, username: &str) {
        self.store
            .insert_user(&NewLibraryUser {
                username: username.to_string(),
                password_hash: "unused".to_string(),
                is_admin: false,
            })
            .await
            .unwrap();
    }
}
