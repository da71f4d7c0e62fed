//! Catalog repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{like_pattern, violation, CatalogRepository, Violation};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, NewAuthor},
        book::{Book, BookRow, NewBook},
        book_copy::{BookCopy, BookCopyRow, CopyType, NewBookCopy},
        user::{LibraryUser, NewLibraryUser},
    },
};

const BOOK_SELECT: &str = r#"
    SELECT b.owl_id, b.title,
           a.id AS author_id, a.name AS author_name, a.is_popular AS author_is_popular
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: Pool<Postgres>,
}

impl PgCatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_books(&self, condition: &str, bind: Option<String>) -> AppResult<Vec<Book>> {
        let sql = format!("{} {} ORDER BY b.title, a.name", BOOK_SELECT, condition);
        let mut query = sqlx::query_as::<_, BookRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }
}

/// Translate a failed delete: rows still referencing the target block it
fn protected_delete(err: sqlx::Error, what: &str) -> AppError {
    match violation(&err) {
        Some(Violation::ForeignKey) => {
            AppError::BusinessRule(format!("{} is still referenced and cannot be deleted", what))
        }
        _ => err.into(),
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    async fn insert_author(&self, author: &NewAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            "INSERT INTO authors (id, name, is_popular) VALUES ($1, $2, $3) RETURNING id, name, is_popular",
        )
        .bind(Uuid::new_v4())
        .bind(&author.name)
        .bind(author.is_popular)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => {
                AppError::BusinessRule(format!("Author '{}' already exists", author.name))
            }
            Some(Violation::Check) => AppError::Validation("Author name must not be empty".to_string()),
            _ => e.into(),
        })
    }

    async fn find_author_exact(&self, name: &str) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT id, name, is_popular FROM authors WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    async fn find_authors_like(&self, fragment: &str) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, name, is_popular FROM authors WHERE name ILIKE $1 ORDER BY name",
        )
        .bind(like_pattern(fragment))
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    async fn find_author_by_book_id(&self, owl_id: Uuid) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(
            r#"
            SELECT a.id, a.name, a.is_popular
            FROM authors a
            JOIN books b ON b.author_id = a.id
            WHERE b.owl_id = $1
            "#,
        )
        .bind(owl_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    async fn update_author_name(&self, id: Uuid, name: &str) -> AppResult<u64> {
        let result = sqlx::query("UPDATE authors SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match violation(&e) {
                Some(Violation::Unique) => {
                    AppError::BusinessRule(format!("Author '{}' already exists", name))
                }
                _ => e.into(),
            })?;
        Ok(result.rows_affected())
    }

    async fn update_author_popularity(&self, id: Uuid, is_popular: bool) -> AppResult<u64> {
        let result = sqlx::query("UPDATE authors SET is_popular = $1 WHERE id = $2")
            .bind(is_popular)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_author(&self, id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| protected_delete(e, "Author"))?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    async fn insert_book(&self, book: &NewBook) -> AppResult<Book> {
        let owl_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO books (owl_id, title, author_id) VALUES ($1, $2, $3) RETURNING owl_id",
        )
        .bind(Uuid::new_v4())
        .bind(&book.title)
        .bind(book.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => AppError::BusinessRule(format!(
                "Book '{}' already exists for this author",
                book.title
            )),
            Some(Violation::ForeignKey) => {
                AppError::NotFound(format!("Author with id {} not found", book.author_id))
            }
            Some(Violation::Check) => AppError::Validation("Title must not be empty".to_string()),
            _ => e.into(),
        })?;

        self.find_book_by_id(owl_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Inserted book {} vanished", owl_id)))
    }

    async fn find_book_by_id(&self, owl_id: Uuid) -> AppResult<Option<Book>> {
        let sql = format!("{} WHERE b.owl_id = $1", BOOK_SELECT);
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(owl_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Book::from))
    }

    async fn find_books_exact_title(&self, title: &str) -> AppResult<Vec<Book>> {
        self.fetch_books("WHERE b.title = $1", Some(title.to_string()))
            .await
    }

    async fn find_books_like_title(&self, fragment: &str) -> AppResult<Vec<Book>> {
        self.fetch_books("WHERE b.title ILIKE $1", Some(like_pattern(fragment)))
            .await
    }

    async fn find_books_by_author_ids(&self, author_ids: &[Uuid]) -> AppResult<Vec<Book>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "{} WHERE b.author_id = ANY($1) ORDER BY b.title, a.name",
            BOOK_SELECT
        );
        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(author_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.fetch_books("", None).await
    }

    async fn update_book_title(&self, owl_id: Uuid, title: &str) -> AppResult<u64> {
        let result = sqlx::query("UPDATE books SET title = $1 WHERE owl_id = $2")
            .bind(title)
            .bind(owl_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match violation(&e) {
                Some(Violation::Unique) => AppError::BusinessRule(format!(
                    "Book '{}' already exists for this author",
                    title
                )),
                _ => e.into(),
            })?;
        Ok(result.rows_affected())
    }

    async fn update_book_author(&self, owl_id: Uuid, author_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("UPDATE books SET author_id = $1 WHERE owl_id = $2")
            .bind(author_id)
            .bind(owl_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match violation(&e) {
                Some(Violation::Unique) => AppError::BusinessRule(
                    "This author already has a book with the same title".to_string(),
                ),
                Some(Violation::ForeignKey) => {
                    AppError::NotFound(format!("Author with id {} not found", author_id))
                }
                _ => e.into(),
            })?;
        Ok(result.rows_affected())
    }

    async fn update_book(&self, owl_id: Uuid, title: &str, author_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("UPDATE books SET title = $1, author_id = $2 WHERE owl_id = $3")
            .bind(title)
            .bind(author_id)
            .bind(owl_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match violation(&e) {
                Some(Violation::Unique) => AppError::BusinessRule(format!(
                    "Book '{}' already exists for this author",
                    title
                )),
                Some(Violation::ForeignKey) => {
                    AppError::NotFound(format!("Author with id {} not found", author_id))
                }
                Some(Violation::Check) => AppError::Validation("Title must not be empty".to_string()),
                None => e.into(),
            })?;
        Ok(result.rows_affected())
    }

    async fn delete_book(&self, owl_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM books WHERE owl_id = $1")
            .bind(owl_id)
            .execute(&self.pool)
            .await
            .map_err(|e| protected_delete(e, "Book"))?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // COPIES
    // =========================================================================

    async fn insert_copy(&self, copy: &NewBookCopy) -> AppResult<BookCopy> {
        let row = sqlx::query_as::<_, BookCopyRow>(
            "INSERT INTO book_copies (id, book_id, copy_type) VALUES ($1, $2, $3) RETURNING id, book_id, copy_type",
        )
        .bind(Uuid::new_v4())
        .bind(copy.book_id)
        .bind(copy.copy_type.code())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::ForeignKey) => {
                AppError::NotFound(format!("Book with owl id {} not found", copy.book_id))
            }
            _ => e.into(),
        })?;
        Ok(row.into())
    }

    async fn find_copy_by_id(&self, id: Uuid) -> AppResult<Option<BookCopy>> {
        let row = sqlx::query_as::<_, BookCopyRow>(
            "SELECT id, book_id, copy_type FROM book_copies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(BookCopy::from))
    }

    async fn find_copies_by_book_id(&self, owl_id: Uuid) -> AppResult<Vec<BookCopy>> {
        let rows = sqlx::query_as::<_, BookCopyRow>(
            "SELECT id, book_id, copy_type FROM book_copies WHERE book_id = $1 ORDER BY id",
        )
        .bind(owl_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BookCopy::from).collect())
    }

    async fn list_copies(&self) -> AppResult<Vec<BookCopy>> {
        let rows = sqlx::query_as::<_, BookCopyRow>(
            "SELECT id, book_id, copy_type FROM book_copies ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BookCopy::from).collect())
    }

    async fn update_copy_type(&self, id: Uuid, copy_type: CopyType) -> AppResult<u64> {
        let result = sqlx::query("UPDATE book_copies SET copy_type = $1 WHERE id = $2")
            .bind(copy_type.code())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_copy(&self, id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM book_copies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| protected_delete(e, "Book copy"))?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // USERS
    // =========================================================================

    async fn insert_user(&self, user: &NewLibraryUser) -> AppResult<LibraryUser> {
        sqlx::query_as::<_, LibraryUser>(
            r#"
            INSERT INTO library_users (username, password_hash, is_admin)
            VALUES ($1, $2, $3)
            RETURNING username, password_hash, is_admin, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => {
                AppError::Conflict(format!("Username '{}' is already taken", user.username))
            }
            _ => e.into(),
        })
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<LibraryUser>> {
        let user = sqlx::query_as::<_, LibraryUser>(
            "SELECT username, password_hash, is_admin, created_at FROM library_users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
