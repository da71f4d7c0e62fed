//! Borrow records repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{violation, BorrowRecordRepository, Violation};
use crate::{
    error::{AppError, AppResult},
    models::borrow_record::{BorrowRecord, NewBorrowRecord},
};

const RECORD_SELECT: &str = r#"
    SELECT r.id, r.borrow_date, r.return_date, r.is_returned,
           r.book_copy_id, c.book_id AS owl_id, r.library_user
    FROM borrow_records r
    JOIN book_copies c ON c.id = r.book_copy_id
"#;

#[derive(Clone)]
pub struct PgBorrowRecordRepository {
    pool: Pool<Postgres>,
}

impl PgBorrowRecordRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowRecordRepository for PgBorrowRecordRepository {
    async fn insert(&self, record: &NewBorrowRecord) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>(
            r#"
            WITH inserted AS (
                INSERT INTO borrow_records (id, borrow_date, return_date, is_returned, book_copy_id, library_user)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT i.id, i.borrow_date, i.return_date, i.is_returned,
                   i.book_copy_id, c.book_id AS owl_id, i.library_user
            FROM inserted i
            JOIN book_copies c ON c.id = i.book_copy_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.borrow_date)
        .bind(record.return_date)
        .bind(record.is_returned)
        .bind(record.book_copy_id)
        .bind(&record.library_user)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => AppError::Conflict(format!(
                "A borrow record for copy {} and user '{}' already exists",
                record.book_copy_id, record.library_user
            )),
            Some(Violation::ForeignKey) => AppError::NotFound(format!(
                "Book copy {} or user '{}' not found",
                record.book_copy_id, record.library_user
            )),
            Some(Violation::Check) => {
                AppError::Validation("Borrow date must not be after return date".to_string())
            }
            None => e.into(),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<BorrowRecord>> {
        let sql = format!("{} WHERE r.id = $1", RECORD_SELECT);
        let record = sqlx::query_as::<_, BorrowRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_by_book_and_user(
        &self,
        owl_id: Uuid,
        username: &str,
    ) -> AppResult<Option<BorrowRecord>> {
        let sql = format!(
            "{} WHERE c.book_id = $1 AND r.library_user = $2 ORDER BY r.borrow_date DESC LIMIT 1",
            RECORD_SELECT
        );
        let record = sqlx::query_as::<_, BorrowRecord>(&sql)
            .bind(owl_id)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_all_by_user(&self, username: &str) -> AppResult<Vec<BorrowRecord>> {
        let sql = format!(
            "{} WHERE r.library_user = $1 ORDER BY r.borrow_date DESC",
            RECORD_SELECT
        );
        let records = sqlx::query_as::<_, BorrowRecord>(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn find_all_by_return_status(&self, is_returned: bool) -> AppResult<Vec<BorrowRecord>> {
        let sql = format!(
            "{} WHERE r.is_returned = $1 ORDER BY r.borrow_date",
            RECORD_SELECT
        );
        let records = sqlx::query_as::<_, BorrowRecord>(&sql)
            .bind(is_returned)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn update_return_status(&self, id: Uuid, is_returned: bool) -> AppResult<u64> {
        let result = sqlx::query("UPDATE borrow_records SET is_returned = $1 WHERE id = $2")
            .bind(is_returned)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn update_dates_and_status(
        &self,
        id: Uuid,
        borrow_date: DateTime<Utc>,
        return_date: DateTime<Utc>,
        is_returned: bool,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE borrow_records SET borrow_date = $1, return_date = $2, is_returned = $3 WHERE id = $4",
        )
        .bind(borrow_date)
        .bind(return_date)
        .bind(is_returned)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Check) => {
                AppError::Validation("Borrow date must not be after return date".to_string())
            }
            _ => e.into(),
        })?;
        Ok(result.rows_affected())
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM borrow_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
