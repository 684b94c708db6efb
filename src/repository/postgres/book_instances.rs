//! Book instance queries

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::{constraint_violation, PgStore};
use crate::{
    error::{AppError, AppResult},
    models::book_instance::{
        BookInstance, CreateBookInstance, LoanStatus, TitledBookInstance, UpdateBookInstance,
    },
    repository::BookInstanceStore,
};

const TITLED_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, bi.imprint, bi.borrower_id, bi.due_back, bi.status,
           b.title AS book_title
    FROM book_instances bi
    JOIN books b ON b.id = bi.book_id
"#;

const INSTANCE_ORDER: &str = "ORDER BY bi.due_back ASC NULLS LAST, bi.id";

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Book instance {} not found", id))
}

#[async_trait]
impl BookInstanceStore for PgStore {
    async fn create_book_instance(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let instance = sqlx::query_as::<_, BookInstance>(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, borrower_id, due_back, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.borrower_id)
        .bind(data.due_back)
        .bind(data.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_violation(e, |_| "Unknown book or borrower".to_string()))?;
        Ok(instance)
    }

    async fn get_book_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn update_book_instance(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance> {
        let mut tx = self.pool.begin().await?;

        let mut instance =
            sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| not_found(id))?;

        data.apply_to(&mut instance);

        let instance = sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET book_id = $2, imprint = $3, borrower_id = $4, due_back = $5, status = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.borrower_id)
        .bind(instance.due_back)
        .bind(instance.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_violation(e, |_| "Unknown book or borrower".to_string()))?;

        tx.commit().await?;
        Ok(instance)
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            "UPDATE book_instances SET due_back = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(due_back)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    async fn delete_book_instance(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn list_book_instances(
        &self,
        status: Option<LoanStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<TitledBookInstance>> {
        let query = format!(
            "{} WHERE ($1::varchar IS NULL OR bi.status = $1) {} LIMIT $2 OFFSET $3",
            TITLED_SELECT, INSTANCE_ORDER
        );
        let rows = sqlx::query_as::<_, TitledBookInstance>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_book_instances(&self, status: Option<LoanStatus>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE ($1::varchar IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn list_instances_of_book(&self, book_id: i32) -> AppResult<Vec<TitledBookInstance>> {
        let query = format!("{} WHERE bi.book_id = $1 {}", TITLED_SELECT, INSTANCE_ORDER);
        let rows = sqlx::query_as::<_, TitledBookInstance>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_borrowed_by_user(&self, user_id: i32) -> AppResult<Vec<TitledBookInstance>> {
        let query = format!(
            "{} WHERE bi.borrower_id = $1 AND bi.status = $2 {}",
            TITLED_SELECT, INSTANCE_ORDER
        );
        let rows = sqlx::query_as::<_, TitledBookInstance>(&query)
            .bind(user_id)
            .bind(LoanStatus::OnLoan)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
