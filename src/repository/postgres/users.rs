//! User account queries

use async_trait::async_trait;

use super::{constraint_violation, PgStore};
use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, User},
    repository::UserStore,
};

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: &NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, can_mark_returned)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(data.can_mark_returned)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_violation(e, |_| format!("Username '{}' is already taken", data.username)))
    }

    async fn get_user(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i32) -> AppResult<()> {
        // book_instances.borrower_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
