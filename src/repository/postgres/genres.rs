//! Genre queries

use async_trait::async_trait;

use super::PgStore;
use crate::{
    error::{AppError, AppResult},
    models::genre::{CreateGenre, Genre},
    repository::GenreStore,
};

#[async_trait]
impl GenreStore for PgStore {
    async fn create_genre(&self, data: &CreateGenre) -> AppResult<Genre> {
        let genre = sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING id, name")
            .bind(&data.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(genre)
    }

    async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(r#"SELECT id, name FROM genres ORDER BY name COLLATE "C", id"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn delete_genre(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Genre {} not found", id)));
        }
        Ok(())
    }
}
