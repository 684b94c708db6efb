//! Genre service

use validator::Validate;

use crate::{
    error::AppResult,
    models::genre::{CreateGenre, Genre},
    repository::{GenreStore, Repository},
};

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
}

impl GenresService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        self.repository.list_genres().await
    }

    pub async fn create(&self, data: &CreateGenre) -> AppResult<Genre> {
        data.validate()?;
        let genre = self.repository.create_genre(data).await?;
        tracing::info!(genre_id = genre.id, "Genre {} created", genre);
        Ok(genre)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.delete_genre(id).await?;
        tracing::info!(genre_id = id, "Genre deleted");
        Ok(())
    }
}
