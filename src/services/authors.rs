//! Author management service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetails, CreateAuthor, UpdateAuthor},
        book::BookSummary,
        Page, PageWindow,
    },
    repository::{AuthorStore, BookStore, Repository},
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
    page_size: i64,
}

impl AuthorsService {
    pub fn new(repository: Repository, page_size: i64) -> Self {
        Self { repository, page_size }
    }

    /// Authors ordered by last name then first name, one page at a time
    pub async fn list(&self, page: Option<i64>) -> AppResult<Page<Author>> {
        let total = self.repository.count_authors().await?;
        let window = PageWindow::new(page, self.page_size, total)?;
        let authors = self
            .repository
            .list_authors(window.offset(), window.limit())
            .await?;
        Ok(window.into_page(authors))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.repository.get_author(id).await
    }

    /// Author with the books attributed to them
    pub async fn detail(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.get_author(id).await?;
        let books = self.repository.list_books_by_author(id).await?;
        Ok(AuthorDetails {
            author,
            books: books.iter().map(BookSummary::from).collect(),
        })
    }

    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.create_author(data).await?;
        tracing::info!(author_id = author.id, "Author {} created", author);
        Ok(author)
    }

    pub async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.update_author(id, data).await?;
        tracing::info!(author_id = id, "Author updated");
        Ok(author)
    }

    /// Delete an author; their books stay in the catalog without an author
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.delete_author(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.count_authors().await
    }
}
