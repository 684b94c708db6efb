//! Book catalog service

use std::sync::Arc;

use validator::Validate;

use super::Clock;
use crate::{
    error::AppResult,
    models::{
        book::{Book, BookDetails, BookSummary, CreateBook, UpdateBook},
        book_instance::ShelfCopy,
        Page, PageWindow,
    },
    repository::{AuthorStore, BookInstanceStore, BookStore, GenreStore, Repository},
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    page_size: i64,
    clock: Arc<dyn Clock>,
}

impl BooksService {
    pub fn new(repository: Repository, page_size: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            page_size,
            clock,
        }
    }

    /// Books ordered by title, one page at a time
    pub async fn list(&self, page: Option<i64>) -> AppResult<Page<BookSummary>> {
        let total = self.repository.count_books().await?;
        let window = PageWindow::new(page, self.page_size, total)?;
        let books = self
            .repository
            .list_books(window.offset(), window.limit())
            .await?;
        Ok(window.into_page(books.iter().map(BookSummary::from).collect()))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.get_book(id).await
    }

    /// Book with all of its copies, borrowers left out
    pub async fn detail(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.get_book(id).await?;
        let today = self.clock.today();
        let instances = self
            .repository
            .list_instances_of_book(id)
            .await?
            .into_iter()
            .map(|row| ShelfCopy::from(row.into_details(today)))
            .collect();
        Ok(BookDetails { book, instances })
    }

    /// Create a book; the ISBN must not be used by another book
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        data.validate()?;
        if let Some(author_id) = data.author_id {
            self.repository.get_author(author_id).await?;
        }
        self.check_genres(&data.genre_ids).await?;

        let book = self.repository.create_book(data).await?;
        tracing::info!(book_id = book.id, isbn = %book.isbn, "Book created");
        Ok(book)
    }

    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        data.validate()?;
        if let Some(Some(author_id)) = data.author_id {
            self.repository.get_author(author_id).await?;
        }
        if let Some(ref genre_ids) = data.genre_ids {
            self.check_genres(genre_ids).await?;
        }

        let book = self.repository.update_book(id, data).await?;
        tracing::info!(book_id = id, "Book updated");
        Ok(book)
    }

    /// Delete a book; refused while copies of it are still recorded
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.delete_book(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.count_books().await
    }

    async fn check_genres(&self, genre_ids: &[i32]) -> AppResult<()> {
        for id in genre_ids {
            self.repository.get_genre(*id).await?;
        }
        Ok(())
    }
}
