//! Repository layer: storage port and its adapters
//!
//! Services never talk to a database directly. They hold a [`Repository`],
//! a cheap handle around an injected [`CatalogStore`]:
//! - [`postgres::PgStore`] for production (sqlx, schema in `migrations/`)
//! - [`memory::InMemoryStore`] for tests and throwaway instances

pub mod memory;
pub mod postgres;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{Book, CreateBook, UpdateBook},
        book_instance::{BookInstance, CreateBookInstance, LoanStatus, TitledBookInstance, UpdateBookInstance},
        genre::{CreateGenre, Genre},
        user::{NewUser, User},
        CatalogSummary,
    },
};

#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn create_genre(&self, data: &CreateGenre) -> AppResult<Genre>;

    async fn get_genre(&self, id: i32) -> AppResult<Genre>;

    /// All genres ordered by name
    async fn list_genres(&self) -> AppResult<Vec<Genre>>;

    /// Delete a genre; its links to books go with it
    async fn delete_genre(&self, id: i32) -> AppResult<()>;
}

#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn create_author(&self, data: &CreateAuthor) -> AppResult<Author>;

    async fn get_author(&self, id: i32) -> AppResult<Author>;

    async fn update_author(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author>;

    /// Delete an author; books keep existing with their author cleared
    async fn delete_author(&self, id: i32) -> AppResult<()>;

    /// Authors ordered by last name then first name
    async fn list_authors(&self, offset: i64, limit: i64) -> AppResult<Vec<Author>>;

    async fn count_authors(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a book and its genre links; a duplicate ISBN is a constraint error
    async fn create_book(&self, data: &CreateBook) -> AppResult<Book>;

    async fn get_book(&self, id: i32) -> AppResult<Book>;

    async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<Book>;

    /// Delete a book; refused while copies of it exist
    async fn delete_book(&self, id: i32) -> AppResult<()>;

    /// Books ordered by title
    async fn list_books(&self, offset: i64, limit: i64) -> AppResult<Vec<Book>>;

    async fn list_books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;

    async fn count_books(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    async fn create_book_instance(&self, data: &CreateBookInstance) -> AppResult<BookInstance>;

    async fn get_book_instance(&self, id: Uuid) -> AppResult<BookInstance>;

    async fn update_book_instance(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance>;

    /// Overwrite the due-back date (last write wins)
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance>;

    async fn delete_book_instance(&self, id: Uuid) -> AppResult<()>;

    /// Copies ordered by due-back date, unset dates last
    async fn list_book_instances(
        &self,
        status: Option<LoanStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<TitledBookInstance>>;

    async fn count_book_instances(&self, status: Option<LoanStatus>) -> AppResult<i64>;

    async fn list_instances_of_book(&self, book_id: i32) -> AppResult<Vec<TitledBookInstance>>;

    /// Copies on loan to `user_id`, ordered by due-back date
    async fn list_borrowed_by_user(&self, user_id: i32) -> AppResult<Vec<TitledBookInstance>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert an account; a duplicate username is a constraint error
    async fn create_user(&self, data: &NewUser) -> AppResult<User>;

    async fn get_user(&self, id: i32) -> AppResult<User>;

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Delete an account; copies it borrowed keep existing without a borrower
    async fn delete_user(&self, id: i32) -> AppResult<()>;
}

/// Complete storage port used by the services
#[async_trait]
pub trait CatalogStore: GenreStore + AuthorStore + BookStore + BookInstanceStore + UserStore {
    /// Dashboard counters read from one consistent snapshot
    async fn summary(&self) -> AppResult<CatalogSummary>;
}

/// Handle to the catalog store shared by all services
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn CatalogStore>,
}

impl Repository {
    /// Wrap an arbitrary store implementation
    pub fn new(store: impl CatalogStore + 'static) -> Self {
        Self { store: Arc::new(store) }
    }

    /// Repository backed by PostgreSQL
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self::new(postgres::PgStore::new(pool))
    }

    /// Repository backed by process memory
    pub fn in_memory() -> Self {
        Self::new(memory::InMemoryStore::new())
    }
}

impl Deref for Repository {
    type Target = dyn CatalogStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}
