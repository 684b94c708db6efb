//! In-memory catalog store
//!
//! Keeps every table behind one lock, so operations touching several tables
//! (deleting an author, deleting a user) are atomic and every read sees a
//! consistent snapshot. Enforces the same constraints as the SQL schema.
//! Nothing is persisted.
//!
//! Names sort by plain string comparison, which the Postgres queries match
//! with `COLLATE "C"`; usernames compare after Unicode lowercasing, like the
//! `LOWER(username)` index.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthorStore, BookInstanceStore, BookStore, CatalogStore, GenreStore, UserStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{normalize_genre_ids, Book, BookRow, CreateBook, UpdateBook},
        book_instance::{
            BookInstance, CreateBookInstance, LoanStatus, TitledBookInstance, UpdateBookInstance,
        },
        genre::{CreateGenre, Genre},
        user::{NewUser, User},
        CatalogSummary,
    },
};

#[derive(Default)]
struct Tables {
    genres: BTreeMap<i32, Genre>,
    authors: BTreeMap<i32, Author>,
    books: BTreeMap<i32, StoredBook>,
    instances: HashMap<Uuid, BookInstance>,
    users: BTreeMap<i32, User>,
    last_id: i32,
}

struct StoredBook {
    row: BookRow,
    genre_ids: Vec<i32>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn book(&self, stored: &StoredBook) -> Book {
        let genres = stored
            .genre_ids
            .iter()
            .filter_map(|id| self.genres.get(id).cloned())
            .collect();
        stored.row.clone().with_genres(genres)
    }

    fn check_author(&self, author_id: Option<i32>) -> AppResult<()> {
        match author_id {
            Some(id) if !self.authors.contains_key(&id) => {
                Err(AppError::Constraint(format!("Unknown author {}", id)))
            }
            _ => Ok(()),
        }
    }

    fn check_genres(&self, genre_ids: &[i32]) -> AppResult<()> {
        match genre_ids.iter().find(|id| !self.genres.contains_key(id)) {
            Some(id) => Err(AppError::Constraint(format!("Unknown genre {}", id))),
            None => Ok(()),
        }
    }

    fn check_isbn(&self, isbn: &str, exclude: Option<i32>) -> AppResult<()> {
        let taken = self
            .books
            .values()
            .any(|b| b.row.isbn == isbn && Some(b.row.id) != exclude);
        if taken {
            return Err(AppError::Constraint(format!(
                "A book with ISBN {} already exists",
                isbn
            )));
        }
        Ok(())
    }

    fn check_instance_refs(&self, instance: &BookInstance) -> AppResult<()> {
        if !self.books.contains_key(&instance.book_id) {
            return Err(AppError::Constraint("Unknown book or borrower".to_string()));
        }
        if let Some(borrower_id) = instance.borrower_id {
            if !self.users.contains_key(&borrower_id) {
                return Err(AppError::Constraint("Unknown book or borrower".to_string()));
            }
        }
        Ok(())
    }

    /// Copies matching `filter`, titled and ordered by due-back date (unset last)
    fn titled_instances(&self, filter: impl Fn(&BookInstance) -> bool) -> Vec<TitledBookInstance> {
        let mut rows: Vec<TitledBookInstance> = self
            .instances
            .values()
            .filter(|i| filter(i))
            .map(|i| TitledBookInstance {
                instance: i.clone(),
                book_title: self
                    .books
                    .get(&i.book_id)
                    .map(|b| b.row.title.clone())
                    .unwrap_or_default(),
            })
            .collect();
        rows.sort_by_key(|r| (r.instance.due_back.is_none(), r.instance.due_back, r.instance.id));
        rows
    }
}

fn same_username(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn window<T>(rows: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    rows.into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

/// Catalog store held in process memory
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GenreStore for InMemoryStore {
    async fn create_genre(&self, data: &CreateGenre) -> AppResult<Genre> {
        let mut tables = self.tables.write().await;
        let genre = Genre {
            id: tables.next_id(),
            name: data.name.clone(),
        };
        tables.genres.insert(genre.id, genre.clone());
        Ok(genre)
    }

    async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        let tables = self.tables.read().await;
        tables
            .genres
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let tables = self.tables.read().await;
        let mut genres: Vec<Genre> = tables.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(genres)
    }

    async fn delete_genre(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.genres.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Genre {} not found", id)));
        }
        for book in tables.books.values_mut() {
            book.genre_ids.retain(|g| *g != id);
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorStore for InMemoryStore {
    async fn create_author(&self, data: &CreateAuthor) -> AppResult<Author> {
        let mut tables = self.tables.write().await;
        let author = Author {
            id: tables.next_id(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            date_of_birth: data.date_of_birth,
            date_of_death: data.date_of_death,
        };
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn get_author(&self, id: i32) -> AppResult<Author> {
        let tables = self.tables.read().await;
        tables
            .authors
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn update_author(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        let mut tables = self.tables.write().await;
        let author = tables
            .authors
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;
        data.apply_to(author);
        Ok(author.clone())
    }

    async fn delete_author(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.authors.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        for book in tables.books.values_mut() {
            if book.row.author_id == Some(id) {
                book.row.author_id = None;
            }
        }
        Ok(())
    }

    async fn list_authors(&self, offset: i64, limit: i64) -> AppResult<Vec<Author>> {
        let tables = self.tables.read().await;
        let mut authors: Vec<Author> = tables.authors.values().cloned().collect();
        authors.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(window(authors, offset, limit))
    }

    async fn count_authors(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.authors.len() as i64)
    }
}

#[async_trait]
impl BookStore for InMemoryStore {
    async fn create_book(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        tables.check_isbn(&data.isbn, None)?;
        tables.check_author(data.author_id)?;
        let genre_ids = normalize_genre_ids(&data.genre_ids);
        tables.check_genres(&genre_ids)?;

        let row = BookRow {
            id: tables.next_id(),
            title: data.title.clone(),
            author_id: data.author_id,
            summary: data.summary.clone(),
            isbn: data.isbn.clone(),
        };
        let stored = StoredBook { row, genre_ids };
        let book = tables.book(&stored);
        tables.books.insert(book.id, stored);
        Ok(book)
    }

    async fn get_book(&self, id: i32) -> AppResult<Book> {
        let tables = self.tables.read().await;
        tables
            .books
            .get(&id)
            .map(|b| tables.book(b))
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        let mut row = tables
            .books
            .get(&id)
            .map(|b| b.row.clone())
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        data.apply_to(&mut row);

        tables.check_isbn(&row.isbn, Some(id))?;
        tables.check_author(row.author_id)?;
        let genre_ids = data.genre_ids.as_deref().map(normalize_genre_ids);
        if let Some(ref genre_ids) = genre_ids {
            tables.check_genres(genre_ids)?;
        }

        if let Some(stored) = tables.books.get_mut(&id) {
            stored.row = row;
            if let Some(genre_ids) = genre_ids {
                stored.genre_ids = genre_ids;
            }
        }
        tables
            .books
            .get(&id)
            .map(|b| tables.book(b))
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&id) {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        if tables.instances.values().any(|i| i.book_id == id) {
            return Err(AppError::Constraint(format!(
                "Book {} still has copies; delete them first",
                id
            )));
        }
        tables.books.remove(&id);
        Ok(())
    }

    async fn list_books(&self, offset: i64, limit: i64) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        let mut books: Vec<Book> = tables.books.values().map(|b| tables.book(b)).collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(window(books, offset, limit))
    }

    async fn list_books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        let mut books: Vec<Book> = tables
            .books
            .values()
            .filter(|b| b.row.author_id == Some(author_id))
            .map(|b| tables.book(b))
            .collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(books)
    }

    async fn count_books(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.books.len() as i64)
    }
}

#[async_trait]
impl BookInstanceStore for InMemoryStore {
    async fn create_book_instance(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let mut tables = self.tables.write().await;
        let instance = BookInstance {
            id: Uuid::new_v4(),
            book_id: data.book_id,
            imprint: data.imprint.clone(),
            borrower_id: data.borrower_id,
            due_back: data.due_back,
            status: data.status,
        };
        tables.check_instance_refs(&instance)?;
        tables.instances.insert(instance.id, instance.clone());
        Ok(instance)
    }

    async fn get_book_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        let tables = self.tables.read().await;
        tables
            .instances
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn update_book_instance(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance> {
        let mut tables = self.tables.write().await;
        let mut instance = tables
            .instances
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;
        data.apply_to(&mut instance);
        tables.check_instance_refs(&instance)?;
        tables.instances.insert(id, instance.clone());
        Ok(instance)
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        let mut tables = self.tables.write().await;
        let instance = tables
            .instances
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;
        instance.due_back = Some(due_back);
        Ok(instance.clone())
    }

    async fn delete_book_instance(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .instances
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn list_book_instances(
        &self,
        status: Option<LoanStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<TitledBookInstance>> {
        let tables = self.tables.read().await;
        let rows = tables.titled_instances(|i| status.map_or(true, |s| i.status == s));
        Ok(window(rows, offset, limit))
    }

    async fn count_book_instances(&self, status: Option<LoanStatus>) -> AppResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .instances
            .values()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .count();
        Ok(count as i64)
    }

    async fn list_instances_of_book(&self, book_id: i32) -> AppResult<Vec<TitledBookInstance>> {
        let tables = self.tables.read().await;
        Ok(tables.titled_instances(|i| i.book_id == book_id))
    }

    async fn list_borrowed_by_user(&self, user_id: i32) -> AppResult<Vec<TitledBookInstance>> {
        let tables = self.tables.read().await;
        Ok(tables.titled_instances(|i| i.borrower_id == Some(user_id) && i.status == LoanStatus::OnLoan))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, data: &NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .values()
            .any(|u| same_username(&u.username, &data.username));
        if taken {
            return Err(AppError::Constraint(format!(
                "Username '{}' is already taken",
                data.username
            )));
        }
        let user = User {
            id: tables.next_id(),
            username: data.username.clone(),
            password_hash: data.password_hash.clone(),
            can_mark_returned: data.can_mark_returned,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i32) -> AppResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| same_username(&u.username, username))
            .cloned())
    }

    async fn delete_user(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        for instance in tables.instances.values_mut() {
            if instance.borrower_id == Some(id) {
                instance.borrower_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn summary(&self) -> AppResult<CatalogSummary> {
        let tables = self.tables.read().await;
        Ok(CatalogSummary {
            num_books: tables.books.len() as i64,
            num_instances: tables.instances.len() as i64,
            num_instances_available: tables
                .instances
                .values()
                .filter(|i| i.status == LoanStatus::Available)
                .count() as i64,
            num_authors: tables.authors.len() as i64,
        })
    }
}
