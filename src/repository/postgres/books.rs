//! Book queries

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{error::DatabaseError, PgConnection, PgExecutor};

use super::{constraint_violation, PgStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{normalize_genre_ids, Book, BookRow, CreateBook, UpdateBook},
        genre::Genre,
    },
    repository::BookStore,
};

/// Message for a rejected book insert or update: the author row is the only
/// foreign key on `books`, the ISBN the only unique column
fn book_write_message(isbn: &str, author_id: Option<i32>) -> impl FnOnce(&dyn DatabaseError) -> String {
    let isbn = isbn.to_string();
    move |db: &dyn DatabaseError| {
        if db.is_foreign_key_violation() {
            match author_id {
                Some(id) => format!("Unknown author {}", id),
                None => "Unknown author".to_string(),
            }
        } else {
            format!("A book with ISBN {} already exists", isbn)
        }
    }
}

/// Genres of each requested book, ordered by genre id
async fn load_genres<'e, E>(executor: E, book_ids: &[i32]) -> AppResult<HashMap<i32, Vec<Genre>>>
where
    E: PgExecutor<'e>,
{
    let rows: Vec<(i32, i32, String)> = sqlx::query_as(
        r#"
        SELECT bg.book_id, g.id, g.name
        FROM book_genres bg
        JOIN genres g ON g.id = bg.genre_id
        WHERE bg.book_id = ANY($1)
        ORDER BY bg.book_id, g.id
        "#,
    )
    .bind(book_ids)
    .fetch_all(executor)
    .await?;

    let mut genres: HashMap<i32, Vec<Genre>> = HashMap::new();
    for (book_id, id, name) in rows {
        genres.entry(book_id).or_default().push(Genre { id, name });
    }
    Ok(genres)
}

/// Attach genres to a list of rows, keeping the row order
async fn with_genres(store: &PgStore, rows: Vec<BookRow>) -> AppResult<Vec<Book>> {
    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let mut genres = load_genres(&store.pool, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let book_genres = genres.remove(&row.id).unwrap_or_default();
            row.with_genres(book_genres)
        })
        .collect())
}

async fn replace_genre_links(conn: &mut PgConnection, book_id: i32, genre_ids: &[i32]) -> AppResult<()> {
    sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    let genre_ids = normalize_genre_ids(genre_ids);
    if !genre_ids.is_empty() {
        sqlx::query(
            "INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int4[])",
        )
        .bind(book_id)
        .bind(&genre_ids)
        .execute(&mut *conn)
        .await
        .map_err(|e| constraint_violation(e, |_| "Unknown genre".to_string()))?;
    }
    Ok(())
}

#[async_trait]
impl BookStore for PgStore {
    async fn create_book(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (title, author_id, summary, isbn)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, author_id, summary, isbn
            "#,
        )
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_violation(e, book_write_message(&data.isbn, data.author_id)))?;

        replace_genre_links(&mut *tx, row.id, &data.genre_ids).await?;
        let mut genres = load_genres(&mut *tx, &[row.id]).await?;

        tx.commit().await?;
        let book_genres = genres.remove(&row.id).unwrap_or_default();
        Ok(row.with_genres(book_genres))
    }

    async fn get_book(&self, id: i32) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            "SELECT id, title, author_id, summary, isbn FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        let mut genres = load_genres(&self.pool, &[id]).await?;
        Ok(row.with_genres(genres.remove(&id).unwrap_or_default()))
    }

    async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let mut row = sqlx::query_as::<_, BookRow>(
            "SELECT id, title, author_id, summary, isbn FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        data.apply_to(&mut row);

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books SET title = $2, author_id = $3, summary = $4, isbn = $5
            WHERE id = $1
            RETURNING id, title, author_id, summary, isbn
            "#,
        )
        .bind(id)
        .bind(&row.title)
        .bind(row.author_id)
        .bind(&row.summary)
        .bind(&row.isbn)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_violation(e, book_write_message(&row.isbn, row.author_id)))?;

        if let Some(ref genre_ids) = data.genre_ids {
            replace_genre_links(&mut *tx, id, genre_ids).await?;
        }
        let mut genres = load_genres(&mut *tx, &[id]).await?;

        tx.commit().await?;
        Ok(row.with_genres(genres.remove(&id).unwrap_or_default()))
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        // book_instances.book_id is ON DELETE RESTRICT
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                constraint_violation(e, |_| {
                    format!("Book {} still has copies; delete them first", id)
                })
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    async fn list_books(&self, offset: i64, limit: i64) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, author_id, summary, isbn FROM books
            ORDER BY title COLLATE "C", id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        with_genres(self, rows).await
    }

    async fn list_books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, author_id, summary, isbn FROM books
            WHERE author_id = $1
            ORDER BY title COLLATE "C", id
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        with_genres(self, rows).await
    }

    async fn count_books(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::error::ErrorKind;

    use super::super::{constraint_violation, tests::db_error};
    use super::*;

    #[test]
    fn test_missing_author_is_not_reported_as_duplicate_isbn() {
        let err = constraint_violation(
            db_error(ErrorKind::ForeignKeyViolation),
            book_write_message("9780441172719", Some(42)),
        );
        assert!(matches!(err, AppError::Constraint(ref m) if m == "Unknown author 42"));

        let err = constraint_violation(
            db_error(ErrorKind::UniqueViolation),
            book_write_message("9780441172719", Some(42)),
        );
        assert!(matches!(
            err,
            AppError::Constraint(ref m) if m == "A book with ISBN 9780441172719 already exists"
        ));
    }
}
