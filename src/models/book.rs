//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{book_instance::ShelfCopy, genre::Genre};

/// Number of genres shown in the short genre label of a book
pub const DISPLAY_GENRE_LIMIT: usize = 3;

/// Book row as stored in the `books` table (genres live in `book_genres`)
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
}

impl BookRow {
    pub fn with_genres(self, genres: Vec<Genre>) -> Book {
        Book {
            id: self.id,
            title: self.title,
            author_id: self.author_id,
            summary: self.summary,
            isbn: self.isbn,
            genres,
        }
    }
}

/// Full book model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    /// Cleared when the author is deleted
    pub author_id: Option<i32>,
    pub summary: String,
    /// 13 character ISBN, unique across the catalog
    pub isbn: String,
    pub genres: Vec<Genre>,
}

impl Book {
    /// Names of the first few genres, comma separated
    pub fn display_genre(&self) -> String {
        self.genres
            .iter()
            .take(DISPLAY_GENRE_LIMIT)
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Short book representation for lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub display_genre: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        BookSummary {
            id: book.id,
            title: book.title.clone(),
            author_id: book.author_id,
            display_genre: book.display_genre(),
        }
    }
}

/// Book with its physical copies, as shown to anyone
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub instances: Vec<ShelfCopy>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    #[serde(default)]
    pub summary: String,
    #[validate(length(equal = 13, message = "ISBN must be 13 characters"))]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

/// Update book request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub author_id: Option<Option<i32>>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    pub summary: Option<String>,
    #[validate(length(equal = 13, message = "ISBN must be 13 characters"))]
    pub isbn: Option<String>,
    /// Replaces the whole genre set when present
    pub genre_ids: Option<Vec<i32>>,
}

impl UpdateBook {
    /// Apply the present scalar fields onto an existing row
    pub fn apply_to(&self, row: &mut BookRow) {
        if let Some(ref title) = self.title {
            row.title = title.clone();
        }
        if let Some(author_id) = self.author_id {
            row.author_id = author_id;
        }
        if let Some(ref summary) = self.summary {
            row.summary = summary.clone();
        }
        if let Some(ref isbn) = self.isbn {
            row.isbn = isbn.clone();
        }
    }
}

/// Sorted, de-duplicated genre ids
pub fn normalize_genre_ids(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
