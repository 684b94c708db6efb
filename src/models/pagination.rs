//! Page-number pagination shared by list endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{author::Author, book::BookSummary, book_instance::BookInstanceDetails};
use crate::error::{AppError, AppResult};

/// `?page=N` query parameter (1-based, defaults to 1)
#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// Validated position of a page inside a list of `total` rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl PageWindow {
    /// Check `page` against the row count.
    ///
    /// Page 1 always exists, even for an empty list; any other page past the
    /// last one is reported as not found.
    pub fn new(page: Option<i64>, per_page: i64, total: i64) -> AppResult<Self> {
        let per_page = per_page.max(1);
        let page = page.unwrap_or(1);
        let window = PageWindow { page, per_page, total };
        if page < 1 || page > window.total_pages().max(1) {
            return Err(AppError::NotFound(format!("Invalid page ({})", page)));
        }
        Ok(window)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn total_pages(&self) -> i64 {
        (self.total + self.per_page - 1) / self.per_page
    }

    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        let total_pages = self.total_pages();
        Page {
            items,
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages,
            has_next: self.page < total_pages,
            has_previous: self.page > 1,
        }
    }

    /// Cut the current page out of an already loaded list
    pub fn slice<T>(self, items: Vec<T>) -> Page<T> {
        let items = items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect();
        self.into_page(items)
    }
}

/// One page of a list
#[derive(Debug, Clone, Serialize, ToSchema)]
#[aliases(
    AuthorPage = Page<Author>,
    BookPage = Page<BookSummary>,
    BookInstancePage = Page<BookInstanceDetails>
)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Current page number (1-based)
    pub page: i64,
    pub per_page: i64,
    /// Total number of rows across all pages
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}
