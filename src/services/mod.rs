//! Business logic services

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod dashboard;
pub mod genres;
pub mod renewal;
pub mod users;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{config::AppConfig, repository::Repository};

/// Source of the current calendar date
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the server
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub genres: genres::GenresService,
    pub book_instances: book_instances::BookInstancesService,
    pub dashboard: dashboard::DashboardService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let page_size = config.catalog.page_size;
        Self {
            authors: authors::AuthorsService::new(repository.clone(), page_size),
            books: books::BooksService::new(repository.clone(), page_size, clock.clone()),
            genres: genres::GenresService::new(repository.clone()),
            book_instances: book_instances::BookInstancesService::new(
                repository.clone(),
                page_size,
                clock,
            ),
            dashboard: dashboard::DashboardService::new(repository.clone()),
            users: users::UsersService::new(repository, config.auth.clone()),
        }
    }
}
