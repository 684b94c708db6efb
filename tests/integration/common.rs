//! Shared fixtures

use std::sync::Arc;

use chrono::NaiveDate;

use catalog_server::{
    config::{AppConfig, StoreBackend},
    models::{
        author::{Author, CreateAuthor},
        book::{Book, CreateBook},
        book_instance::{BookInstanceDetails, CreateBookInstance, LoanStatus},
        user::{CreateUser, User},
    },
    repository::Repository,
    services::{FixedClock, Services},
};

pub const ADMIN_USERNAME: &str = "librarian";
pub const ADMIN_PASSWORD: &str = "librarian-pass";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-memory configuration with a staff account and the default page size
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.backend = StoreBackend::Memory;
    config.auth.jwt_secret = "integration-secret".to_string();
    config.auth.admin_username = Some(ADMIN_USERNAME.to_string());
    config.auth.admin_password = Some(ADMIN_PASSWORD.to_string());
    config
}

/// Services over a fresh in-memory store, pinned to `today`
pub fn services_at(today: NaiveDate) -> Services {
    Services::new(Repository::in_memory(), &test_config(), Arc::new(FixedClock(today)))
}

pub async fn author(services: &Services, first_name: &str, last_name: &str) -> Author {
    services
        .authors
        .create(&CreateAuthor {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            date_of_birth: None,
            date_of_death: None,
        })
        .await
        .unwrap()
}

pub async fn book(services: &Services, title: &str, isbn: &str, author_id: Option<i32>) -> Book {
    services
        .books
        .create(&CreateBook {
            title: title.to_string(),
            author_id,
            summary: String::new(),
            isbn: isbn.to_string(),
            genre_ids: vec![],
        })
        .await
        .unwrap()
}

pub async fn reader(services: &Services, username: &str) -> User {
    services
        .users
        .create_user(&CreateUser {
            username: username.to_string(),
            password: "reader-pass".to_string(),
            can_mark_returned: false,
        })
        .await
        .unwrap()
}

pub async fn copy(
    services: &Services,
    book_id: i32,
    status: LoanStatus,
    borrower_id: Option<i32>,
    due_back: Option<NaiveDate>,
) -> BookInstanceDetails {
    services
        .book_instances
        .create(&CreateBookInstance {
            book_id,
            imprint: "Test imprint".to_string(),
            borrower_id,
            due_back,
            status,
        })
        .await
        .unwrap()
}
