//! PostgreSQL implementation of the catalog store

mod authors;
mod book_instances;
mod books;
mod genres;
mod users;

use async_trait::async_trait;
use sqlx::{error::DatabaseError, Pool, Postgres};

use super::CatalogStore;
use crate::{
    error::{AppError, AppResult},
    models::{book_instance::LoanStatus, CatalogSummary},
};

/// Catalog store backed by a Postgres connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Turn unique / foreign key violations into constraint errors.
///
/// `message` sees the violation and can tell a duplicate from a dangling reference.
fn constraint_violation(
    err: sqlx::Error,
    message: impl FnOnce(&dyn DatabaseError) -> String,
) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
            let message = message(&**db);
            tracing::warn!("{} ({})", message, db.message());
            AppError::Constraint(message)
        }
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn summary(&self) -> AppResult<CatalogSummary> {
        // One statement, one snapshot
        let (num_books, num_instances, num_instances_available, num_authors): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM books),
                    (SELECT COUNT(*) FROM book_instances),
                    (SELECT COUNT(*) FROM book_instances WHERE status = $1),
                    (SELECT COUNT(*) FROM authors)
                "#,
            )
            .bind(LoanStatus::Available)
            .fetch_one(&self.pool)
            .await?;

        Ok(CatalogSummary {
            num_books,
            num_instances,
            num_instances_available,
            num_authors,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{borrow::Cow, error::Error as StdError, fmt};

    use sqlx::error::ErrorKind;

    use super::*;

    /// Stand-in for a driver error with a given kind
    #[derive(Debug)]
    pub(super) struct FakeDbError(pub ErrorKind);

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "violation"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    pub(super) fn db_error(kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError(kind)))
    }

    #[test]
    fn test_only_key_violations_become_constraints() {
        let err = constraint_violation(db_error(ErrorKind::UniqueViolation), |_| "taken".to_string());
        assert!(matches!(err, AppError::Constraint(ref m) if m == "taken"));

        let err = constraint_violation(db_error(ErrorKind::Other), |_| "taken".to_string());
        assert!(matches!(err, AppError::Database(_)));

        let err = constraint_violation(sqlx::Error::RowNotFound, |_| "taken".to_string());
        assert!(matches!(err, AppError::Database(_)));
    }
}
