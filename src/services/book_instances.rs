//! Book copies: loans, renewals and status changes

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use super::{renewal, Clock};
use crate::{
    error::AppResult,
    models::{
        book_instance::{
            BookInstance, BookInstanceDetails, BookInstanceQuery, CreateBookInstance, LoanStatus,
            RenewalForm, UpdateBookInstance,
        },
        Page, PageWindow,
    },
    repository::{BookInstanceStore, BookStore, Repository, UserStore},
};

#[derive(Clone)]
pub struct BookInstancesService {
    repository: Repository,
    page_size: i64,
    clock: Arc<dyn Clock>,
}

impl BookInstancesService {
    pub fn new(repository: Repository, page_size: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            page_size,
            clock,
        }
    }

    async fn details(&self, instance: BookInstance) -> AppResult<BookInstanceDetails> {
        let book = self.repository.get_book(instance.book_id).await?;
        Ok(BookInstanceDetails::new(instance, book.title, self.clock.today()))
    }

    async fn check_references(&self, book_id: Option<i32>, borrower_id: Option<i32>) -> AppResult<()> {
        if let Some(book_id) = book_id {
            self.repository.get_book(book_id).await?;
        }
        if let Some(borrower_id) = borrower_id {
            self.repository.get_user(borrower_id).await?;
        }
        Ok(())
    }

    /// Number of copies that can be borrowed right now
    pub async fn available_count(&self) -> AppResult<i64> {
        self.repository
            .count_book_instances(Some(LoanStatus::Available))
            .await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.count_book_instances(None).await
    }

    /// Copies on loan to `user_id`, soonest due first
    pub async fn list_borrowed_by_user(&self, user_id: i32) -> AppResult<Vec<BookInstanceDetails>> {
        let today = self.clock.today();
        Ok(self
            .repository
            .list_borrowed_by_user(user_id)
            .await?
            .into_iter()
            .map(|row| row.into_details(today))
            .collect())
    }

    /// One page of the copies on loan to `user_id`
    pub async fn borrowed_by_user_page(
        &self,
        user_id: i32,
        page: Option<i64>,
    ) -> AppResult<Page<BookInstanceDetails>> {
        let borrowed = self.list_borrowed_by_user(user_id).await?;
        let window = PageWindow::new(page, self.page_size, borrowed.len() as i64)?;
        Ok(window.slice(borrowed))
    }

    /// All copies, optionally filtered on status
    pub async fn list(&self, query: &BookInstanceQuery) -> AppResult<Page<BookInstanceDetails>> {
        let total = self.repository.count_book_instances(query.status).await?;
        let window = PageWindow::new(query.page, self.page_size, total)?;
        let today = self.clock.today();
        let rows = self
            .repository
            .list_book_instances(query.status, window.offset(), window.limit())
            .await?;
        Ok(window.into_page(rows.into_iter().map(|row| row.into_details(today)).collect()))
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        let instance = self.repository.get_book_instance(id).await?;
        self.details(instance).await
    }

    pub async fn create(&self, data: &CreateBookInstance) -> AppResult<BookInstanceDetails> {
        data.validate()?;
        self.check_references(Some(data.book_id), data.borrower_id)
            .await?;

        let instance = self.repository.create_book_instance(data).await?;
        tracing::info!(instance_id = %instance.id, book_id = instance.book_id, "Book instance created");
        self.details(instance).await
    }

    pub async fn update(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstanceDetails> {
        data.validate()?;
        self.check_references(data.book_id, data.borrower_id.flatten())
            .await?;

        let instance = self.repository.update_book_instance(id, data).await?;
        tracing::info!(instance_id = %id, status = %instance.status, "Book instance updated");
        self.details(instance).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.delete_book_instance(id).await?;
        tracing::info!(instance_id = %id, "Book instance deleted");
        Ok(())
    }

    /// Copy to renew and the date suggested before any input
    pub async fn renewal_form(&self, id: Uuid) -> AppResult<RenewalForm> {
        let book_instance = self.detail(id).await?;
        Ok(RenewalForm {
            book_instance,
            proposed_due_back: renewal::default_renewal_date(self.clock.today()),
        })
    }

    /// Move the due-back date of a copy.
    ///
    /// The proposed date must lie between today and four weeks ahead; when it
    /// does not, the copy is left untouched.
    pub async fn renew(&self, id: Uuid, proposed: NaiveDate) -> AppResult<BookInstanceDetails> {
        let instance = self.repository.get_book_instance(id).await?;

        let due_back = renewal::validate_renewal_date(proposed, self.clock.today()).map_err(|e| {
            tracing::warn!(instance_id = %id, %proposed, "Renewal refused: {}", e);
            e
        })?;

        let instance = self.repository.set_due_back(instance.id, due_back).await?;
        tracing::info!(instance_id = %id, %due_back, "Book instance renewed");
        self.details(instance).await
    }

    /// Copy is back on the shelf: available, no borrower, no due date
    pub async fn mark_returned(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        let update = UpdateBookInstance {
            status: Some(LoanStatus::Available),
            borrower_id: Some(None),
            due_back: Some(None),
            ..Default::default()
        };
        let instance = self.repository.update_book_instance(id, &update).await?;
        tracing::info!(instance_id = %id, "Book instance returned");
        self.details(instance).await
    }

    /// Set any status; every transition is allowed
    pub async fn set_status(&self, id: Uuid, status: LoanStatus) -> AppResult<BookInstanceDetails> {
        let update = UpdateBookInstance {
            status: Some(status),
            ..Default::default()
        };
        let instance = self.repository.update_book_instance(id, &update).await?;
        tracing::info!(instance_id = %id, %status, "Book instance status changed");
        self.details(instance).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{book::CreateBook, user::NewUser},
        services::{renewal::RenewalError, MockClock},
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn on_loan_copy(repository: &Repository) -> BookInstance {
        let book = repository
            .create_book(&CreateBook {
                title: "Kidnapped".to_string(),
                author_id: None,
                summary: String::new(),
                isbn: "9780140437645".to_string(),
                genre_ids: vec![],
            })
            .await
            .unwrap();
        let user = repository
            .create_user(&NewUser {
                username: "reader".to_string(),
                password_hash: String::new(),
                can_mark_returned: false,
            })
            .await
            .unwrap();
        repository
            .create_book_instance(&CreateBookInstance {
                book_id: book.id,
                imprint: "Penguin Classics".to_string(),
                borrower_id: Some(user.id),
                due_back: Some(date(2024, 1, 5)),
                status: LoanStatus::OnLoan,
            })
            .await
            .unwrap()
    }

    fn service_at(repository: Repository, today: NaiveDate) -> BookInstancesService {
        let mut clock = MockClock::new();
        clock.expect_today().return_const(today);
        BookInstancesService::new(repository, 2, Arc::new(clock))
    }

    #[tokio::test]
    async fn test_renew_reads_today_from_clock() {
        let repository = Repository::in_memory();
        let copy = on_loan_copy(&repository).await;
        let service = service_at(repository, date(2024, 1, 1));

        let renewed = service.renew(copy.id, date(2024, 1, 15)).await.unwrap();
        assert_eq!(renewed.due_back, Some(date(2024, 1, 15)));
        assert!(!renewed.is_overdue);
    }

    #[tokio::test]
    async fn test_rejected_renewal_leaves_copy_untouched() {
        let repository = Repository::in_memory();
        let copy = on_loan_copy(&repository).await;
        let service = service_at(repository.clone(), date(2024, 1, 1));

        let result = service.renew(copy.id, date(2024, 2, 1)).await;
        assert!(matches!(result, Err(AppError::Renewal(RenewalError::TooFarAhead))));

        let stored = repository.get_book_instance(copy.id).await.unwrap();
        assert_eq!(stored, copy);
    }

    #[tokio::test]
    async fn test_renewal_form_suggests_three_weeks() {
        let repository = Repository::in_memory();
        let copy = on_loan_copy(&repository).await;
        let service = service_at(repository, date(2024, 1, 10));

        let form = service.renewal_form(copy.id).await.unwrap();
        assert_eq!(form.proposed_due_back, date(2024, 1, 31));
        assert!(form.book_instance.is_overdue);
        assert_eq!(form.book_instance.book_title, "Kidnapped");
    }

    #[tokio::test]
    async fn test_mark_returned_clears_loan() {
        let repository = Repository::in_memory();
        let copy = on_loan_copy(&repository).await;
        let service = service_at(repository, date(2024, 1, 1));

        let returned = service.mark_returned(copy.id).await.unwrap();
        assert_eq!(returned.status, LoanStatus::Available);
        assert_eq!(returned.borrower_id, None);
        assert_eq!(returned.due_back, None);
    }
}
