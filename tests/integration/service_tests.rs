//! Catalog behavior through the service layer

use catalog_server::{
    error::AppError,
    models::{
        book::UpdateBook,
        book_instance::{BookInstanceQuery, LoanStatus},
        genre::CreateGenre,
    },
    services::renewal::RenewalError,
};

use crate::common::{author, book, copy, date, reader, services_at};

#[tokio::test]
async fn test_duplicate_isbn_rejected() {
    let services = services_at(date(2024, 1, 1));
    book(&services, "Dune", "9780441172719", None).await;

    let result = services
        .books
        .create(&catalog_server::models::book::CreateBook {
            title: "Dune (reprint)".to_string(),
            author_id: None,
            summary: String::new(),
            isbn: "9780441172719".to_string(),
            genre_ids: vec![],
        })
        .await;
    assert!(matches!(result, Err(AppError::Constraint(_))));
    assert_eq!(services.books.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_deleting_author_keeps_books() {
    let services = services_at(date(2024, 1, 1));
    let herbert = author(&services, "Frank", "Herbert").await;
    let dune = book(&services, "Dune", "9780441172719", Some(herbert.id)).await;

    services.authors.delete(herbert.id).await.unwrap();

    let kept = services.books.get_by_id(dune.id).await.unwrap();
    assert_eq!(kept.author_id, None);
    assert!(matches!(
        services.authors.get_by_id(herbert.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_book_with_copies_cannot_be_deleted() {
    let services = services_at(date(2024, 1, 1));
    let dune = book(&services, "Dune", "9780441172719", None).await;
    let instance = copy(&services, dune.id, LoanStatus::Available, None, None).await;

    assert!(matches!(
        services.books.delete(dune.id).await,
        Err(AppError::Constraint(_))
    ));

    services.book_instances.delete(instance.id).await.unwrap();
    services.books.delete(dune.id).await.unwrap();
    assert_eq!(services.books.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_borrowed_list_only_has_on_loan_copies_of_user() {
    let services = services_at(date(2024, 1, 10));
    let alice = reader(&services, "alice").await;
    let bob = reader(&services, "bob").await;
    let dune = book(&services, "Dune", "9780441172719", None).await;

    let later = copy(&services, dune.id, LoanStatus::OnLoan, Some(alice.id), Some(date(2024, 1, 20))).await;
    let sooner = copy(&services, dune.id, LoanStatus::OnLoan, Some(alice.id), Some(date(2024, 1, 5))).await;
    copy(&services, dune.id, LoanStatus::Reserved, Some(alice.id), Some(date(2024, 1, 2))).await;
    copy(&services, dune.id, LoanStatus::OnLoan, Some(bob.id), Some(date(2024, 1, 3))).await;

    let borrowed = services
        .book_instances
        .list_borrowed_by_user(alice.id)
        .await
        .unwrap();
    let ids: Vec<_> = borrowed.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);
    assert!(borrowed[0].is_overdue);
    assert!(!borrowed[1].is_overdue);
}

#[tokio::test]
async fn test_renewal_window() {
    let services = services_at(date(2024, 1, 1));
    let dune = book(&services, "Dune", "9780441172719", None).await;
    let instance = copy(&services, dune.id, LoanStatus::OnLoan, None, Some(date(2024, 1, 2))).await;

    let renewed = services
        .book_instances
        .renew(instance.id, date(2024, 1, 29))
        .await
        .unwrap();
    assert_eq!(renewed.due_back, Some(date(2024, 1, 29)));

    assert!(matches!(
        services.book_instances.renew(instance.id, date(2023, 12, 31)).await,
        Err(AppError::Renewal(RenewalError::PastDate))
    ));
    assert!(matches!(
        services.book_instances.renew(instance.id, date(2024, 1, 30)).await,
        Err(AppError::Renewal(RenewalError::TooFarAhead))
    ));

    let unchanged = services.book_instances.detail(instance.id).await.unwrap();
    assert_eq!(unchanged.due_back, Some(date(2024, 1, 29)));
}

#[tokio::test]
async fn test_renewing_unknown_copy_is_not_found() {
    let services = services_at(date(2024, 1, 1));
    let result = services
        .book_instances
        .renew(uuid::Uuid::new_v4(), date(2024, 1, 10))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_thirteen_authors_paginate_by_two() {
    let services = services_at(date(2024, 1, 1));
    for i in 0..13 {
        author(&services, "Author", &format!("Name{:02}", i)).await;
    }

    let first = services.authors.list(None).await.unwrap();
    assert_eq!(first.total_pages, 7);
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].last_name, "Name00");

    let last = services.authors.list(Some(7)).await.unwrap();
    assert_eq!(last.items.len(), 1);
    assert!(!last.has_next);

    assert!(matches!(
        services.authors.list(Some(8)).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_deleting_user_clears_borrower() {
    let services = services_at(date(2024, 1, 1));
    let alice = reader(&services, "alice").await;
    let dune = book(&services, "Dune", "9780441172719", None).await;
    let instance = copy(&services, dune.id, LoanStatus::OnLoan, Some(alice.id), Some(date(2024, 1, 5))).await;

    services.users.delete_user(alice.id).await.unwrap();

    let kept = services.book_instances.detail(instance.id).await.unwrap();
    assert_eq!(kept.borrower_id, None);
    assert_eq!(kept.status, LoanStatus::OnLoan);
}

#[tokio::test]
async fn test_summary_and_status_filter() {
    let services = services_at(date(2024, 1, 1));
    author(&services, "Frank", "Herbert").await;
    let dune = book(&services, "Dune", "9780441172719", None).await;
    copy(&services, dune.id, LoanStatus::Available, None, None).await;
    copy(&services, dune.id, LoanStatus::Available, None, None).await;
    copy(&services, dune.id, LoanStatus::Maintenance, None, None).await;

    let summary = services.dashboard.summary().await.unwrap();
    assert_eq!(summary.num_books, 1);
    assert_eq!(summary.num_instances, 3);
    assert_eq!(summary.num_instances_available, 2);
    assert_eq!(summary.num_authors, 1);
    assert_eq!(services.book_instances.available_count().await.unwrap(), 2);

    let page = services
        .book_instances
        .list(&BookInstanceQuery {
            status: Some(LoanStatus::Maintenance),
            page: None,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].status, LoanStatus::Maintenance);
}

#[tokio::test]
async fn test_book_genres_and_display() {
    let services = services_at(date(2024, 1, 1));
    let mut genre_ids = Vec::new();
    for name in ["Science Fiction", "Adventure", "Politics", "Ecology"] {
        let genre = services
            .genres
            .create(&CreateGenre { name: name.to_string() })
            .await
            .unwrap();
        genre_ids.push(genre.id);
    }
    let dune = book(&services, "Dune", "9780441172719", None).await;

    let updated = services
        .books
        .update(
            dune.id,
            &UpdateBook {
                genre_ids: Some(genre_ids.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.genres.len(), 4);
    assert_eq!(updated.display_genre(), "Science Fiction, Adventure, Politics");

    services.genres.delete(genre_ids[0]).await.unwrap();
    let detail = services.books.detail(dune.id).await.unwrap();
    assert_eq!(detail.book.display_genre(), "Adventure, Politics, Ecology");
}

#[tokio::test]
async fn test_unknown_genre_is_not_found() {
    let services = services_at(date(2024, 1, 1));
    let dune = book(&services, "Dune", "9780441172719", None).await;
    let result = services
        .books
        .update(
            dune.id,
            &UpdateBook {
                genre_ids: Some(vec![999]),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
