//! API tests through the full router

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use catalog_server::{api::create_router, models::book_instance::LoanStatus, AppState};

use crate::common::{
    book, copy, date, reader, services_at, test_config, ADMIN_PASSWORD, ADMIN_USERNAME,
};

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    async fn new() -> Self {
        let services = services_at(date(2024, 1, 1));
        services.users.ensure_admin().await.unwrap();
        let state = AppState::new(test_config(), services);
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "Bearer");
        body["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");

    let (status, body) = app.request(Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_bad_credentials() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": ADMIN_USERNAME, "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthenticated");
}

#[tokio::test]
async fn test_login_required_for_borrowed_list() {
    let app = TestApp::new().await;
    let (status, _) = app.request(Method::GET, "/api/v1/mybooks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::GET, "/api/v1/mybooks", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reader_sees_own_loans_but_not_staff_pages() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let alice = reader(services, "alice").await;
    let dune = book(services, "Dune", "9780441172719", None).await;
    copy(services, dune.id, LoanStatus::OnLoan, Some(alice.id), Some(date(2024, 1, 10))).await;

    let token = app.login("alice", "reader-pass").await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/mybooks", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["book_title"], "Dune");
    assert_eq!(body["items"][0]["status"], "on_loan");

    let (status, _) = app
        .request(Method::GET, "/api/v1/book-instances", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request(Method::GET, "/api/v1", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_book_detail_is_public_but_list_is_staff_only() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let alice = reader(services, "alice").await;
    let dune = book(services, "Dune", "9780441172719", None).await;
    copy(services, dune.id, LoanStatus::OnLoan, Some(alice.id), Some(date(2024, 1, 10))).await;

    let (status, body) = app
        .request(Method::GET, &format!("/api/v1/books/{}", dune.id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Dune");
    let shelf = &body["instances"][0];
    assert_eq!(shelf["status"], "on_loan");
    assert_eq!(shelf["due_back"], "2024-01-10");
    assert!(shelf.get("borrower_id").is_none());

    let (status, _) = app.request(Method::GET, "/api/v1/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let (status, body) = app
        .request(Method::GET, "/api/v1/books", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["title"], "Dune");

    let (status, body) = app
        .request(Method::GET, "/api/v1/books?page=2", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_staff_renewal_flow() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let dune = book(services, "Dune", "9780441172719", None).await;
    let instance = copy(services, dune.id, LoanStatus::OnLoan, None, Some(date(2024, 1, 3))).await;
    let token = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let renew_uri = format!("/api/v1/book-instances/{}/renew", instance.id);

    let (status, form) = app.request(Method::GET, &renew_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["proposed_due_back"], "2024-01-22");

    let (status, body) = app
        .request(Method::POST, &renew_uri, Some(&token), Some(json!({ "due_back": "2024-02-01" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid date - renewal more than 4 weeks ahead");

    let (status, body) = app
        .request(Method::POST, &renew_uri, Some(&token), Some(json!({ "due_back": "2023-12-31" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid date - renewal in past");

    let (status, body) = app
        .request(Method::POST, &renew_uri, Some(&token), Some(json!({ "due_back": "2024-01-15" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["due_back"], "2024-01-15");

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/v1/book-instances/{}/return", instance.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");
    assert_eq!(body["due_back"], Value::Null);
}

#[tokio::test]
async fn test_staff_catalog_edits() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let (status, author) = app
        .request(
            Method::POST,
            "/api/v1/authors",
            Some(&token),
            Some(json!({ "first_name": "Ursula", "last_name": "Le Guin" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let new_book = json!({
        "title": "The Dispossessed",
        "author_id": author["id"],
        "isbn": "9780061054884"
    });
    let (status, _) = app
        .request(Method::POST, "/api/v1/books", Some(&token), Some(new_book.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .request(Method::POST, "/api/v1/books", Some(&token), Some(new_book))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/books",
            Some(&token),
            Some(json!({ "title": "Short", "isbn": "123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, detail) = app
        .request(
            Method::GET,
            &format!("/api/v1/authors/{}", author["id"]),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["last_name"], "Le Guin");
    assert_eq!(detail["books"][0]["title"], "The Dispossessed");
}
