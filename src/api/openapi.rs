//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, book_instances, books, dashboard, genres, health, users};
use crate::models::{author, book, book_instance, genre, pagination, user};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library Catalog API",
        version = "1.0.0",
        description = "Genres, authors, books and borrowable copies",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Index
        dashboard::summary,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Genres
        genres::list_genres,
        genres::create_genre,
        genres::delete_genre,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Book instances
        book_instances::my_borrowed,
        book_instances::list_book_instances,
        book_instances::get_book_instance,
        book_instances::create_book_instance,
        book_instances::update_book_instance,
        book_instances::delete_book_instance,
        book_instances::renewal_form,
        book_instances::renew_book_instance,
        book_instances::mark_returned,
        book_instances::set_status,
        // Users
        users::create_user,
        users::delete_user,
    ),
    components(
        schemas(
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            crate::models::CatalogSummary,
            genre::Genre,
            genre::CreateGenre,
            author::Author,
            author::AuthorDetails,
            author::CreateAuthor,
            author::UpdateAuthor,
            book::Book,
            book::BookSummary,
            book::BookDetails,
            book::CreateBook,
            book::UpdateBook,
            book_instance::LoanStatus,
            book_instance::BookInstance,
            book_instance::BookInstanceDetails,
            book_instance::ShelfCopy,
            book_instance::CreateBookInstance,
            book_instance::UpdateBookInstance,
            book_instance::RenewBookInstance,
            book_instance::RenewalForm,
            book_instance::UpdateStatus,
            user::CreateUser,
            pagination::AuthorPage,
            pagination::BookPage,
            pagination::BookInstancePage,
            health::HealthResponse,
            crate::config::StoreBackend,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Catalog counters"),
        (name = "books", description = "Books"),
        (name = "genres", description = "Genres"),
        (name = "authors", description = "Authors"),
        (name = "book-instances", description = "Copies, loans and renewals"),
        (name = "users", description = "User accounts")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
