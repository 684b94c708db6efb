//! Book copy endpoints: listing, loans, renewal and return

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{
            BookInstanceDetails, BookInstanceQuery, CreateBookInstance, RenewBookInstance,
            RenewalForm, UpdateBookInstance, UpdateStatus,
        },
        pagination::{BookInstancePage, PageQuery},
    },
    AppState,
};

use super::AuthenticatedUser;

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Borrowed copies, soonest due first", body = BookInstancePage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_borrowed(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<BookInstancePage>> {
    let page = state
        .services
        .book_instances
        .borrowed_by_user_page(claims.user_id, query.page)
        .await?;
    Ok(Json(page))
}

/// List copies, optionally filtered on status
#[utoipa::path(
    get,
    path = "/book-instances",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(BookInstanceQuery),
    responses(
        (status = 200, description = "One page of copies", body = BookInstancePage),
        (status = 403, description = "Missing capability")
    )
)]
pub async fn list_book_instances(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookInstanceQuery>,
) -> AppResult<Json<BookInstancePage>> {
    claims.require_can_mark_returned()?;

    let page = state.services.book_instances.list(&query).await?;
    Ok(Json(page))
}

/// Copy details
#[utoipa::path(
    get,
    path = "/book-instances/{id}",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = BookInstanceDetails),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_book_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require_can_mark_returned()?;

    let instance = state.services.book_instances.detail(id).await?;
    Ok(Json(instance))
}

/// Register a new copy of a book
#[utoipa::path(
    post,
    path = "/book-instances",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Copy created", body = BookInstanceDetails),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Unknown book or borrower")
    )
)]
pub async fn create_book_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstanceDetails>)> {
    claims.require_can_mark_returned()?;

    let instance = state.services.book_instances.create(&data).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// Update a copy
#[utoipa::path(
    put,
    path = "/book-instances/{id}",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Copy updated", body = BookInstanceDetails),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_book_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require_can_mark_returned()?;

    let instance = state.services.book_instances.update(id, &data).await?;
    Ok(Json(instance))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/book-instances/{id}",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_book_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_can_mark_returned()?;

    state.services.book_instances.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Copy to renew with the suggested due-back date
#[utoipa::path(
    get,
    path = "/book-instances/{id}/renew",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = RenewalForm),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renewal_form(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalForm>> {
    claims.require_can_mark_returned()?;

    let form = state.services.book_instances.renewal_form(id).await?;
    Ok(Json(form))
}

/// Renew a copy
#[utoipa::path(
    post,
    path = "/book-instances/{id}/renew",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = RenewBookInstance,
    responses(
        (status = 200, description = "Copy renewed", body = BookInstanceDetails),
        (status = 400, description = "Date in the past or more than 4 weeks ahead", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renew_book_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<RenewBookInstance>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require_can_mark_returned()?;

    let instance = state
        .services
        .book_instances
        .renew(id, data.due_back)
        .await?;
    Ok(Json(instance))
}

/// Mark a copy as returned
#[utoipa::path(
    post,
    path = "/book-instances/{id}/return",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy available again", body = BookInstanceDetails),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn mark_returned(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require_can_mark_returned()?;

    let instance = state.services.book_instances.mark_returned(id).await?;
    Ok(Json(instance))
}

/// Change the status of a copy
#[utoipa::path(
    put,
    path = "/book-instances/{id}/status",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = UpdateStatus,
    responses(
        (status = 200, description = "Status changed", body = BookInstanceDetails),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn set_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateStatus>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require_can_mark_returned()?;

    let instance = state
        .services
        .book_instances
        .set_status(id, data.status)
        .await?;
    Ok(Json(instance))
}
