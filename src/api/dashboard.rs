//! Index page

use axum::{extract::State, Json};

use crate::{error::AppResult, models::CatalogSummary, AppState};

use super::AuthenticatedUser;

/// Catalog counters
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Catalog counters", body = CatalogSummary),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing capability")
    )
)]
pub async fn summary(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<CatalogSummary>> {
    claims.require_can_mark_returned()?;

    let summary = state.services.dashboard.summary().await?;
    Ok(Json(summary))
}
