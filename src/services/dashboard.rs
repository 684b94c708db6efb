//! Catalog counters for the index page

use crate::{
    error::AppResult,
    models::CatalogSummary,
    repository::{CatalogStore, Repository},
};

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Book, copy, available copy and author counts from one snapshot
    pub async fn summary(&self) -> AppResult<CatalogSummary> {
        self.repository.summary().await
    }
}
