use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::MovieApi;
use crate::error::ApiError;
use crate::models::{MediaKind, SearchResult};

/// Path of the details page for one title. Cards link here and the router
/// serves it, so both sides always agree.
pub fn details_path(kind: MediaKind, id: u64) -> String {
    format!("/movie/{kind}/{id}")
}

#[derive(Debug, Clone, Default)]
pub struct SearchView {
    query: String,
    results: Vec<SearchResult>,
}

impl SearchView {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            results: Vec::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Runs the search for the current query and replaces the result list.
    ///
    /// A blank query is ignored: no request is made and the previous results stay.
    pub async fn submit(
        &mut self,
        api: &dyn MovieApi,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        let query = self.query.trim();
        if query.is_empty() {
            debug!("Ignoring blank search");
            return Ok(());
        }
        let results = api.search(query, cancel).await?;
        info!("Search '{}' returned {} results", query, results.len());
        self.results = results;
        Ok(())
    }
}
