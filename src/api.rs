use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::ApiError;
use crate::insight::InsightClient;
use crate::models::{Details, MediaKind, SearchResult, WatchProviders};
use crate::tmdb::TmdbClient;

/// Everything the views need from the outside world.
///
/// Each call observes `cancel`: once it fires, the in-flight request is
/// dropped and the call resolves to [`ApiError::Cancelled`].
#[async_trait]
pub trait MovieApi: Send + Sync {
    async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, ApiError>;
    async fn details(
        &self,
        kind: MediaKind,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<Details, ApiError>;
    async fn watch_providers(
        &self,
        kind: MediaKind,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<WatchProviders, ApiError>;
    /// Never fails except by cancellation; problems come back as text.
    async fn ai_insight(
        &self,
        title: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    tmdb: TmdbClient,
    insight: InsightClient,
}

impl ApiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            tmdb: TmdbClient::new(config)?,
            insight: InsightClient::new(config)?,
        })
    }
}

#[async_trait]
impl MovieApi for ApiClient {
    async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, ApiError> {
        self.tmdb.search(query, cancel).await
    }

    async fn details(
        &self,
        kind: MediaKind,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<Details, ApiError> {
        self.tmdb.details(kind, id, cancel).await
    }

    async fn watch_providers(
        &self,
        kind: MediaKind,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<WatchProviders, ApiError> {
        self.tmdb.watch_providers(kind, id, cancel).await
    }

    async fn ai_insight(
        &self,
        title: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ApiError> {
        self.insight.ask(title, cancel).await
    }
}
