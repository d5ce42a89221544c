use anyhow::Context;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{first_non_empty, Details, MediaKind, SearchResult, WatchProviders};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base: String,
    api_key: Option<String>,
}

pub(crate) fn build_http_client(timeout: Duration) -> anyhow::Result<Client> {
    let user_agent = format!("movie-explorer/{}", env!("CARGO_PKG_VERSION"));
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .context("Failed to build HTTP client")
}

impl TmdbClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(config.request_timeout)?,
            base: config.tmdb_base.trim_end_matches('/').to_string(),
            api_key: config.tmdb_api_key.clone(),
        })
    }

    pub async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, ApiError> {
        let path = format!(
            "/search/multi?include_adult=false&language=en-US&query={}",
            urlencoding::encode(query)
        );
        let data: SearchResponse = self.get_json(&path, cancel).await?;
        let results = normalize_results(data.results);
        debug!(query = %query, count = results.len(), "TMDB search finished");
        Ok(results)
    }

    pub async fn details(
        &self,
        kind: MediaKind,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<Details, ApiError> {
        let path = format!(
            "/{kind}/{id}?language=en-US&append_to_response=images,credits,videos"
        );
        self.get_json(&path, cancel).await
    }

    pub async fn watch_providers(
        &self,
        kind: MediaKind,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<WatchProviders, ApiError> {
        let path = format!("/{kind}/{id}/watch/providers");
        self.get_json(&path, cancel).await
    }

    fn api_key(&self) -> Result<&str, ApiError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ApiError::Config("Missing TMDB API key (set TMDB_API_KEY)".to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        let key = self.api_key()?;
        let sep = if path.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{path}{sep}api_key={}",
            self.base,
            urlencoding::encode(key)
        );
        debug!(path = %path, "TMDB request");

        let request = async {
            let res = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| ApiError::Transport(e.without_url()))?;
            let status = res.status();
            let text = res
                .text()
                .await
                .map_err(|e| ApiError::Transport(e.without_url()))?;
            if !status.is_success() {
                warn!(path = %path, status = status.as_u16(), "TMDB error response: {}", text);
                return Err(ApiError::Request {
                    path: path.to_string(),
                    status: status.as_u16(),
                    body: text,
                });
            }
            Ok::<T, ApiError>(serde_json::from_str::<T>(&text)?)
        };

        // Dropping the request future aborts the connection.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(path = %path, "TMDB request cancelled");
                Err(ApiError::Cancelled)
            }
            res = request => res,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
    media_type: Option<String>,
    title: Option<String>,
    name: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f64>,
    original_language: Option<String>,
}

/// Keeps movie and tv hits in remote order and maps them onto [`SearchResult`].
fn normalize_results(hits: Vec<SearchHit>) -> Vec<SearchResult> {
    hits.into_iter()
        .filter_map(|hit| {
            let media_type = match hit.media_type.as_deref() {
                Some("movie") => MediaKind::Movie,
                Some("tv") => MediaKind::Tv,
                _ => return None,
            };
            let title = first_non_empty(&[hit.title.as_deref(), hit.name.as_deref()])
                .unwrap_or_default()
                .to_string();
            let release_date =
                first_non_empty(&[hit.release_date.as_deref(), hit.first_air_date.as_deref()])
                    .map(str::to_string);
            Some(SearchResult {
                id: hit.id,
                media_type,
                title,
                name: hit.name,
                poster_path: hit.poster_path,
                backdrop_path: hit.backdrop_path,
                overview: hit.overview,
                release_date,
                vote_average: hit.vote_average,
                original_language: hit.original_language,
            })
        })
        .collect()
}
