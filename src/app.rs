use crate::api::{ApiClient, MovieApi};
use crate::config::Config;
use crate::details::{DetailsRoute, DetailsState, DetailsView};
use crate::error::ApiError;
use crate::render;
use crate::search::SearchView;
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn MovieApi>,
    pub region: String,
    pub image_base: String,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            api: Arc::new(ApiClient::new(config)?),
            region: config.watch_region.clone(),
            image_base: config.image_base.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

pub async fn run_server(config: Config) -> Result<()> {
    if config.tmdb_api_key.is_none() {
        warn!("TMDB_API_KEY is not set; searches and details will fail until it is configured");
    }
    if config.llm_endpoint.is_none() {
        info!("LLM_ENDPOINT is not set; AI insight will show a placeholder");
    }
    info!("Watch providers region: {}", config.watch_region);

    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(search_page))
        .route("/movie/:media_type/:id", get(details_page))
        // Older links used this prefix; serve the same page.
        .route("/details/:media_type/:id", get(details_page))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn search_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Html<String>) {
    let mut view = SearchView::new(params.query.unwrap_or_default());
    // Dropping the handler (client went away) cancels the upstream call.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let status = match view.submit(state.api.as_ref(), &cancel).await {
        Ok(()) => None,
        Err(e) => {
            let code = match &e {
                ApiError::Config(_) => {
                    error!("Search unavailable: {}", e);
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => {
                    warn!("Search failed: {}", e);
                    StatusCode::BAD_GATEWAY
                }
            };
            Some((code, e))
        }
    };

    match status {
        None => (
            StatusCode::OK,
            Html(render::search_page(&view, None, &state.image_base)),
        ),
        Some((code, e)) => (
            code,
            Html(render::search_page(&view, Some(&e), &state.image_base)),
        ),
    }
}

async fn details_page(
    State(state): State<AppState>,
    Path((media_type, id)): Path<(String, String)>,
) -> (StatusCode, Html<String>) {
    let Some(route) = DetailsRoute::parse(&media_type, &id) else {
        warn!("Rejecting details route {}/{}", media_type, id);
        return (StatusCode::NOT_FOUND, Html(render::not_found_page()));
    };

    // The view cancels its loads when dropped, including when this handler is.
    let mut view = DetailsView::new(state.api.clone(), state.region.clone());
    view.enter(route);
    match view.settled().await {
        DetailsState::Found(page) => (
            StatusCode::OK,
            Html(render::details_page(&page, &state.image_base)),
        ),
        DetailsState::NotFound => (StatusCode::NOT_FOUND, Html(render::not_found_page())),
        DetailsState::Loading => (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(render::loading_page()),
        ),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
