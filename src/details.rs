//! Details view: loads one title and its optional sections.
//!
//! The view moves `Loading -> Found | NotFound` and stays there until it is
//! entered with different route parameters. Each entry gets its own
//! cancellation token and epoch. A load task may only write while both are
//! current, so requests started for an earlier route never touch the state.
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::MovieApi;
use crate::error::ApiError;
use crate::models::{Details, MediaKind, WatchProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailsRoute {
    pub kind: MediaKind,
    pub id: u64,
}

impl DetailsRoute {
    pub fn new(kind: MediaKind, id: u64) -> Self {
        Self { kind, id }
    }

    /// Parses the raw path segments; `None` when either is invalid.
    pub fn parse(kind: &str, id: &str) -> Option<Self> {
        let kind = kind.parse::<MediaKind>().ok()?;
        let id = id.parse::<u64>().ok()?;
        Some(Self { kind, id })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsPage {
    pub details: Details,
    /// Subscription providers for the view's region; `None` until fetched or on failure.
    pub providers: Option<Vec<WatchProvider>>,
    pub insight: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsState {
    Loading,
    Found(Box<DetailsPage>),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct DetailsSnapshot {
    pub route: Option<DetailsRoute>,
    pub epoch: u64,
    pub state: DetailsState,
    /// Set once the load task for `epoch` has nothing left to fetch.
    pub settled: bool,
}

struct ActiveLoad {
    route: DetailsRoute,
    token: CancellationToken,
}

pub struct DetailsView {
    api: Arc<dyn MovieApi>,
    region: String,
    tx: Arc<watch::Sender<DetailsSnapshot>>,
    active: Option<ActiveLoad>,
}

impl DetailsView {
    pub fn new(api: Arc<dyn MovieApi>, region: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(DetailsSnapshot {
            route: None,
            epoch: 0,
            state: DetailsState::Loading,
            settled: false,
        });
        Self {
            api,
            region: region.into(),
            tx: Arc::new(tx),
            active: None,
        }
    }

    /// Shows `route`. Re-entering the current route is a no-op; anything else
    /// cancels the running load and starts over from `Loading`.
    pub fn enter(&mut self, route: DetailsRoute) {
        if self.active.as_ref().is_some_and(|a| a.route == route) {
            return;
        }
        self.cancel_active();

        let mut epoch = 0;
        self.tx.send_modify(|snap| {
            snap.epoch += 1;
            snap.route = Some(route);
            snap.state = DetailsState::Loading;
            snap.settled = false;
            epoch = snap.epoch;
        });

        let token = CancellationToken::new();
        let writer = StateWriter {
            tx: self.tx.clone(),
            epoch,
            token: token.clone(),
        };
        debug!(kind = %route.kind, id = route.id, epoch, "Entering details view");
        tokio::spawn(load(self.api.clone(), self.region.clone(), route, writer));
        self.active = Some(ActiveLoad { route, token });
    }

    /// Tears the view down; in-flight calls are cancelled and can no longer write.
    pub fn leave(&mut self) {
        self.cancel_active();
    }

    pub fn route(&self) -> Option<DetailsRoute> {
        self.active.as_ref().map(|a| a.route)
    }

    pub fn state(&self) -> DetailsState {
        self.tx.borrow().state.clone()
    }

    pub fn snapshot(&self) -> DetailsSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailsSnapshot> {
        self.tx.subscribe()
    }

    /// Waits until the current load has finished every fetch and returns its state.
    pub async fn settled(&self) -> DetailsState {
        let mut rx = self.tx.subscribe();
        let epoch = rx.borrow().epoch;
        let result = rx
            .wait_for(|snap| snap.epoch != epoch || snap.settled)
            .await
            .map(|snap| snap.state.clone());
        match result {
            Ok(state) => state,
            Err(_) => self.state(),
        }
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(kind = %active.route.kind, id = active.route.id, "Cancelling details load");
            active.token.cancel();
        }
    }
}

impl Drop for DetailsView {
    fn drop(&mut self) {
        self.cancel_active();
    }
}

/// Write access to the view state for one load task.
struct StateWriter {
    tx: Arc<watch::Sender<DetailsSnapshot>>,
    epoch: u64,
    token: CancellationToken,
}

impl StateWriter {
    /// Applies `change` only while this load is still the current one.
    fn apply<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut DetailsSnapshot),
    {
        self.tx.send_if_modified(|snap| {
            if snap.epoch != self.epoch || self.token.is_cancelled() {
                return false;
            }
            change(snap);
            true
        })
    }

    fn set_state(&self, state: DetailsState) -> bool {
        self.apply(|snap| snap.state = state)
    }

    fn update_page<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut DetailsPage),
    {
        self.apply(|snap| {
            if let DetailsState::Found(page) = &mut snap.state {
                change(page.as_mut());
            }
        })
    }

    fn finish(&self) {
        self.apply(|snap| snap.settled = true);
    }
}

async fn load(api: Arc<dyn MovieApi>, region: String, route: DetailsRoute, writer: StateWriter) {
    let cancel = writer.token.clone();

    let details = match api.details(route.kind, route.id, &cancel).await {
        Ok(details) => details,
        Err(ApiError::Cancelled) => return,
        Err(e) => {
            warn!(kind = %route.kind, id = route.id, "Details fetch failed: {}", e);
            writer.set_state(DetailsState::NotFound);
            writer.finish();
            return;
        }
    };

    let title = details.display_title().to_string();
    info!("Loaded details for '{}' ({} {})", title, route.kind, route.id);
    let found = writer.set_state(DetailsState::Found(Box::new(DetailsPage {
        details,
        providers: None,
        insight: None,
    })));
    if !found {
        return;
    }

    let providers = async {
        match api.watch_providers(route.kind, route.id, &cancel).await {
            Ok(wp) => {
                let offers = wp.subscription(&region).to_vec();
                debug!(region = %region, count = offers.len(), "Watch providers loaded");
                writer.update_page(|page| page.providers = Some(offers));
            }
            Err(ApiError::Cancelled) => {}
            Err(e) => warn!("Watch providers unavailable for '{}': {}", title, e),
        }
    };
    let insight = async {
        match api.ai_insight(&title, &cancel).await {
            Ok(text) => {
                writer.update_page(|page| page.insight = Some(text));
            }
            Err(ApiError::Cancelled) => {}
            Err(e) => warn!("AI insight unavailable for '{}': {}", title, e),
        }
    };
    tokio::join!(providers, insight);

    writer.finish();
}
