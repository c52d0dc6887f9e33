//! Axum app: state and router.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use saathi::cache::InMemoryCache;
use saathi::lookup::{Article, MarketClient, MarketRecord, NewsClient, WeatherClient, WeatherDetails};
use saathi::Advisor;

use crate::produce::ProduceStore;
use crate::session::SessionStore;

/// Clients for the external data providers. Optional as a group: when the
/// corresponding API keys are missing the lookup routes answer 503 instead of the
/// server refusing to start, so the chat API stays usable on a partial config.
pub struct LookupClients {
    pub weather: WeatherClient,
    pub news: NewsClient,
    pub market: MarketClient,
}

/// Shared state for the API server.
///
/// Injected into the router; handlers get an `Arc` clone per request.
pub struct AppState {
    pub advisor: Advisor,
    pub(crate) sessions: SessionStore,
    pub lookups: Option<LookupClients>,
    pub produce: Arc<dyn ProduceStore>,
    pub(crate) weather_cache: InMemoryCache<String, WeatherDetails>,
    pub(crate) news_cache: InMemoryCache<String, Vec<Article>>,
    pub(crate) prices_cache: InMemoryCache<String, Vec<MarketRecord>>,
}

impl AppState {
    pub fn new(
        advisor: Advisor,
        lookups: Option<LookupClients>,
        produce: Arc<dyn ProduceStore>,
    ) -> Self {
        Self {
            advisor,
            sessions: SessionStore::new(),
            lookups,
            produce,
            weather_cache: InMemoryCache::new(),
            news_cache: InMemoryCache::new(),
            prices_cache: InMemoryCache::new(),
        }
    }
}

/// Builds the router over the shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(crate::chat::chat))
        .route("/api/weather", get(crate::lookups::weather))
        .route("/api/news", get(crate::lookups::news))
        .route("/api/prices", get(crate::lookups::prices))
        .route(
            "/api/produce",
            post(crate::produce::create).get(crate::produce::list),
        )
        .route("/api/produce/:id", axum::routing::delete(crate::produce::delete))
        .route("/api/field-config", post(crate::field_config::generate))
        .with_state(state)
}
