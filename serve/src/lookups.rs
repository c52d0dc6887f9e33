//! Cached lookup routes: weather, news, mandi prices.
//!
//! Providers rate-limit, so each route caches under a TTL sized to how fast the
//! data actually moves. A provider failure answers 502; missing API keys answer 503
//! without touching the network.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use saathi::cache::Cache;
use saathi::lookup::LookupError;

use crate::app::AppState;

const WEATHER_TTL: Duration = Duration::from_secs(3600);
const NEWS_TTL: Duration = Duration::from_secs(86_400);
const PRICES_TTL: Duration = Duration::from_secs(3600);

const NEWS_CACHE_KEY: &str = "agro_news";
const PRICES_CACHE_KEY: &str = "market_prices";

fn unconfigured() -> (StatusCode, Json<Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"error": "external lookups are not configured"})),
    )
}

fn provider_failure(e: LookupError) -> (StatusCode, Json<Value>) {
    warn!(error = %e, "lookup failed");
    (StatusCode::BAD_GATEWAY, Json(json!({"error": e.to_string()})))
}

fn ok(value: impl serde::Serialize) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(serde_json::to_value(value).unwrap_or_else(|_| json!(null))),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeatherQuery {
    lat: f64,
    lon: f64,
}

pub(crate) async fn weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> (StatusCode, Json<Value>) {
    let Some(lookups) = &state.lookups else {
        return unconfigured();
    };
    let key = format!("weather_{},{}", query.lat, query.lon);
    if let Some(details) = state.weather_cache.get(&key).await {
        debug!(%key, "weather cache hit");
        return ok(details);
    }
    match lookups.weather.current(query.lat, query.lon).await {
        Ok(details) => {
            if let Err(e) = state
                .weather_cache
                .set(key, details.clone(), Some(WEATHER_TTL))
                .await
            {
                warn!(error = %e, "could not cache weather lookup");
            }
            ok(details)
        }
        Err(e) => provider_failure(e),
    }
}

pub(crate) async fn news(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let Some(lookups) = &state.lookups else {
        return unconfigured();
    };
    let key = NEWS_CACHE_KEY.to_string();
    if let Some(articles) = state.news_cache.get(&key).await {
        debug!("news cache hit");
        return ok(articles);
    }
    match lookups.news.agro_news().await {
        Ok(articles) => {
            if let Err(e) = state
                .news_cache
                .set(key, articles.clone(), Some(NEWS_TTL))
                .await
            {
                warn!(error = %e, "could not cache news lookup");
            }
            ok(articles)
        }
        Err(e) => provider_failure(e),
    }
}

pub(crate) async fn prices(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let Some(lookups) = &state.lookups else {
        return unconfigured();
    };
    let key = PRICES_CACHE_KEY.to_string();
    if let Some(records) = state.prices_cache.get(&key).await {
        debug!("prices cache hit");
        return ok(records);
    }
    match lookups.market.prices_all_states().await {
        Ok(records) => {
            if let Err(e) = state
                .prices_cache
                .set(key, records.clone(), Some(PRICES_TTL))
                .await
            {
                warn!(error = %e, "could not cache price lookup");
            }
            ok(records)
        }
        Err(e) => provider_failure(e),
    }
}
