//! Clients for the external data providers behind the dashboard.
//!
//! Three read-only integrations: current weather for the farmer's coordinates,
//! agriculture news headlines, and mandi commodity prices. Each client owns its HTTP
//! handle and base URL (overridable so tests can point at a local stub). Callers are
//! expected to cache results; see [`crate::cache`].

mod market;
mod news;
mod weather;

pub use market::{MarketClient, MarketRecord, PRICE_STATES};
pub use news::{Article, NewsClient};
pub use weather::{WeatherClient, WeatherDetails};

/// Error from any external lookup.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("http transport: {0}")]
    Http(#[from] reqwest::Error),
    /// The provider answered with an error payload of its own.
    #[error("provider error: {0}")]
    Api(String),
    /// The provider answered 200 but the body was missing an expected field.
    #[error("malformed response: missing {0}")]
    MalformedResponse(&'static str),
}
