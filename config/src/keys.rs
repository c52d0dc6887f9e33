//! Typed view of the external-service API keys.
//!
//! The original deployment read every key from the environment at import time and left
//! missing ones as `None`, silently disabling features downstream. Here the resolution
//! happens once, explicitly, and the caller decides per service whether a missing key
//! is fatal (chat requires Gemini) or degrades an optional endpoint (lookups).

use thiserror::Error;

/// A required key was not present in the environment.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing environment variable: {0}")]
pub struct MissingKey(pub &'static str);

/// Environment variable names for the four external services.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const WEATHER_API_KEY: &str = "WEATHER_API_KEY";
pub const NEWSAPI_API_KEY: &str = "NEWSAPI_API_KEY";
pub const GOVDATA_API_KEY: &str = "GOVDATA_API_KEY";

/// Credentials for the external services, resolved from the environment at startup.
///
/// Optional keys stay `None` when unset; [`ApiKeys::require_gemini`] converts the one
/// key the advisor cannot run without into a hard error.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Gemini language-model key (chat advisor).
    pub gemini: Option<String>,
    /// weatherapi.com key (weather lookup).
    pub weather: Option<String>,
    /// newsapi.org key (agro news lookup).
    pub newsapi: Option<String>,
    /// data.gov.in key (market price lookup).
    pub govdata: Option<String>,
}

impl ApiKeys {
    /// Reads all keys from the process environment. Call after
    /// [`load_and_apply`](crate::load_and_apply). Empty values count as unset.
    pub fn from_env() -> Self {
        fn get(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }
        Self {
            gemini: get(GEMINI_API_KEY),
            weather: get(WEATHER_API_KEY),
            newsapi: get(NEWSAPI_API_KEY),
            govdata: get(GOVDATA_API_KEY),
        }
    }

    /// Returns the Gemini key or a [`MissingKey`] error. The conversational advisor
    /// fails fast at startup without it.
    pub fn require_gemini(&self) -> Result<&str, MissingKey> {
        self.gemini.as_deref().ok_or(MissingKey(GEMINI_API_KEY))
    }
}
