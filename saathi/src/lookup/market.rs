//! Mandi commodity prices from the data.gov.in open-data API.
//!
//! The upstream dataset is the daily "current price of various commodities" resource.
//! Prices come back one state at a time; [`MarketClient::prices_all_states`] walks the
//! fixed state list and concatenates the records.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::LookupError;

const DEFAULT_BASE_URL: &str = "https://api.data.gov.in";
const RESOURCE_ID: &str = "9ef84268-d588-465a-a308-a864a43d0070";

/// States the price board covers. "Uttrakhand" is spelled the way the upstream
/// dataset spells it.
pub const PRICE_STATES: [&str; 12] = [
    "Kerala",
    "Uttrakhand",
    "Uttar Pradesh",
    "Rajasthan",
    "Nagaland",
    "Gujarat",
    "Maharashtra",
    "Tripura",
    "Punjab",
    "Bihar",
    "Telangana",
    "Meghalaya",
];

/// One mandi price row. The upstream API serves every field as a string, prices
/// included, and that is preserved here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub commodity: Option<String>,
    #[serde(default)]
    pub variety: Option<String>,
    #[serde(default)]
    pub arrival_date: Option<String>,
    #[serde(default)]
    pub min_price: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
    #[serde(default)]
    pub modal_price: Option<String>,
}

pub struct MarketClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl MarketClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn prices_for_state(&self, state: &str) -> Result<Vec<MarketRecord>, LookupError> {
        let url = format!(
            "{}/resource/{}",
            self.base_url.trim_end_matches('/'),
            RESOURCE_ID
        );
        let body: ResourceResponse = self
            .http
            .get(&url)
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("format", "json"),
                ("filters[state]", state),
            ])
            .send()
            .await?
            .json()
            .await?;
        Ok(body.records)
    }

    /// Fetches prices for every state on the board. A state whose fetch fails is
    /// skipped with a warning rather than failing the whole board.
    pub async fn prices_all_states(&self) -> Result<Vec<MarketRecord>, LookupError> {
        let mut all = Vec::new();
        for state in PRICE_STATES {
            debug!(state, "fetching mandi prices");
            match self.prices_for_state(state).await {
                Ok(mut records) => all.append(&mut records),
                Err(e) => warn!(state, error = %e, "skipping state after failed price fetch"),
            }
        }
        Ok(all)
    }
}

#[derive(Deserialize)]
struct ResourceResponse {
    #[serde(default)]
    records: Vec<MarketRecord>,
}
