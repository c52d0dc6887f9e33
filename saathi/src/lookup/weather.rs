//! Current-conditions lookup from weatherapi.com.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LookupError;

const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

/// Conditions at a point, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDetails {
    pub condition: String,
    pub temp_c: f64,
    pub humidity: f64,
    pub wind_kph: f64,
    pub pressure_mb: f64,
}

pub struct WeatherClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
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

    /// Fetches current conditions for a latitude/longitude pair.
    ///
    /// The provider reports its own failures (bad key, unknown location) inside a 200
    /// body with an `error` object; those surface as [`LookupError::Api`].
    pub async fn current(&self, lat: f64, lon: f64) -> Result<WeatherDetails, LookupError> {
        let url = format!(
            "{}/current.json",
            self.base_url.trim_end_matches('/')
        );
        debug!(lat, lon, "fetching current weather");
        let body: serde_json::Value = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", &format!("{lat},{lon}")),
                ("aqi", "no"),
            ])
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown provider error");
            return Err(LookupError::Api(message.to_string()));
        }

        let current: CurrentBlock = serde_json::from_value(
            body.get("current")
                .cloned()
                .ok_or(LookupError::MalformedResponse("current"))?,
        )
        .map_err(|_| LookupError::MalformedResponse("current"))?;

        Ok(WeatherDetails {
            condition: current.condition.text,
            temp_c: current.temp_c,
            humidity: current.humidity,
            wind_kph: current.wind_kph,
            pressure_mb: current.pressure_mb,
        })
    }
}

#[derive(Deserialize)]
struct CurrentBlock {
    condition: Condition,
    temp_c: f64,
    humidity: f64,
    wind_kph: f64,
    pressure_mb: f64,
}

#[derive(Deserialize)]
struct Condition {
    text: String,
}
