//! Agriculture headlines from newsapi.org.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LookupError;

const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
const MAX_ARTICLES: usize = 20;

/// One headline as the dashboard renders it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "urlToImage")]
    pub url_to_image: Option<String>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
}

pub struct NewsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NewsClient {
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

    /// Fetches agriculture headlines, newest first, capped at 20.
    pub async fn agro_news(&self) -> Result<Vec<Article>, LookupError> {
        let url = format!("{}/everything", self.base_url.trim_end_matches('/'));
        debug!("fetching agriculture news");
        let body: EverythingResponse = self
            .http
            .get(&url)
            .query(&[("q", "agriculture"), ("apiKey", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await?;

        if body.status != "ok" {
            return Err(LookupError::Api(
                body.message.unwrap_or_else(|| body.status.clone()),
            ));
        }

        let mut articles = body.articles;
        articles.truncate(MAX_ARTICLES);
        Ok(articles)
    }
}

#[derive(Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}
