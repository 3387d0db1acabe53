use std::time::Duration;

use async_trait::async_trait;

use outfitter_agent::market::{MarketDataClient, MarketError};
use outfitter_core::config::MarketConfig;

/// Keep only so much of an external response; the researcher truncates again
/// before synthesis, this bound just caps what crosses the process boundary.
const MAX_BODY_CHARS: usize = 4_000;

/// GET-based market search against a configured endpoint that returns free
/// text (the query travels as `?q=`).
pub struct HttpMarketDataClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMarketDataClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self, MarketError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|error| MarketError::Transport(error.to_string()))?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &MarketConfig) -> Result<Option<Self>, MarketError> {
        match &config.base_url {
            Some(base_url) => Ok(Some(Self::new(base_url.clone(), config.timeout_secs)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl MarketDataClient for HttpMarketDataClient {
    async fn search(&self, query: &str) -> Result<String, MarketError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|error| MarketError::Transport(error.to_string()))?;

        if !response.status().is_success() {
            return Err(MarketError::Transport(format!(
                "market endpoint returned {}",
                response.status()
            )));
        }

        let body =
            response.text().await.map_err(|error| MarketError::Transport(error.to_string()))?;
        Ok(body.chars().take(MAX_BODY_CHARS).collect())
    }
}

/// Stands in when no market endpoint is configured: the researcher then
/// synthesizes from internal data alone.
#[derive(Clone, Debug, Default)]
pub struct NoopMarketDataClient;

#[async_trait]
impl MarketDataClient for NoopMarketDataClient {
    async fn search(&self, _query: &str) -> Result<String, MarketError> {
        Ok(String::new())
    }
}
