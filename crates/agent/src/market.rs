use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum MarketError {
    #[error("market data transport failure: {0}")]
    Transport(String),
}

/// External market/competitor search: free text in, free text out. Used only
/// by the researcher, which tolerates empty or missing data.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, MarketError>;
}
