use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use ecorewards_domain::pricing::{CoinPrice, PriceSnapshot, PriceSource, SnapshotSource};
use ecorewards_domain::shared::DomainError;

use super::{build_client, execute_with_retry, RetryConfig};

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Spot-price source backed by the CoinGecko simple-price endpoint.
/// Only the price feed cache talks to this; everything else reads the
/// cached snapshot.
pub struct CoinGeckoPriceSource {
    client: Client,
    base_url: String,
    retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct SimplePriceEntry {
    usd: f64,
    #[serde(default)]
    usd_24h_change: f64,
}

impl CoinGeckoPriceSource {
    pub fn new() -> Result<Self, DomainError> {
        Self::with_base_url(COINGECKO_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DomainError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl PriceSource for CoinGeckoPriceSource {
    async fn get_current_prices(&self, symbols: &[&str]) -> Result<PriceSnapshot, DomainError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            self.base_url,
            symbols.join(",")
        );
        let url = url.as_str();
        let client = &self.client;

        let body: HashMap<String, SimplePriceEntry> =
            execute_with_retry(&self.retry, "Fetch spot prices", || async move {
                client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<HashMap<String, SimplePriceEntry>>()
                    .await
            })
            .await
            .map_err(|e| DomainError::ExternalService(format!("Fetch spot prices: {e}")))?;

        if body.is_empty() {
            return Err(DomainError::ExternalService(
                "Price source returned no prices".to_string(),
            ));
        }

        let prices = body
            .into_iter()
            .map(|(symbol, entry)| {
                (
                    symbol,
                    CoinPrice {
                        usd: entry.usd,
                        usd_24h_change: entry.usd_24h_change,
                    },
                )
            })
            .collect();

        Ok(PriceSnapshot {
            prices,
            fetched_at: Utc::now(),
            source: SnapshotSource::Live,
        })
    }
}
