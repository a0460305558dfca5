use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::DomainError;

/// Coin set the cache keeps warm. Prize displays only ever need these.
pub const DEFAULT_COINS: [&str; 3] = ["bitcoin", "ethereum", "binancecoin"];

/// Spot price of one coin in USD plus its 24h movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinPrice {
    pub usd: f64,
    pub usd_24h_change: f64,
}

/// Where a snapshot came from. Fallback data is served until the first
/// successful fetch so displays are never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    Live,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub prices: HashMap<String, CoinPrice>,
    pub fetched_at: DateTime<Utc>,
    pub source: SnapshotSource,
}

impl PriceSnapshot {
    pub fn price_of(&self, symbol: &str) -> Option<CoinPrice> {
        self.prices.get(symbol).copied()
    }

    /// Approximate crypto quantity a fixed USD prize is worth at this
    /// snapshot. None for an unknown symbol or a non-positive price.
    pub fn prize_quantity(&self, usd_amount: f64, symbol: &str) -> Option<f64> {
        let price = self.price_of(symbol)?;
        if price.usd <= 0.0 {
            return None;
        }
        Some(usd_amount / price.usd)
    }
}

/// Static price set served before any live data arrives.
pub fn fallback_snapshot() -> PriceSnapshot {
    let mut prices = HashMap::new();
    prices.insert(
        "bitcoin".to_string(),
        CoinPrice {
            usd: 45_000.0,
            usd_24h_change: 2.5,
        },
    );
    prices.insert(
        "ethereum".to_string(),
        CoinPrice {
            usd: 3_000.0,
            usd_24h_change: 1.8,
        },
    );

    PriceSnapshot {
        prices,
        fetched_at: Utc::now(),
        source: SnapshotSource::Fallback,
    }
}

/// One refresh tick as observed by subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PriceEvent {
    Updated(PriceSnapshot),
    Error { message: String },
}

/// External spot-price source, polled only by the price feed cache.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn get_current_prices(&self, symbols: &[&str]) -> Result<PriceSnapshot, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_snapshot_has_documented_prices() {
        let snapshot = fallback_snapshot();
        assert_eq!(snapshot.source, SnapshotSource::Fallback);

        let btc = snapshot.price_of("bitcoin").unwrap();
        assert_eq!(btc.usd, 45_000.0);
        assert_eq!(btc.usd_24h_change, 2.5);

        let eth = snapshot.price_of("ethereum").unwrap();
        assert_eq!(eth.usd, 3_000.0);
        assert_eq!(eth.usd_24h_change, 1.8);
    }

    #[test]
    fn test_prize_quantity() {
        let snapshot = fallback_snapshot();
        // $1000 of BTC at $45k/BTC.
        let qty = snapshot.prize_quantity(1_000.0, "bitcoin").unwrap();
        assert!((qty - 1_000.0 / 45_000.0).abs() < 1e-12);

        assert!(snapshot.prize_quantity(1_000.0, "dogecoin").is_none());
    }
}
