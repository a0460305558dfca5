mod timeouts;

pub use timeouts::TimeoutConfig;

use std::path::PathBuf;
use std::time::Duration;

use crate::http::COINGECKO_BASE_URL;

/// Engine-level settings: where the database lives and which external
/// services to talk to.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_path: PathBuf,
    pub draw_api_base_url: String,
    pub price_api_base_url: String,
    pub price_refresh_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ecorewards");

        Self {
            database_path: data_dir.join("ecorewards.db"),
            draw_api_base_url: "http://localhost:5000".to_string(),
            price_api_base_url: COINGECKO_BASE_URL.to_string(),
            price_refresh_interval: Duration::from_secs(30),
        }
    }
}
