mod draw_client;
mod price_source;

pub use draw_client::HttpDrawService;
pub use price_source::{CoinGeckoPriceSource, COINGECKO_BASE_URL};

use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use ecorewards_domain::shared::DomainError;

use crate::config::TimeoutConfig;

const USER_AGENT: &str = concat!("ecorewards/", env!("CARGO_PKG_VERSION"));

/// Retry policy shared by the outbound HTTP clients.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            backoff_multiplier: 2.0,
            max_backoff_ms: 5_000,
        }
    }
}

pub(crate) fn build_client() -> Result<Client, DomainError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TimeoutConfig::global().http_request)
        .build()
        .map_err(|e| DomainError::Infrastructure(format!("Failed to create HTTP client: {e}")))
}

/// Whether a failed request is worth another attempt.
///
/// Retries network errors, timeouts, 5xx and 429. Other 4xx responses are
/// the caller's fault and will not get better.
pub(crate) fn is_retryable(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }
    match error.status() {
        Some(status) => status.is_server_error() || status.as_u16() == 429,
        None => false,
    }
}

/// Execute a request with retry and exponential backoff.
pub(crate) async fn execute_with_retry<F, Fut, T>(
    retry: &RetryConfig,
    operation_name: &str,
    mut request_fn: F,
) -> Result<T, reqwest::Error>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 0;
    let mut backoff_ms = retry.initial_backoff_ms;

    loop {
        attempt += 1;

        match request_fn().await {
            Ok(response) => {
                if attempt > 1 {
                    debug!("{} succeeded after {} attempts", operation_name, attempt);
                }
                return Ok(response);
            }
            Err(e) => {
                let should_retry = attempt <= retry.max_retries && is_retryable(&e);

                if !should_retry {
                    return Err(e);
                }

                warn!(
                    "⚠️  {} failed (attempt {}/{}): {}. Retrying in {}ms...",
                    operation_name, attempt, retry.max_retries, e, backoff_ms
                );
                sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms =
                    ((backoff_ms as f64 * retry.backoff_multiplier) as u64).min(retry.max_backoff_ms);
            }
        }
    }
}
