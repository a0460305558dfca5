use std::time::Duration;

/// Configuration for various timeout durations across the application
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// HTTP request timeout
    pub http_request: Duration,

    /// Upper bound on one draw-entry submission round
    pub draw_submit: Duration,

    /// Upper bound on one spot-price fetch
    pub price_fetch: Duration,

    /// Database query timeout
    pub db_query: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            http_request: Duration::from_secs(30),
            draw_submit: Duration::from_secs(10),
            price_fetch: Duration::from_secs(10),
            db_query: Duration::from_secs(10),
        }
    }
}

impl TimeoutConfig {
    /// Create a new timeout configuration with custom values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the global timeout configuration
    pub fn global() -> &'static Self {
        &GLOBAL_TIMEOUT_CONFIG
    }
}

/// Global timeout configuration instance
static GLOBAL_TIMEOUT_CONFIG: TimeoutConfig = TimeoutConfig {
    http_request: Duration::from_secs(30),
    draw_submit: Duration::from_secs(10),
    price_fetch: Duration::from_secs(10),
    db_query: Duration::from_secs(10),
};
