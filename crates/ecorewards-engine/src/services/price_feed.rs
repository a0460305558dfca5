use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use ecorewards_domain::pricing::{
    fallback_snapshot, PriceEvent, PriceSnapshot, PriceSource, DEFAULT_COINS,
};
use ecorewards_infrastructure::config::TimeoutConfig;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Process-wide spot-price cache with exactly one refresh loop regardless
/// of subscriber count.
///
/// Consumers either pull `latest_snapshot()` or subscribe to the event
/// channel; attaching and detaching never restarts the loop. On a failed
/// refresh the previous snapshot stays authoritative, and before any live
/// data arrives the static fallback set is served so prize displays are
/// never empty.
pub struct PriceFeedCache {
    source: Arc<dyn PriceSource>,
    refresh_interval: Duration,
    snapshot: Arc<RwLock<PriceSnapshot>>,
    events: broadcast::Sender<PriceEvent>,
    refresh_handle: Mutex<Option<JoinHandle<()>>>,
}

impl PriceFeedCache {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self::with_interval(source, DEFAULT_REFRESH_INTERVAL)
    }

    pub fn with_interval(source: Arc<dyn PriceSource>, refresh_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            source,
            refresh_interval,
            snapshot: Arc::new(RwLock::new(fallback_snapshot())),
            events,
            refresh_handle: Mutex::new(None),
        }
    }

    /// Start the refresh loop. A second call while running is a no-op.
    pub fn start(&self) {
        let mut handle = match self.refresh_handle.lock() {
            Ok(handle) => handle,
            Err(poisoned) => poisoned.into_inner(),
        };
        if handle.is_some() {
            debug!("Price feed already running");
            return;
        }

        info!(
            "✅ Price feed started ({}s interval)",
            self.refresh_interval.as_secs()
        );

        let source = Arc::clone(&self.source);
        let snapshot = Arc::clone(&self.snapshot);
        let events = self.events.clone();
        let interval = self.refresh_interval;

        *handle = Some(tokio::spawn(async move {
            loop {
                Self::refresh_once(&source, &snapshot, &events).await;
                tokio::time::sleep(interval).await;
            }
        }));
    }

    /// Stop the refresh loop deterministically. Idempotent.
    pub fn stop(&self) {
        let mut handle = match self.refresh_handle.lock() {
            Ok(handle) => handle,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(task) = handle.take() {
            task.abort();
            info!("Price feed stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        match self.refresh_handle.lock() {
            Ok(handle) => handle.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    /// Latest snapshot: live if one has arrived, stale-but-available after
    /// an error, fallback before any fetch succeeded.
    pub async fn latest_snapshot(&self) -> PriceSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Attach an observer. Dropping the receiver detaches it; the loop is
    /// unaffected either way.
    pub fn subscribe(&self) -> broadcast::Receiver<PriceEvent> {
        self.events.subscribe()
    }

    /// Approximate crypto quantity a fixed USD prize is worth right now.
    pub async fn prize_quantity(&self, usd_amount: f64, symbol: &str) -> Option<f64> {
        self.snapshot
            .read()
            .await
            .prize_quantity(usd_amount, symbol)
    }

    async fn refresh_once(
        source: &Arc<dyn PriceSource>,
        snapshot: &Arc<RwLock<PriceSnapshot>>,
        events: &broadcast::Sender<PriceEvent>,
    ) {
        let fetch = source.get_current_prices(&DEFAULT_COINS);

        match timeout(TimeoutConfig::global().price_fetch, fetch).await {
            Ok(Ok(fresh)) => {
                *snapshot.write().await = fresh.clone();
                // No receivers is fine; pull consumers still see the write.
                let _ = events.send(PriceEvent::Updated(fresh));
            }
            Ok(Err(e)) => {
                warn!("Price refresh failed, serving previous snapshot: {}", e);
                let _ = events.send(PriceEvent::Error {
                    message: e.to_string(),
                });
            }
            Err(_) => {
                warn!("Price refresh timed out, serving previous snapshot");
                let _ = events.send(PriceEvent::Error {
                    message: "Price fetch timed out".to_string(),
                });
            }
        }
    }
}

impl Drop for PriceFeedCache {
    fn drop(&mut self) {
        // The recurring timer must not outlive its owner.
        self.stop();
    }
}
