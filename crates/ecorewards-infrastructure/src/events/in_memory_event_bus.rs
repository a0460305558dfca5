use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use ecorewards_domain::events::{DomainEvent, EventBus};
use ecorewards_domain::shared::DomainError;

type EventHandler = Arc<dyn Fn(&dyn DomainEvent) + Send + Sync>;

/// In-memory event bus that dispatches events synchronously to registered
/// handlers. Collaborators (notification/UI layers) subscribe here; the
/// engine itself never formats display strings.
pub struct InMemoryEventBus {
    handlers: Arc<RwLock<Vec<EventHandler>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn subscribe(&self, handler: EventHandler) {
        self.handlers.write().await.push(handler);
    }

    pub async fn handler_count(&self) -> usize {
        self.handlers.read().await.len()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError> {
        let handlers = self.handlers.read().await;
        debug!(
            "Publishing {} to {} handler(s)",
            event.event_type_name(),
            handlers.len()
        );
        for handler in handlers.iter() {
            handler(event.as_ref());
        }
        Ok(())
    }
}
