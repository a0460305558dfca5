use std::sync::Arc;
use tracing::info;

use ecorewards_domain::events::EventBus;
use ecorewards_domain::shared::DomainError;
use ecorewards_infrastructure::config::EngineConfig;
use ecorewards_infrastructure::events::InMemoryEventBus;
use ecorewards_infrastructure::http::{CoinGeckoPriceSource, HttpDrawService};
use ecorewards_infrastructure::logging::init_logger;
use ecorewards_infrastructure::persistence::repositories::{
    SqliteAchievementRepository, SqliteActivityTypeRepository, SqliteDrawEntryRepository,
    SqliteLedgerRepository, SqliteResetRepository, SqliteSubscriptionRepository,
    SqliteUserRepository,
};
use ecorewards_infrastructure::persistence::Database;

use crate::queries::StatsQueries;
use crate::services::{
    AchievementEvaluator, DrawEntryAllocator, MonthlyResetScheduler, PointsEngine, PriceFeedCache,
};

/// Fully wired engine: repositories, services and queries sharing one
/// pool and one event bus. The embedding application decides the price
/// feed lifecycle via `price_feed.start()` / `stop()`.
pub struct RewardsRuntime {
    pub engine: Arc<PointsEngine>,
    pub evaluator: Arc<AchievementEvaluator>,
    pub scheduler: Arc<MonthlyResetScheduler>,
    pub allocator: Arc<DrawEntryAllocator>,
    pub price_feed: Arc<PriceFeedCache>,
    pub queries: Arc<StatsQueries>,
    pub event_bus: Arc<InMemoryEventBus>,
}

impl RewardsRuntime {
    pub async fn build(config: EngineConfig) -> Result<Self, DomainError> {
        if let Err(e) = init_logger(None) {
            // A second runtime in-process reuses the first subscriber.
            tracing::debug!("Logger already initialized: {}", e);
        }

        let database = Database::new(&config.database_path.to_string_lossy()).await?;
        database.run_migrations().await?;
        let pool = Arc::new(database.pool().clone());

        let users = Arc::new(SqliteUserRepository::new(pool.clone()));
        let tiers = Arc::new(SqliteSubscriptionRepository::new(pool.clone()));
        let activity_types = Arc::new(SqliteActivityTypeRepository::new(pool.clone()));
        let ledger = Arc::new(SqliteLedgerRepository::new(pool.clone()));
        let resets = Arc::new(SqliteResetRepository::new(pool.clone()));
        let achievements = Arc::new(SqliteAchievementRepository::new(pool.clone()));
        let draw_entries = Arc::new(SqliteDrawEntryRepository::new(pool.clone()));

        let draw_service = Arc::new(HttpDrawService::new(config.draw_api_base_url.clone())?);
        let price_source =
            Arc::new(CoinGeckoPriceSource::with_base_url(config.price_api_base_url.clone())?);

        let event_bus = Arc::new(InMemoryEventBus::new());
        let bus: Arc<dyn EventBus> = event_bus.clone();

        let evaluator = Arc::new(AchievementEvaluator::new(
            users.clone(),
            achievements.clone(),
            bus.clone(),
        ));
        let allocator = Arc::new(DrawEntryAllocator::new(
            draw_service,
            draw_entries,
            users.clone(),
            bus.clone(),
        ));
        let engine = Arc::new(PointsEngine::new(
            users.clone(),
            tiers.clone(),
            activity_types.clone(),
            ledger.clone(),
            resets.clone(),
            evaluator.clone(),
            allocator.clone(),
            bus.clone(),
        ));
        let scheduler = Arc::new(MonthlyResetScheduler::new(
            users.clone(),
            ledger,
            resets,
            bus,
        ));
        let price_feed = Arc::new(PriceFeedCache::with_interval(
            price_source,
            config.price_refresh_interval,
        ));
        let queries = Arc::new(StatsQueries::new(users, tiers, activity_types));

        info!("✅ Rewards engine ready ({})", config.database_path.display());

        Ok(Self {
            engine,
            evaluator,
            scheduler,
            allocator,
            price_feed,
            queries,
            event_bus,
        })
    }
}
