// In-memory test doubles for the domain traits, mirroring the SQLite
// implementations closely enough for service-level tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use ecorewards_domain::achievement::{
    AchievementDefinition, AchievementRepository, AchievementUnlock, ThresholdKind,
};
use ecorewards_domain::draw::{
    Draw, DrawEntryAllocation, DrawEntryCount, DrawEntryRepository, DrawService, WinnerRecord,
};
use ecorewards_domain::events::{DomainEvent, EventBus};
use ecorewards_domain::ledger::{
    ActivityEvent, ActivityType, ActivityTypeRepository, LedgerRepository, SharingEvent,
};
use ecorewards_domain::pricing::{PriceSnapshot, PriceSource};
use ecorewards_domain::reset::{MonthlyResetRecord, ResetRepository};
use ecorewards_domain::shared::{
    AchievementId, ActivityEventId, ActivityTypeId, DomainError, DrawId, SharingEventId, TierId,
    UserId,
};
use ecorewards_domain::subscription::{SubscriptionRepository, SubscriptionTier};
use ecorewards_domain::user::{LeaderboardRow, UserAccount, UserRepository, UserStats};

pub fn tier(id: &str, name: &str, multiplier: f64, price: f64) -> SubscriptionTier {
    SubscriptionTier::restore(TierId::from_string(id), name.to_string(), multiplier, price)
}

pub fn seeded_tiers() -> Vec<SubscriptionTier> {
    vec![
        tier("eco_warrior", "Eco Warrior", 0.0, 0.0),
        tier("green_champion", "Green Champion", 1.0, 9.99),
        tier("planet_saver", "Planet Saver", 3.0, 19.99),
    ]
}

pub fn seeded_activity_types() -> Vec<ActivityType> {
    vec![
        ActivityType::restore(
            ActivityTypeId::from_string("walking_biking"),
            "Walking/Biking".to_string(),
            "miles".to_string(),
            1.0,
            0.4,
        ),
        ActivityType::restore(
            ActivityTypeId::from_string("recycling"),
            "Recycling".to_string(),
            "kg".to_string(),
            1.0,
            0.9,
        ),
    ]
}

pub fn seeded_achievements() -> Vec<AchievementDefinition> {
    vec![
        AchievementDefinition::restore(
            AchievementId::from_string("first_steps"),
            "First Steps".to_string(),
            "Log your first eco-friendly activity".to_string(),
            ThresholdKind::Activities,
            1.0,
        ),
        AchievementDefinition::restore(
            AchievementId::from_string("getting_started"),
            "Getting Started".to_string(),
            "Complete 5 eco-friendly activities".to_string(),
            ThresholdKind::Activities,
            5.0,
        ),
        AchievementDefinition::restore(
            AchievementId::from_string("eco_warrior"),
            "Eco Warrior".to_string(),
            "Earn 1,000 points".to_string(),
            ThresholdKind::Points,
            1000.0,
        ),
        AchievementDefinition::restore(
            AchievementId::from_string("photo_verified"),
            "Photo Verified".to_string(),
            "Upload your first photo verification".to_string(),
            ThresholdKind::Special,
            1.0,
        ),
    ]
}

pub struct MockUserRepository {
    users: RwLock<HashMap<String, UserAccount>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    fn with_stats(user: &UserAccount, stats: &UserStats) -> UserAccount {
        UserAccount::restore(
            user.id().clone(),
            user.username().to_string(),
            user.tier_id().clone(),
            stats.monthly_points,
            stats.lifetime_points,
            stats.sharing_points,
            stats.total_co2_saved,
            stats.total_activities,
            stats.verified_activities,
            stats.current_streak,
            user.monthly_reset_date(),
            user.created_at(),
        )
    }

    fn after_reset(user: &UserAccount, next_due: DateTime<Utc>) -> UserAccount {
        UserAccount::restore(
            user.id().clone(),
            user.username().to_string(),
            user.tier_id().clone(),
            0,
            user.lifetime_points(),
            user.sharing_points(),
            user.total_co2_saved(),
            user.total_activities(),
            user.verified_activities(),
            user.current_streak(),
            next_due,
            user.created_at(),
        )
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn save(&self, user: &UserAccount) -> Result<(), DomainError> {
        self.users
            .write()
            .await
            .insert(user.id().as_str().to_string(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, DomainError> {
        Ok(self.users.read().await.get(id.as_str()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<UserAccount>, DomainError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn update_stats(&self, id: &UserId, stats: &UserStats) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let user = users
            .get(id.as_str())
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))?;
        let updated = Self::with_stats(user, stats);
        users.insert(id.as_str().to_string(), updated);
        Ok(())
    }

    async fn update_tier(&self, id: &UserId, tier_id: &TierId) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id.as_str())
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))?;
        user.change_tier(tier_id.clone());
        Ok(())
    }

    async fn claim_reset(
        &self,
        id: &UserId,
        expected_due: DateTime<Utc>,
        next_due: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        // Single write-lock section, like the conditional UPDATE it mocks.
        let mut users = self.users.write().await;
        let user = users
            .get(id.as_str())
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))?;

        if user.monthly_reset_date() != expected_due {
            return Ok(false);
        }

        let updated = Self::after_reset(user, next_due);
        users.insert(id.as_str().to_string(), updated);
        Ok(true)
    }

    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardRow>, DomainError> {
        let mut users: Vec<UserAccount> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.lifetime_points().cmp(&a.lifetime_points()));
        Ok(users
            .into_iter()
            .take(limit as usize)
            .map(|u| LeaderboardRow {
                user_id: u.id().clone(),
                username: u.username().to_string(),
                lifetime_points: u.lifetime_points(),
                total_co2_saved: u.total_co2_saved(),
                total_activities: u.total_activities(),
            })
            .collect())
    }

    async fn rank_of(&self, id: &UserId) -> Result<Option<u32>, DomainError> {
        let users = self.users.read().await;
        let target = match users.get(id.as_str()) {
            Some(user) => user.lifetime_points(),
            None => return Ok(None),
        };
        let ahead = users
            .values()
            .filter(|u| u.lifetime_points() > target)
            .count();
        Ok(Some(ahead as u32 + 1))
    }
}

pub struct MockLedgerRepository {
    activities: RwLock<Vec<ActivityEvent>>,
    sharing: RwLock<Vec<SharingEvent>>,
}

impl MockLedgerRepository {
    pub fn new() -> Self {
        Self {
            activities: RwLock::new(Vec::new()),
            sharing: RwLock::new(Vec::new()),
        }
    }

    pub async fn activity_count(&self) -> usize {
        self.activities.read().await.len()
    }
}

#[async_trait]
impl LedgerRepository for MockLedgerRepository {
    async fn append_activity(
        &self,
        event: &ActivityEvent,
    ) -> Result<ActivityEventId, DomainError> {
        self.activities.write().await.push(event.clone());
        Ok(event.id().clone())
    }

    async fn append_sharing(&self, event: &SharingEvent) -> Result<SharingEventId, DomainError> {
        self.sharing.write().await.push(event.clone());
        Ok(event.id().clone())
    }

    async fn activities_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ActivityEvent>, DomainError> {
        let mut events: Vec<ActivityEvent> = self
            .activities
            .read()
            .await
            .iter()
            .filter(|e| e.user_id() == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| std::cmp::Reverse(e.created_at()));
        Ok(events)
    }

    async fn sharing_for_user(&self, user_id: &UserId) -> Result<Vec<SharingEvent>, DomainError> {
        let mut events: Vec<SharingEvent> = self
            .sharing
            .read()
            .await
            .iter()
            .filter(|e| e.user_id() == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| std::cmp::Reverse(e.created_at()));
        Ok(events)
    }
}

pub struct MockSubscriptionRepository {
    tiers: HashMap<String, SubscriptionTier>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self {
            tiers: seeded_tiers()
                .into_iter()
                .map(|t| (t.id().as_str().to_string(), t))
                .collect(),
        }
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_id(&self, id: &TierId) -> Result<Option<SubscriptionTier>, DomainError> {
        Ok(self.tiers.get(id.as_str()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<SubscriptionTier>, DomainError> {
        let mut tiers: Vec<SubscriptionTier> = self.tiers.values().cloned().collect();
        tiers.sort_by(|a, b| a.price_monthly_usd().total_cmp(&b.price_monthly_usd()));
        Ok(tiers)
    }
}

pub struct MockActivityTypeRepository {
    types: HashMap<String, ActivityType>,
}

impl MockActivityTypeRepository {
    pub fn new() -> Self {
        Self {
            types: seeded_activity_types()
                .into_iter()
                .map(|t| (t.id().as_str().to_string(), t))
                .collect(),
        }
    }
}

#[async_trait]
impl ActivityTypeRepository for MockActivityTypeRepository {
    async fn find_by_id(
        &self,
        id: &ActivityTypeId,
    ) -> Result<Option<ActivityType>, DomainError> {
        Ok(self.types.get(id.as_str()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<ActivityType>, DomainError> {
        let mut types: Vec<ActivityType> = self.types.values().cloned().collect();
        types.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(types)
    }
}

pub struct MockAchievementRepository {
    definitions: Vec<AchievementDefinition>,
    unlocked: RwLock<HashSet<(String, String)>>,
}

impl MockAchievementRepository {
    pub fn new() -> Self {
        Self {
            definitions: seeded_achievements(),
            unlocked: RwLock::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl AchievementRepository for MockAchievementRepository {
    async fn definitions(&self) -> Result<Vec<AchievementDefinition>, DomainError> {
        Ok(self.definitions.clone())
    }

    async fn unlocks_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AchievementUnlock>, DomainError> {
        Ok(self
            .unlocked
            .read()
            .await
            .iter()
            .filter(|(user, _)| user == user_id.as_str())
            .map(|(user, achievement)| {
                AchievementUnlock::restore(
                    UserId::from_string(user),
                    AchievementId::from_string(achievement),
                    Utc::now(),
                )
            })
            .collect())
    }

    async fn try_unlock(
        &self,
        user_id: &UserId,
        achievement_id: &AchievementId,
        _unlocked_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let key = (
            user_id.as_str().to_string(),
            achievement_id.as_str().to_string(),
        );
        Ok(self.unlocked.write().await.insert(key))
    }
}

pub struct MockResetRepository {
    records: RwLock<Vec<MonthlyResetRecord>>,
}

impl MockResetRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl ResetRepository for MockResetRepository {
    async fn record_reset(&self, record: &MonthlyResetRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        let duplicate = records.iter().any(|r| {
            r.user_id() == record.user_id() && r.reset_date() == record.reset_date()
        });
        if !duplicate {
            records.push(record.clone());
        }
        Ok(())
    }

    async fn latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<MonthlyResetRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.user_id() == user_id)
            .max_by_key(|r| r.reset_date())
            .cloned())
    }

    async fn history_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<MonthlyResetRecord>, DomainError> {
        let mut records: Vec<MonthlyResetRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| std::cmp::Reverse(r.reset_date()));
        Ok(records)
    }
}

pub struct MockDrawService {
    pub open_draws: RwLock<Vec<Draw>>,
    pub fail_submissions: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub submissions: RwLock<Vec<(String, String, i64)>>,
}

impl MockDrawService {
    pub fn new(open_draws: Vec<Draw>) -> Self {
        Self {
            open_draws: RwLock::new(open_draws),
            fail_submissions: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
            submissions: RwLock::new(Vec::new()),
        }
    }

    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }
}

#[async_trait]
impl DrawService for MockDrawService {
    async fn get_open_draws(&self) -> Result<Vec<Draw>, DomainError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(DomainError::ExternalService(
                "Draw service unavailable".to_string(),
            ));
        }
        Ok(self.open_draws.read().await.clone())
    }

    async fn submit_entries(
        &self,
        draw_id: &DrawId,
        user_id: &UserId,
        entry_count: i64,
    ) -> Result<(), DomainError> {
        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(DomainError::ExternalService(
                "Draw service unavailable".to_string(),
            ));
        }
        self.submissions.write().await.push((
            draw_id.as_str().to_string(),
            user_id.as_str().to_string(),
            entry_count,
        ));
        Ok(())
    }

    async fn get_entries(&self, draw_id: &DrawId) -> Result<Vec<DrawEntryCount>, DomainError> {
        let submissions = self.submissions.read().await;
        let mut per_user: HashMap<String, i64> = HashMap::new();
        for (draw, user, count) in submissions.iter() {
            if draw == draw_id.as_str() {
                *per_user.entry(user.clone()).or_insert(0) += count;
            }
        }
        Ok(per_user
            .into_iter()
            .map(|(user, count)| DrawEntryCount {
                user_id: UserId::from_string(&user),
                entry_count: count,
                total_points: count,
            })
            .collect())
    }

    async fn get_recent_winners(&self) -> Result<Vec<WinnerRecord>, DomainError> {
        Ok(Vec::new())
    }
}

pub struct MockDrawEntryRepository {
    allocations: RwLock<HashMap<(String, String), DrawEntryAllocation>>,
}

impl MockDrawEntryRepository {
    pub fn new() -> Self {
        Self {
            allocations: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl DrawEntryRepository for MockDrawEntryRepository {
    async fn add_entries(
        &self,
        draw_id: &DrawId,
        user_id: &UserId,
        entries: i64,
        points: i64,
        tier_id: &TierId,
    ) -> Result<(), DomainError> {
        let mut allocations = self.allocations.write().await;
        let key = (draw_id.as_str().to_string(), user_id.as_str().to_string());
        let (entry_count, acked, submitted) = match allocations.get(&key) {
            Some(existing) => (
                existing.entry_count() + entries,
                existing.acked_entries(),
                existing.submitted_points() + points,
            ),
            None => (entries, 0, points),
        };
        allocations.insert(
            key,
            DrawEntryAllocation::restore(
                draw_id.clone(),
                user_id.clone(),
                entry_count,
                acked,
                submitted,
                tier_id.clone(),
                Utc::now(),
            ),
        );
        Ok(())
    }

    async fn mark_acked(&self, draw_id: &DrawId, user_id: &UserId) -> Result<(), DomainError> {
        let mut allocations = self.allocations.write().await;
        let key = (draw_id.as_str().to_string(), user_id.as_str().to_string());
        if let Some(existing) = allocations.get(&key) {
            let updated = DrawEntryAllocation::restore(
                existing.draw_id().clone(),
                existing.user_id().clone(),
                existing.entry_count(),
                existing.entry_count(),
                existing.submitted_points(),
                existing.tier_at_submission().clone(),
                Utc::now(),
            );
            allocations.insert(key, updated);
        }
        Ok(())
    }

    async fn for_user(&self, user_id: &UserId)
        -> Result<Vec<DrawEntryAllocation>, DomainError> {
        Ok(self
            .allocations
            .read()
            .await
            .values()
            .filter(|a| a.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn unacked(&self) -> Result<Vec<DrawEntryAllocation>, DomainError> {
        Ok(self
            .allocations
            .read()
            .await
            .values()
            .filter(|a| a.pending_entries() > 0)
            .cloned()
            .collect())
    }
}

pub struct MockPriceSource {
    pub snapshot: RwLock<Option<PriceSnapshot>>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl MockPriceSource {
    pub fn new(snapshot: Option<PriceSnapshot>) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn get_current_prices(&self, _symbols: &[&str]) -> Result<PriceSnapshot, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::ExternalService(
                "Price source unavailable".to_string(),
            ));
        }
        self.snapshot
            .read()
            .await
            .clone()
            .ok_or_else(|| DomainError::ExternalService("No prices configured".to_string()))
    }
}

pub struct CountingEventBus {
    pub published: RwLock<Vec<String>>,
}

impl CountingEventBus {
    pub fn new() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
        }
    }

    pub async fn count(&self) -> usize {
        self.published.read().await.len()
    }
}

#[async_trait]
impl EventBus for CountingEventBus {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError> {
        self.published
            .write()
            .await
            .push(event.event_type_name().to_string());
        Ok(())
    }
}
