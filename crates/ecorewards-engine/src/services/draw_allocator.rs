use chrono::Utc;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use ecorewards_domain::draw::{
    Draw, DrawEntryAllocation, DrawEntryCount, DrawEntryRepository, DrawService, WinnerRecord,
};
use ecorewards_domain::events::{DrawEntriesSubmitted, EventBus};
use ecorewards_domain::shared::{DomainError, DrawId, UserId};
use ecorewards_domain::user::UserRepository;
use ecorewards_infrastructure::config::TimeoutConfig;

use crate::dtos::{DrawCountdown, DrawEntrySummary, DrawSubmission};

/// Converts earned points into draw entries (1 point = 1 entry) and keeps
/// the local allocation record in step with the external Draw Service.
///
/// Decoupled from the points-award critical path: the award flow uses the
/// detached variant, so Draw Service latency or downtime can never fail or
/// block the caller that just earned points.
pub struct DrawEntryAllocator {
    draw_service: Arc<dyn DrawService>,
    allocations: Arc<dyn DrawEntryRepository>,
    users: Arc<dyn UserRepository>,
    event_bus: Arc<dyn EventBus>,
}

impl DrawEntryAllocator {
    pub fn new(
        draw_service: Arc<dyn DrawService>,
        allocations: Arc<dyn DrawEntryRepository>,
        users: Arc<dyn UserRepository>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            draw_service,
            allocations,
            users,
            event_bus,
        }
    }

    /// Submit `points_earned` entries into every currently open draw.
    /// No open draws is a no-op result, not an error. A Draw Service
    /// failure on an individual submission leaves the local allocation
    /// pending for retry and is reported as `acked: false`.
    #[instrument(skip(self), fields(user_id = %user_id, points = points_earned))]
    pub async fn submit_user_entries(
        &self,
        user_id: &UserId,
        points_earned: i64,
    ) -> Result<DrawEntrySummary, DomainError> {
        if points_earned <= 0 {
            return Ok(DrawEntrySummary::default());
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))?;

        let draws = self.open_draws_bounded().await?;
        if draws.is_empty() {
            debug!("No open draws to enter for {}", user_id);
            return Ok(DrawEntrySummary::default());
        }

        let mut submissions = Vec::with_capacity(draws.len());

        for draw in &draws {
            // Points are integral, so floor(points) == points entries.
            self.allocations
                .add_entries(&draw.id, user_id, points_earned, points_earned, user.tier_id())
                .await?;

            let acked = match self
                .draw_service
                .submit_entries(&draw.id, user_id, points_earned)
                .await
            {
                Ok(()) => {
                    self.allocations.mark_acked(&draw.id, user_id).await?;
                    true
                }
                Err(e) => {
                    warn!(
                        "Draw service rejected entries for draw {} (kept pending): {}",
                        draw.id, e
                    );
                    false
                }
            };

            if let Err(e) = self
                .event_bus
                .publish(Box::new(DrawEntriesSubmitted {
                    user_id: user_id.clone(),
                    draw_id: draw.id.clone(),
                    entries_added: points_earned,
                    occurred_at: Utc::now(),
                }))
                .await
            {
                warn!("Event publish failed: {}", e);
            }

            submissions.push(DrawSubmission {
                draw_id: draw.id.clone(),
                kind: draw.kind,
                entries_added: points_earned,
                acked,
            });
        }

        let total_entries = points_earned * submissions.len() as i64;
        info!(
            "🎟️  {} entries submitted across {} draw(s) for {}",
            total_entries,
            submissions.len(),
            user_id
        );

        Ok(DrawEntrySummary {
            submissions,
            total_entries,
        })
    }

    /// Fire-and-forget submission for the award critical path. Failures
    /// are logged; the local allocation stays eligible for retry.
    pub fn submit_user_entries_detached(self: &Arc<Self>, user_id: UserId, points_earned: i64) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = this.submit_user_entries(&user_id, points_earned).await {
                warn!(
                    "Detached draw-entry submission failed for {}: {}",
                    user_id, e
                );
            }
        });
    }

    /// Resubmit allocations the service never acknowledged. Idempotent on
    /// the service side keyed by (draw, user, submitted total).
    pub async fn retry_pending(&self) -> Result<u32, DomainError> {
        let pending = self.allocations.unacked().await?;
        let mut retried = 0u32;

        for allocation in pending {
            let entries = allocation.pending_entries();
            if entries == 0 {
                continue;
            }

            match self
                .draw_service
                .submit_entries(allocation.draw_id(), allocation.user_id(), entries)
                .await
            {
                Ok(()) => {
                    self.allocations
                        .mark_acked(allocation.draw_id(), allocation.user_id())
                        .await?;
                    retried += 1;
                }
                Err(e) => {
                    warn!(
                        "Retry failed for draw {} / user {}: {}",
                        allocation.draw_id(),
                        allocation.user_id(),
                        e
                    );
                }
            }
        }

        Ok(retried)
    }

    /// Local allocations for a user, newest first.
    pub async fn user_entry_counts(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<DrawEntryAllocation>, DomainError> {
        self.allocations.for_user(user_id).await
    }

    /// Per-user counts inside one draw, straight from the Draw Service.
    pub async fn entries_for_draw(
        &self,
        draw_id: &DrawId,
    ) -> Result<Vec<DrawEntryCount>, DomainError> {
        self.draw_service.get_entries(draw_id).await
    }

    pub async fn recent_winners(&self) -> Result<Vec<WinnerRecord>, DomainError> {
        self.draw_service.get_recent_winners().await
    }

    /// Time remaining per open draw, clamped at zero once closed.
    pub async fn next_draw_countdown(&self) -> Result<Vec<DrawCountdown>, DomainError> {
        let now = Utc::now();
        let draws = self.open_draws_bounded().await?;

        Ok(draws
            .into_iter()
            .map(|d| DrawCountdown {
                remaining_ms: (d.close_date - now).num_milliseconds().max(0),
                draw_id: d.id,
                kind: d.kind,
                close_date: d.close_date,
                prize_usd_amount: d.prize_usd_amount,
                crypto_symbol: d.crypto_symbol,
            })
            .collect())
    }

    /// One bounded call to the Draw Service; a slow backend becomes an
    /// ExternalService error instead of a hung caller.
    async fn open_draws_bounded(&self) -> Result<Vec<Draw>, DomainError> {
        timeout(
            TimeoutConfig::global().draw_submit,
            self.draw_service.get_open_draws(),
        )
        .await
        .map_err(|_| {
            DomainError::ExternalService("Timed out fetching open draws".to_string())
        })?
    }
}
