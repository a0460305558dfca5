use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use ecorewards_domain::draw::{Draw, DrawEntryCount, DrawKind, DrawService, WinnerRecord};
use ecorewards_domain::shared::{DomainError, DrawId, UserId};

use super::{build_client, execute_with_retry, RetryConfig};

/// HTTP client for the external prize-draw backend. Winner selection is
/// entirely that service's business; this client only moves entries and
/// reads schedules.
pub struct HttpDrawService {
    client: Client,
    base_url: String,
    retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct DrawDto {
    id: String,
    draw_type: String,
    prize_amount_usd: f64,
    crypto_symbol: String,
    draw_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CurrentDrawsResponse {
    success: bool,
    #[serde(default)]
    active_draws: Vec<DrawDto>,
    #[serde(default)]
    upcoming_draws: Vec<DrawDto>,
}

#[derive(Debug, Serialize)]
struct SubmitEntriesRequest<'a> {
    user_id: &'a str,
    entry_count: i64,
}

#[derive(Debug, Deserialize)]
struct AckResponse {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct EntryDto {
    user_id: String,
    entry_count: i64,
    #[serde(default)]
    total_points: i64,
}

#[derive(Debug, Deserialize)]
struct DrawEntriesResponse {
    success: bool,
    #[serde(default)]
    user_entries: Vec<EntryDto>,
}

#[derive(Debug, Deserialize)]
struct WinnerDto {
    draw_id: String,
    draw_type: String,
    user_id: String,
    prize_amount_usd: f64,
    crypto_symbol: String,
    drawn_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct WinnersResponse {
    success: bool,
    #[serde(default)]
    winners: Vec<WinnerDto>,
}

fn parse_kind(draw_type: &str) -> Option<DrawKind> {
    match draw_type {
        "weekly_bitcoin" => Some(DrawKind::WeeklyBitcoin),
        "monthly_ethereum" => Some(DrawKind::MonthlyEthereum),
        "mega" => Some(DrawKind::Mega),
        other => {
            warn!("Skipping draw with unknown type: {}", other);
            None
        }
    }
}

fn into_draw(dto: DrawDto) -> Option<Draw> {
    let kind = parse_kind(&dto.draw_type)?;
    Some(Draw {
        id: DrawId::from_string(&dto.id),
        kind,
        prize_usd_amount: dto.prize_amount_usd,
        crypto_symbol: dto.crypto_symbol,
        close_date: dto.draw_date,
    })
}

impl HttpDrawService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DomainError> {
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

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn service_error(operation: &str, e: impl std::fmt::Display) -> DomainError {
        DomainError::ExternalService(format!("{operation}: {e}"))
    }
}

#[async_trait]
impl DrawService for HttpDrawService {
    async fn get_open_draws(&self) -> Result<Vec<Draw>, DomainError> {
        let url = self.url("/api/draws/current");
        let url = url.as_str();
        let client = &self.client;

        let response: CurrentDrawsResponse =
            execute_with_retry(&self.retry, "Fetch current draws", || async move {
                client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<CurrentDrawsResponse>()
                    .await
            })
            .await
            .map_err(|e| Self::service_error("Fetch current draws", e))?;

        if !response.success {
            return Err(DomainError::ExternalService(
                "Draw service reported failure for current draws".to_string(),
            ));
        }

        Ok(response
            .active_draws
            .into_iter()
            .chain(response.upcoming_draws)
            .filter_map(into_draw)
            .collect())
    }

    async fn submit_entries(
        &self,
        draw_id: &DrawId,
        user_id: &UserId,
        entry_count: i64,
    ) -> Result<(), DomainError> {
        let url = self.url(&format!("/api/draws/{}/entries", draw_id.as_str()));
        let url = url.as_str();
        let client = &self.client;
        let body = SubmitEntriesRequest {
            user_id: user_id.as_str(),
            entry_count,
        };
        let body = &body;

        let ack: AckResponse =
            execute_with_retry(&self.retry, "Submit draw entries", || async move {
                client
                    .post(url)
                    .json(body)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<AckResponse>()
                    .await
            })
            .await
            .map_err(|e| Self::service_error("Submit draw entries", e))?;

        if !ack.success {
            return Err(DomainError::ExternalService(format!(
                "Draw service rejected entries for draw {draw_id}"
            )));
        }

        Ok(())
    }

    async fn get_entries(&self, draw_id: &DrawId) -> Result<Vec<DrawEntryCount>, DomainError> {
        let url = self.url(&format!("/api/draws/{}/entries", draw_id.as_str()));
        let url = url.as_str();
        let client = &self.client;

        let response: DrawEntriesResponse =
            execute_with_retry(&self.retry, "Fetch draw entries", || async move {
                client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<DrawEntriesResponse>()
                    .await
            })
            .await
            .map_err(|e| Self::service_error("Fetch draw entries", e))?;

        if !response.success {
            return Err(DomainError::ExternalService(format!(
                "Draw service reported failure for draw {draw_id} entries"
            )));
        }

        Ok(response
            .user_entries
            .into_iter()
            .map(|e| DrawEntryCount {
                user_id: UserId::from_string(&e.user_id),
                entry_count: e.entry_count,
                total_points: e.total_points,
            })
            .collect())
    }

    async fn get_recent_winners(&self) -> Result<Vec<WinnerRecord>, DomainError> {
        let url = self.url("/api/draws/winners");
        let url = url.as_str();
        let client = &self.client;

        let response: WinnersResponse =
            execute_with_retry(&self.retry, "Fetch recent winners", || async move {
                client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<WinnersResponse>()
                    .await
            })
            .await
            .map_err(|e| Self::service_error("Fetch recent winners", e))?;

        if !response.success {
            return Err(DomainError::ExternalService(
                "Draw service reported failure for winners".to_string(),
            ));
        }

        Ok(response
            .winners
            .into_iter()
            .filter_map(|w| {
                let kind = parse_kind(&w.draw_type)?;
                Some(WinnerRecord {
                    draw_id: DrawId::from_string(&w.draw_id),
                    kind,
                    user_id: UserId::from_string(&w.user_id),
                    prize_usd_amount: w.prize_amount_usd,
                    crypto_symbol: w.crypto_symbol,
                    drawn_at: w.drawn_at,
                })
            })
            .collect())
    }
}
