use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use shared::{
    domain::Conference,
    error::{ApiError, ErrorCode},
    filter::FilterCriteria,
    protocol::{HealthResponse, UpcomingDeadline, DEFAULT_UPCOMING_DAYS, MAX_UPCOMING_DAYS},
};
use storage::Catalog;
use tracing::debug;

#[derive(Clone)]
pub struct ApiContext {
    pub catalog: Arc<Catalog>,
    /// Artificial delay applied before every response, for exercising
    /// loading states against the mock backend.
    pub latency: Duration,
}

impl ApiContext {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

pub async fn list_conferences(
    ctx: &ApiContext,
    criteria: &FilterCriteria,
) -> Result<Vec<Conference>, ApiError> {
    ctx.simulate_latency().await;
    let conferences = ctx.catalog.query(criteria);
    debug!(
        matched = conferences.len(),
        total = ctx.catalog.len(),
        "listed conferences"
    );
    Ok(conferences)
}

/// Trims `id`, rejecting one that is blank.
pub fn validate_conference_id(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "conference id must not be empty",
        ));
    }
    Ok(id)
}

pub async fn get_conference(ctx: &ApiContext, id: &str) -> Result<Conference, ApiError> {
    ctx.simulate_latency().await;
    let id = validate_conference_id(id)?;
    ctx.catalog
        .get(id)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("conference '{id}' not found")))
}

/// Deadlines due within `days` days (default 30, clamped to `1..=365`),
/// earliest first.
pub async fn upcoming_deadlines(
    ctx: &ApiContext,
    now: DateTime<Utc>,
    days: Option<u32>,
) -> Result<Vec<UpcomingDeadline>, ApiError> {
    ctx.simulate_latency().await;
    let days = days
        .unwrap_or(DEFAULT_UPCOMING_DAYS)
        .clamp(1, MAX_UPCOMING_DAYS);
    Ok(ctx.catalog.upcoming_deadlines(now, days))
}

pub async fn health(ctx: &ApiContext, now: DateTime<Utc>) -> Result<HealthResponse, ApiError> {
    if ctx.catalog.is_empty() {
        return Err(ApiError::new(ErrorCode::Internal, "catalog is empty"));
    }
    Ok(HealthResponse {
        status: "ok".to_string(),
        timestamp: now,
        conferences: ctx.catalog.len(),
    })
}
