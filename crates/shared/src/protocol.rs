use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ConferenceId, Deadline};

pub const DEFAULT_UPCOMING_DAYS: u32 = 30;
pub const MAX_UPCOMING_DAYS: u32 = 365;

pub fn healthz_route() -> &'static str {
    "/healthz"
}

pub fn conferences_route() -> &'static str {
    "/conferences"
}

pub fn conference_route(id: &str) -> String {
    format!("{}/{id}", conferences_route())
}

pub fn upcoming_deadlines_route() -> &'static str {
    "/deadlines/upcoming"
}

/// A deadline that falls inside the requested look-ahead window, together with
/// the conference it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDeadline {
    pub conference_id: ConferenceId,
    pub conference_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    pub deadline: Deadline,
    pub due_at: DateTime<Utc>,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingQuery {
    #[serde(default)]
    pub days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub conferences: usize,
}
