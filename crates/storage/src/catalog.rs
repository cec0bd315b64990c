use std::{collections::HashMap, fmt, fs, path::Path};

use chrono::{DateTime, Duration, Utc};
use shared::{
    dates,
    domain::{Conference, ConferenceId},
    filter::{filter_and_sort, FilterCriteria},
    protocol::{UpcomingDeadline, MAX_UPCOMING_DAYS},
};
use tracing::{info, warn};

use crate::error::{Result, StorageError};

const EMBEDDED_CONFERENCES: &str = include_str!("../data/conferences.json");

/// Immutable, id-indexed collection of conferences.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    conferences: Vec<Conference>,
    index: HashMap<ConferenceId, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    EmptyName {
        id: ConferenceId,
    },
    MalformedDate {
        id: ConferenceId,
        field: String,
        value: String,
    },
    UnknownTimezone {
        id: ConferenceId,
        deadline: String,
        timezone: String,
    },
    EndBeforeStart {
        id: ConferenceId,
    },
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName { id } => write!(f, "{id}: name is empty"),
            Self::MalformedDate { id, field, value } => {
                write!(f, "{id}: {field} '{value}' is not an ISO-8601 date")
            }
            Self::UnknownTimezone {
                id,
                deadline,
                timezone,
            } => write!(
                f,
                "{id}: deadline '{deadline}' uses unknown timezone '{timezone}' (read as UTC)"
            ),
            Self::EndBeforeStart { id } => write!(f, "{id}: end date precedes start date"),
        }
    }
}

impl Catalog {
    pub fn from_conferences(conferences: Vec<Conference>) -> Result<Self> {
        let mut index = HashMap::with_capacity(conferences.len());
        for (position, conference) in conferences.iter().enumerate() {
            if index.insert(conference.id.clone(), position).is_some() {
                return Err(StorageError::DuplicateId(conference.id.to_string()));
            }
        }
        Ok(Self { conferences, index })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let conferences: Vec<Conference> = serde_json::from_str(raw)?;
        Self::from_conferences(conferences)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|error| StorageError::io(path, error))?;
        let catalog = Self::from_json(&raw)?;
        info!(path = %path.display(), conferences = catalog.len(), "loaded catalog");
        catalog.log_issues();
        Ok(catalog)
    }

    /// The mock data set compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CONFERENCES)
    }

    pub fn all(&self) -> &[Conference] {
        &self.conferences
    }

    pub fn get(&self, id: &str) -> Option<&Conference> {
        self.index.get(id).map(|&position| &self.conferences[position])
    }

    pub fn len(&self) -> usize {
        self.conferences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conferences.is_empty()
    }

    pub fn query(&self, criteria: &FilterCriteria) -> Vec<Conference> {
        filter_and_sort(&self.conferences, criteria)
    }

    /// Deadlines due within `days` days of `now`, earliest first.
    ///
    /// `days` is clamped to `1..=MAX_UPCOMING_DAYS`. Deadlines already past at
    /// `now` and deadlines with malformed dates are skipped.
    pub fn upcoming_deadlines(&self, now: DateTime<Utc>, days: u32) -> Vec<UpcomingDeadline> {
        let days = days.clamp(1, MAX_UPCOMING_DAYS);
        let horizon = now + Duration::days(i64::from(days));

        let mut upcoming: Vec<UpcomingDeadline> = self
            .conferences
            .iter()
            .flat_map(|conference| {
                conference.deadlines.iter().filter_map(move |deadline| {
                    let due_at = deadline.instant()?;
                    if dates::is_past(due_at, now) || due_at > horizon {
                        return None;
                    }
                    Some(UpcomingDeadline {
                        conference_id: conference.id.clone(),
                        conference_name: conference.name.clone(),
                        acronym: conference.acronym.clone(),
                        deadline: deadline.clone(),
                        due_at,
                        days_remaining: dates::days_until(due_at, now),
                    })
                })
            })
            .collect();
        upcoming.sort_by_key(|entry| entry.due_at);
        upcoming
    }

    /// Data-quality problems that do not prevent the catalog from loading.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        for conference in &self.conferences {
            let id = &conference.id;
            if conference.name.trim().is_empty() {
                issues.push(CatalogIssue::EmptyName { id: id.clone() });
            }

            for (field, value) in [
                ("startDate", conference.start_date.as_deref()),
                ("endDate", conference.end_date.as_deref()),
            ] {
                if let Some(value) = value {
                    if dates::parse_instant(value, None).is_none() {
                        issues.push(CatalogIssue::MalformedDate {
                            id: id.clone(),
                            field: field.to_string(),
                            value: value.to_string(),
                        });
                    }
                }
            }

            for deadline in &conference.deadlines {
                if deadline.instant().is_none() {
                    issues.push(CatalogIssue::MalformedDate {
                        id: id.clone(),
                        field: format!("deadline '{}'", deadline.name),
                        value: deadline.date.clone(),
                    });
                }
                if let Some(timezone) = deadline.timezone.as_deref() {
                    if dates::parse_timezone(timezone).is_none() {
                        issues.push(CatalogIssue::UnknownTimezone {
                            id: id.clone(),
                            deadline: deadline.name.clone(),
                            timezone: timezone.to_string(),
                        });
                    }
                }
            }

            if let (Some(start), Some(end)) = (conference.start_instant(), conference.end_instant())
            {
                if end < start {
                    issues.push(CatalogIssue::EndBeforeStart { id: id.clone() });
                }
            }
        }
        issues
    }

    fn log_issues(&self) {
        for issue in self.validate() {
            warn!(%issue, "catalog data issue");
        }
    }
}
