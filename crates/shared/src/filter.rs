use std::{cmp::Ordering, collections::BTreeSet};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::domain::Conference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Deadline,
    Name,
    #[serde(rename = "date")]
    StartDate,
}

keyword_enum!(SortKey {
    Deadline => "deadline",
    Name => "name",
    StartDate => "date",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

keyword_enum!(SortOrder {
    Asc => "asc",
    Desc => "desc",
});

impl SortOrder {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// How to narrow and order a conference collection for display.
///
/// Consumers never edit a criteria value in place; the `with_*` builders
/// consume `self` and hand back the replacement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search: String,
    pub tags: BTreeSet<String>,
    pub year: Option<i32>,
    pub location: Option<String>,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl FilterCriteria {
    pub fn with_search(self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self
        }
    }

    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn with_year(self, year: Option<i32>) -> Self {
        Self { year, ..self }
    }

    pub fn with_location(self, location: Option<String>) -> Self {
        Self { location, ..self }
    }

    pub fn sorted_by(self, sort_by: SortKey, sort_order: SortOrder) -> Self {
        Self {
            sort_by,
            sort_order,
            ..self
        }
    }

    fn search_needle(&self) -> Option<String> {
        let needle = self.search.trim();
        (!needle.is_empty()).then(|| needle.to_lowercase())
    }

    fn location_needle(&self) -> Option<String> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .map(str::to_lowercase)
    }

    /// True when no inclusion rule is active, so only ordering applies.
    pub fn is_unfiltered(&self) -> bool {
        self.search_needle().is_none()
            && self.tags.is_empty()
            && self.year.is_none()
            && self.location_needle().is_none()
    }
}

fn matches_search(conference: &Conference, needle: &str) -> bool {
    conference.name.to_lowercase().contains(needle)
        || conference
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(needle))
}

fn includes(
    conference: &Conference,
    criteria: &FilterCriteria,
    search: Option<&str>,
    location: Option<&str>,
) -> bool {
    if let Some(needle) = search {
        if !matches_search(conference, needle) {
            return false;
        }
    }

    if !criteria.tags.is_empty() && !conference.has_any_tag(&criteria.tags) {
        return false;
    }

    if let Some(year) = criteria.year {
        if conference.start_day().map(|day| day.year()) != Some(year) {
            return false;
        }
    }

    if let Some(needle) = location {
        if !conference.location.display().to_lowercase().contains(needle) {
            return false;
        }
    }

    true
}

/// Present values in the requested direction, missing values always last.
fn compare_present_first<T: Ord>(a: &Option<T>, b: &Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => order.apply(a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Returns the conferences that satisfy `criteria`, ordered by its sort key.
///
/// The sort is stable, so equal keys keep their input order. Dates compare by
/// epoch milliseconds; a missing or unparseable date sorts after every present
/// one in both directions.
pub fn filter_and_sort(conferences: &[Conference], criteria: &FilterCriteria) -> Vec<Conference> {
    let search = criteria.search_needle();
    let location = criteria.location_needle();

    let kept = conferences
        .iter()
        .filter(|conference| includes(conference, criteria, search.as_deref(), location.as_deref()));

    let order = criteria.sort_order;
    match criteria.sort_by {
        SortKey::Name => {
            let mut keyed: Vec<(String, &Conference)> = kept
                .map(|conference| (conference.name.to_lowercase(), conference))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| order.apply(a.cmp(b)));
            keyed.into_iter().map(|(_, c)| c.clone()).collect()
        }
        SortKey::Deadline | SortKey::StartDate => {
            let mut keyed: Vec<(Option<i64>, &Conference)> = kept
                .map(|conference| {
                    let instant = match criteria.sort_by {
                        SortKey::Deadline => conference.deadline_sort_instant(),
                        _ => conference.start_instant(),
                    };
                    (instant.map(|instant| instant.timestamp_millis()), conference)
                })
                .collect();
            keyed.sort_by(|(a, _), (b, _)| compare_present_first(a, b, order));
            keyed.into_iter().map(|(_, c)| c.clone()).collect()
        }
    }
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
