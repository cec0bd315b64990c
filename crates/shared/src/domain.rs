use std::{borrow::Borrow, collections::BTreeSet, fmt};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

id_newtype!(ConferenceId);

/// Where a conference takes place: either free text or a structured venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Text(String),
    Venue {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        venue: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        city: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        country: Option<String>,
    },
}

impl Default for Location {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Location {
    /// Single-line rendering, e.g. `Vancouver Convention Centre, Vancouver, Canada`.
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Venue {
                venue,
                city,
                country,
            } => [venue, city, country]
                .into_iter()
                .flatten()
                .map(|part| part.trim())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.display().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub name: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Deadline {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        dates::parse_instant(&self.date, self.timezone.as_deref())
    }
}

/// One academic event instance. Dates are kept as written and parsed on use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    pub id: ConferenceId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub deadlines: Vec<Deadline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Conference {
    pub fn new(id: impl Into<ConferenceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            acronym: None,
            description: None,
            location: Location::default(),
            deadlines: Vec::new(),
            start_date: None,
            end_date: None,
            tags: BTreeSet::new(),
            website: None,
        }
    }

    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        self.start_date
            .as_deref()
            .and_then(|raw| dates::parse_instant(raw, None))
    }

    pub fn end_instant(&self) -> Option<DateTime<Utc>> {
        self.end_date
            .as_deref()
            .and_then(|raw| dates::parse_instant(raw, None))
    }

    pub fn start_day(&self) -> Option<NaiveDate> {
        self.start_date.as_deref().and_then(dates::parse_calendar_date)
    }

    /// Earliest deadline with a parseable date; the first listed wins ties.
    pub fn earliest_deadline(&self) -> Option<(&Deadline, DateTime<Utc>)> {
        self.deadlines
            .iter()
            .filter_map(|deadline| deadline.instant().map(|instant| (deadline, instant)))
            .min_by_key(|(_, instant)| *instant)
    }

    /// Earliest deadline that has not passed yet at `now`.
    pub fn next_deadline(&self, now: DateTime<Utc>) -> Option<(&Deadline, DateTime<Utc>)> {
        self.deadlines
            .iter()
            .filter_map(|deadline| deadline.instant().map(|instant| (deadline, instant)))
            .filter(|(_, instant)| !dates::is_past(*instant, now))
            .min_by_key(|(_, instant)| *instant)
    }

    /// Instant used when ordering by deadline: the earliest deadline, or the
    /// start date for conferences that list none.
    pub fn deadline_sort_instant(&self) -> Option<DateTime<Utc>> {
        self.earliest_deadline()
            .map(|(_, instant)| instant)
            .or_else(|| self.start_instant())
    }

    pub fn title(&self) -> String {
        match self.acronym.as_deref().map(str::trim) {
            Some(acronym) if !acronym.is_empty() && acronym != self.name => {
                format!("{} ({acronym})", self.name)
            }
            _ => self.name.clone(),
        }
    }

    pub fn has_any_tag(&self, tags: &BTreeSet<String>) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_structured_and_text_locations() {
        let structured: Conference = serde_json::from_value(serde_json::json!({
            "id": "icml-2025",
            "name": "International Conference on Machine Learning",
            "location": { "city": "Vancouver", "country": "Canada" },
            "startDate": "2025-07-13"
        }))
        .expect("structured");
        assert_eq!(structured.location.display(), "Vancouver, Canada");
        assert!(structured.deadlines.is_empty());

        let text: Conference = serde_json::from_value(serde_json::json!({
            "id": "acl-2025",
            "name": "ACL",
            "location": "Vienna, Austria"
        }))
        .expect("text");
        assert_eq!(text.location.display(), "Vienna, Austria");
        assert!(text.location != Location::default());
    }

    #[test]
    fn earliest_deadline_skips_malformed_dates() {
        let mut conference = Conference::new("c", "Conf");
        conference.deadlines = vec![
            Deadline {
                name: "Paper".into(),
                date: "2025-05-20".into(),
                timezone: Some("AoE".into()),
            },
            Deadline {
                name: "Broken".into(),
                date: "tbd".into(),
                timezone: None,
            },
            Deadline {
                name: "Abstract".into(),
                date: "2025-05-13".into(),
                timezone: Some("AoE".into()),
            },
        ];

        let (deadline, _) = conference.earliest_deadline().expect("deadline");
        assert_eq!(deadline.name, "Abstract");
    }

    #[test]
    fn deadline_sort_falls_back_to_start_date() {
        let mut conference = Conference::new("c", "Conf");
        assert_eq!(conference.deadline_sort_instant(), None);
        conference.start_date = Some("2025-09-01".into());
        assert_eq!(
            conference.deadline_sort_instant(),
            dates::parse_instant("2025-09-01", None)
        );
    }

    #[test]
    fn next_deadline_ignores_passed_ones() {
        let mut conference = Conference::new("c", "Conf");
        conference.deadlines = vec![
            Deadline {
                name: "Abstract".into(),
                date: "2025-01-10".into(),
                timezone: None,
            },
            Deadline {
                name: "Paper".into(),
                date: "2025-02-10".into(),
                timezone: None,
            },
        ];
        let now = dates::parse_instant("2025-01-20", None).expect("now");
        let (deadline, _) = conference.next_deadline(now).expect("next");
        assert_eq!(deadline.name, "Paper");
    }

    #[test]
    fn title_includes_distinct_acronym() {
        let mut conference = Conference::new("neurips", "Neural Information Processing Systems");
        conference.acronym = Some("NeurIPS".into());
        assert_eq!(
            conference.title(),
            "Neural Information Processing Systems (NeurIPS)"
        );
    }
}
