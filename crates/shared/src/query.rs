//! URL query-parameter encoding of filter criteria.
//!
//! The same parameter names are read by the server and written by clients and
//! shareable links. Decoding is lenient: values that do not parse fall back to
//! the criteria defaults instead of rejecting the request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::filter::FilterCriteria;

pub const SEARCH: &str = "search";
pub const TAGS: &str = "tags";
pub const YEAR: &str = "year";
pub const LOCATION: &str = "location";
pub const SORT_BY: &str = "sortBy";
pub const SORT_ORDER: &str = "sortOrder";

/// Raw, untyped view of the criteria parameters as they appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Comma-separated tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl CriteriaQuery {
    pub fn into_criteria(self) -> FilterCriteria {
        let defaults = FilterCriteria::default();
        FilterCriteria {
            search: self.search.unwrap_or_default(),
            tags: self
                .tags
                .as_deref()
                .map(|tags| tags.split(',').filter_map(non_empty).collect())
                .unwrap_or_default(),
            year: self.year.as_deref().and_then(|year| year.trim().parse().ok()),
            location: self.location.as_deref().and_then(non_empty),
            sort_by: self
                .sort_by
                .as_deref()
                .and_then(|key| key.parse().ok())
                .unwrap_or(defaults.sort_by),
            sort_order: self
                .sort_order
                .as_deref()
                .and_then(|order| order.parse().ok())
                .unwrap_or(defaults.sort_order),
        }
    }

    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        Self {
            search: non_empty(&criteria.search),
            tags: (!criteria.tags.is_empty())
                .then(|| criteria.tags.iter().cloned().collect::<Vec<_>>().join(",")),
            year: criteria.year.map(|year| year.to_string()),
            location: criteria.location.as_deref().and_then(non_empty),
            sort_by: Some(criteria.sort_by.to_string()),
            sort_order: Some(criteria.sort_order.to_string()),
        }
    }

    fn pairs(&self) -> [(&'static str, Option<&str>); 6] {
        [
            (SEARCH, self.search.as_deref()),
            (TAGS, self.tags.as_deref()),
            (YEAR, self.year.as_deref()),
            (LOCATION, self.location.as_deref()),
            (SORT_BY, self.sort_by.as_deref()),
            (SORT_ORDER, self.sort_order.as_deref()),
        ]
    }
}

/// Ordered query-parameter map where setting an empty value removes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            params.set(&key, Some(value.as_ref()));
        }
        params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) if !value.is_empty() => {
                self.params.insert(key.to_string(), value.to_string());
            }
            _ => {
                self.params.remove(key);
            }
        }
    }

    pub fn set_all<'a>(&mut self, values: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) {
        for (key, value) in values {
            self.set(key, value);
        }
    }

    pub fn clear(&mut self) {
        self.params.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `application/x-www-form-urlencoded` rendering without a leading `?`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    pub fn to_criteria(&self) -> FilterCriteria {
        let get = |key| self.get(key).map(str::to_string);
        CriteriaQuery {
            search: get(SEARCH),
            tags: get(TAGS),
            year: get(YEAR),
            location: get(LOCATION),
            sort_by: get(SORT_BY),
            sort_order: get(SORT_ORDER),
        }
        .into_criteria()
    }
}

impl From<&FilterCriteria> for QueryParams {
    fn from(criteria: &FilterCriteria) -> Self {
        let query = CriteriaQuery::from_criteria(criteria);
        let mut params = Self::default();
        params.set_all(query.pairs());
        params
    }
}

impl FilterCriteria {
    pub fn to_query_string(&self) -> String {
        QueryParams::from(self).encode()
    }

    pub fn from_query_string(query: &str) -> Self {
        QueryParams::parse(query).to_criteria()
    }
}
