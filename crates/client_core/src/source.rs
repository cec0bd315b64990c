use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use server_api::ApiContext;
use shared::{
    domain::Conference,
    error::ApiError,
    filter::FilterCriteria,
    protocol::{conferences_route, upcoming_deadlines_route, UpcomingDeadline},
    query::QueryParams,
};
use storage::Catalog;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;

/// Where conference data comes from. Every failure is reported as a
/// [`FetchError`].
#[async_trait]
pub trait ConferenceSource: Send + Sync {
    async fn list_conferences(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Conference>, FetchError>;

    async fn get_conference(&self, id: &str) -> Result<Conference, FetchError>;

    async fn upcoming_deadlines(
        &self,
        days: Option<u32>,
    ) -> Result<Vec<UpcomingDeadline>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpConferenceClient {
    http: Client,
    base: Url,
}

impl HttpConferenceClient {
    pub fn new(server_url: &str) -> Result<Self, FetchError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, FetchError> {
        let base = Url::parse(server_url.trim())?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "'{server_url}' is not an http(s) base url"
            )));
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Appends `route` to the base url's path, percent-encoding each segment.
    fn endpoint(&self, route: &str, extra: Option<&str>) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(route.split('/').filter(|part| !part.is_empty()));
            if let Some(extra) = extra {
                segments.push(extra);
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!(%url, "fetching");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|error| error.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                });
            warn!(%url, status = status.as_u16(), %message, "request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|error| FetchError::Decode(error.to_string()))
    }
}

#[async_trait]
impl ConferenceSource for HttpConferenceClient {
    async fn list_conferences(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Conference>, FetchError> {
        let mut url = self.endpoint(conferences_route(), None);
        let params = QueryParams::from(criteria);
        if !params.is_empty() {
            url.set_query(Some(&params.encode()));
        }
        self.get_json(url).await
    }

    async fn get_conference(&self, id: &str) -> Result<Conference, FetchError> {
        let id = server_api::validate_conference_id(id)
            .map_err(|error| FetchError::from_api(error, Some(id)))?;
        let url = self.endpoint(conferences_route(), Some(id));
        match self.get_json(url).await {
            Err(FetchError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(FetchError::NotFound { id: id.to_string() })
            }
            other => other,
        }
    }

    async fn upcoming_deadlines(
        &self,
        days: Option<u32>,
    ) -> Result<Vec<UpcomingDeadline>, FetchError> {
        let mut url = self.endpoint(upcoming_deadlines_route(), None);
        if let Some(days) = days {
            url.query_pairs_mut().append_pair("days", &days.to_string());
        }
        self.get_json(url).await
    }
}

/// Serves a local catalog in-process through the same operations the HTTP
/// server exposes.
#[derive(Clone)]
pub struct StaticSource {
    api: ApiContext,
}

impl StaticSource {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            api: ApiContext::new(catalog),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.api = self.api.with_latency(latency);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.api.catalog
    }
}

#[async_trait]
impl ConferenceSource for StaticSource {
    async fn list_conferences(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Conference>, FetchError> {
        server_api::list_conferences(&self.api, criteria)
            .await
            .map_err(|error| FetchError::from_api(error, None))
    }

    async fn get_conference(&self, id: &str) -> Result<Conference, FetchError> {
        server_api::get_conference(&self.api, id)
            .await
            .map_err(|error| FetchError::from_api(error, Some(id)))
    }

    async fn upcoming_deadlines(
        &self,
        days: Option<u32>,
    ) -> Result<Vec<UpcomingDeadline>, FetchError> {
        server_api::upcoming_deadlines(&self.api, Utc::now(), days)
            .await
            .map_err(|error| FetchError::from_api(error, None))
    }
}
