use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use server_api::{get_conference, health, list_conferences, upcoming_deadlines, ApiContext};
use shared::{
    domain::Conference,
    error::{ApiError, ErrorCode},
    protocol::{
        conference_route, conferences_route, healthz_route, upcoming_deadlines_route,
        HealthResponse,
        UpcomingDeadline, UpcomingQuery,
    },
    query::CriteriaQuery,
};
use storage::Catalog;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, Settings};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    let catalog = load_catalog(&settings)?;

    let api = ApiContext::new(catalog).with_latency(settings.simulated_latency());
    let app = build_router(Arc::new(AppState { api }), &settings)?;

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        latency_ms = settings.simulated_latency_ms,
        "server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn load_catalog(settings: &Settings) -> anyhow::Result<Catalog> {
    match &settings.catalog_path {
        Some(path) => Catalog::load(path).map_err(|error| {
            error!(path = %path.display(), %error, "failed to load catalog");
            anyhow::Error::from(error)
        }),
        None => {
            let catalog = Catalog::embedded().context("embedded catalog is invalid")?;
            info!(conferences = catalog.len(), "serving embedded catalog");
            Ok(catalog)
        }
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

fn build_router(state: Arc<AppState>, settings: &Settings) -> anyhow::Result<Router> {
    Ok(Router::new()
        .route(healthz_route(), get(healthz))
        .route(conferences_route(), get(http_list_conferences))
        .route(&conference_route(":id"), get(http_get_conference))
        .route(upcoming_deadlines_route(), get(http_upcoming_deadlines))
        .layer(cors_layer(&settings.allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins = allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .with_context(|| format!("invalid allowed origin '{origin}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]))
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(error: ApiError) -> (StatusCode, Json<ApiError>) {
    (status_for(error.code), Json(error))
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    health(&state.api, Utc::now()).await.map(Json).map_err(reject)
}

async fn http_list_conferences(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CriteriaQuery>,
) -> ApiResult<Vec<Conference>> {
    let criteria = query.into_criteria();
    list_conferences(&state.api, &criteria)
        .await
        .map(Json)
        .map_err(reject)
}

async fn http_get_conference(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Conference> {
    get_conference(&state.api, &id)
        .await
        .map(Json)
        .map_err(reject)
}

async fn http_upcoming_deadlines(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UpcomingQuery>, QueryRejection>,
) -> ApiResult<Vec<UpcomingDeadline>> {
    let Query(query) = query.map_err(|rejection| {
        reject(ApiError::new(
            ErrorCode::Validation,
            rejection.body_text(),
        ))
    })?;
    upcoming_deadlines(&state.api, Utc::now(), query.days)
        .await
        .map(Json)
        .map_err(reject)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
