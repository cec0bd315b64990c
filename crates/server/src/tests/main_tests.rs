use super::*;
use axum::{
    body::{self, Body},
    http::Request,
};
use chrono::Duration;
use shared::domain::Deadline;
use tower::ServiceExt;

fn test_app() -> Router {
    let mut soon = Conference::new("soon-conf", "Soon Conference");
    soon.acronym = Some("SOON".into());
    soon.deadlines = vec![Deadline {
        name: "Paper".into(),
        date: (Utc::now() + Duration::days(5)).to_rfc3339(),
        timezone: None,
    }];
    let mut later = Conference::new("later-conf", "Later Conference");
    later.deadlines = vec![Deadline {
        name: "Paper".into(),
        date: (Utc::now() + Duration::days(90)).to_rfc3339(),
        timezone: None,
    }];
    let zeta = Conference::new("zeta", "Zeta");

    let catalog = Catalog::from_conferences(vec![zeta, soon, later]).expect("catalog");
    let state = AppState {
        api: ApiContext::new(catalog),
    };
    build_router(Arc::new(state), &Settings::default()).expect("router")
}

async fn get_json<T: serde::de::DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, T) {
    let request = Request::get(uri).body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&body).expect("json"))
}

#[tokio::test]
async fn healthz_reports_catalog_size() {
    let (status, health): (_, HealthResponse) = get_json(test_app(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health.status, "ok");
    assert_eq!(health.conferences, 3);
}

#[tokio::test]
async fn list_applies_query_criteria() {
    let (status, conferences): (_, Vec<Conference>) =
        get_json(test_app(), "/conferences?search=conference&sortBy=name&sortOrder=desc").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = conferences.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["soon-conf", "later-conf"]);
}

#[tokio::test]
async fn malformed_criteria_fall_back_to_defaults() {
    let (status, conferences): (_, Vec<Conference>) =
        get_json(test_app(), "/conferences?year=soon&sortBy=hype").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conferences.len(), 3);
}

#[tokio::test]
async fn get_conference_by_id() {
    let (status, conference): (_, Conference) =
        get_json(test_app(), "/conferences/soon-conf").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conference.acronym.as_deref(), Some("SOON"));
}

#[tokio::test]
async fn unknown_conference_is_a_json_404() {
    let (status, error): (_, ApiError) = get_json(test_app(), "/conferences/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn upcoming_deadlines_respect_the_window() {
    let (status, upcoming): (_, Vec<UpcomingDeadline>) =
        get_json(test_app(), "/deadlines/upcoming").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].conference_id.as_str(), "soon-conf");

    let (_, wider): (_, Vec<UpcomingDeadline>) =
        get_json(test_app(), "/deadlines/upcoming?days=120").await;
    let ids: Vec<_> = wider.iter().map(|d| d.conference_id.as_str()).collect();
    assert_eq!(ids, ["soon-conf", "later-conf"]);
}

#[tokio::test]
async fn non_numeric_days_is_a_validation_error() {
    let (status, error): (_, ApiError) =
        get_json(test_app(), "/deadlines/upcoming?days=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error.code, ErrorCode::Validation);
}

#[test]
fn invalid_cors_origin_is_rejected() {
    assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    assert!(cors_layer(&["http://localhost:5173".to_string()]).is_ok());
}

#[test]
fn embedded_catalog_is_the_default() {
    let catalog = load_catalog(&Settings::default()).expect("catalog");
    assert!(!catalog.is_empty());
}

#[test]
fn configured_catalog_path_is_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, r#"[{"id":"only","name":"Only"}]"#).expect("write");
    let settings = Settings {
        catalog_path: Some(path),
        ..Settings::default()
    };
    let catalog = load_catalog(&settings).expect("catalog");
    assert_eq!(catalog.len(), 1);
}

#[test]
fn catalog_with_data_issues_still_serves() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("catalog.json");
    std::fs::write(
        &path,
        r#"[{"id":"odd","name":"Odd","deadlines":[{"name":"Paper","date":"soon"}]}]"#,
    )
    .expect("write");
    let settings = Settings {
        catalog_path: Some(path),
        ..Settings::default()
    };
    let catalog = load_catalog(&settings).expect("catalog");
    assert_eq!(catalog.validate().len(), 1);
}

#[tokio::test]
async fn conference_ids_are_percent_decoded() {
    let mut spaced = Conference::new("with space", "Spaced");
    spaced.acronym = Some("SP".into());
    let catalog = Catalog::from_conferences(vec![spaced]).expect("catalog");
    let app = build_router(
        Arc::new(AppState {
            api: ApiContext::new(catalog),
        }),
        &Settings::default(),
    )
    .expect("router");
    let (status, conference): (_, Conference) = get_json(app, "/conferences/with%20space").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conference.acronym.as_deref(), Some("SP"));
}
