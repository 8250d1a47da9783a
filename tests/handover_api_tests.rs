use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::{
    fs,
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

use handover_hub::router::{HubState, hub_router};

const ADMIN_PASSWORD: &str = "bootstrap-pw";

async fn spawn_app() -> (Router, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "handover-hub-docs-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", temp_path.display());
    let storage = handover_hub::Storage::connect(&database_url)
        .await
        .expect("failed to open test database");
    let state = HubState::new(storage);
    state
        .authenticator
        .bootstrap_admin(ADMIN_PASSWORD)
        .await
        .expect("failed to bootstrap admin");
    (hub_router(state), temp_path)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not JSON")
    };
    (status, value)
}

async fn session_token(app: &Router) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": "admin", "password": ADMIN_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("login returned no token").to_string()
}

#[tokio::test]
async fn put_then_get_returns_the_exact_payload() {
    let (app, db) = spawn_app().await;
    let token = session_token(&app).await;

    let payload = json!({
        "shift": "night",
        "open_issues": [{"id": 17, "title": "pump flaky"}],
        "notes": "nothing else to report",
        "nested": {"deeply": {"kept": true}}
    });

    let (status, body) = request(
        &app,
        "PUT",
        "/api/handovers/2026-08-07",
        Some(&token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, fetched) =
        request(&app, "GET", "/api/handovers/2026-08-07", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, payload);

    let _ = fs::remove_file(&db);
}

#[tokio::test]
async fn last_write_wins_on_the_whole_document() {
    let (app, db) = spawn_app().await;
    let token = session_token(&app).await;

    let first = json!({"version": "A", "only_in_a": true});
    let second = json!({"version": "B"});

    let (status, _) = request(
        &app,
        "PUT",
        "/api/handovers/doc",
        Some(&token),
        Some(first),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request(
        &app,
        "PUT",
        "/api/handovers/doc",
        Some(&token),
        Some(second.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // full overwrite: no field from the first write survives
    let (status, fetched) = request(&app, "GET", "/api/handovers/doc", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, second);

    let _ = fs::remove_file(&db);
}

#[tokio::test]
async fn listing_orders_by_last_update_descending() {
    let (app, db) = spawn_app().await;
    let token = session_token(&app).await;

    for id in ["first", "second", "third"] {
        let (status, _) = request(
            &app,
            "PUT",
            &format!("/api/handovers/{id}"),
            Some(&token),
            Some(json!({"id": id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // keep the microsecond timestamps strictly apart
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // re-writing "first" bumps it to the front
    let (status, _) = request(
        &app,
        "PUT",
        "/api/handovers/first",
        Some(&token),
        Some(json!({"id": "first", "rev": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&app, "GET", "/api/handovers", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .expect("summary list")
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["first", "third", "second"]);
    for summary in body.as_array().unwrap() {
        assert!(summary["lastUpdated"].is_string());
        assert!(summary.get("payload").is_none());
    }

    let _ = fs::remove_file(&db);
}

#[tokio::test]
async fn documents_require_an_authenticated_session() {
    let (app, db) = spawn_app().await;

    let (status, body) = request(&app, "GET", "/api/handovers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "NO_SESSION");

    let (status, body) = request(
        &app,
        "PUT",
        "/api/handovers/doc",
        Some("bogus-token"),
        Some(json!({"x": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_SESSION");

    let _ = fs::remove_file(&db);
}

#[tokio::test]
async fn fetching_an_unknown_document_is_404() {
    let (app, db) = spawn_app().await;
    let token = session_token(&app).await;

    let (status, body) = request(&app, "GET", "/api/handovers/nope", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let _ = fs::remove_file(&db);
}
