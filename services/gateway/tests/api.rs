//! Router tests: drive the full HTTP surface in-process.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use feed::CacheHandle;
use gateway::config::GatewayConfig;
use gateway::router::create_router;
use gateway::state::AppState;
use ledger::{CounterAllocator, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn start(app: &Router) -> String {
    let (status, body) = call(
        app,
        "POST",
        "/matches/start",
        Some(json!({"team1": "India", "team2": "Pakistan", "venue": "MCG"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["matchId"].as_str().unwrap().to_string()
}

fn ball(over: i64, ball: i64, event_type: &str, runs: Option<i64>, bowler: &str) -> Value {
    json!({
        "over": over,
        "ball": ball,
        "eventType": event_type,
        "runs": runs,
        "batsman": "Kohli",
        "bowler": bowler,
        "description": format!("{over}.{ball}"),
    })
}

#[tokio::test]
async fn test_health() {
    let app = create_router(AppState::in_memory());
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_start_and_fetch_match() {
    let app = create_router(AppState::in_memory());
    let id = start(&app).await;
    assert_eq!(id, "0001");

    let (status, body) = call(&app, "GET", "/matches/0001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team1"], "India");
    assert_eq!(body["status"], "live");
    assert_eq!(body["commentary"], json!([]));

    let (status, body) = call(&app, "GET", "/matches", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_start_rejects_blank_team() {
    let app = create_router(AppState::in_memory());
    let (status, body) = call(
        &app,
        "POST",
        "/matches/start",
        Some(json!({"team1": " ", "team2": "Pakistan", "venue": "MCG"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_unknown_match_is_404() {
    let app = create_router(AppState::in_memory());
    for (method, uri) in [
        ("GET", "/matches/0042"),
        ("GET", "/matches/0042/stats"),
        ("GET", "/matches/0042/commentary"),
        ("GET", "/matches/0042/commentary/recent"),
        ("POST", "/matches/0042/pause"),
        ("POST", "/matches/0042/resume"),
    ] {
        let (status, body) = call(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["error"], "NOT_FOUND");
    }

    let (status, _) = call(
        &app,
        "POST",
        "/matches/0042/commentary",
        Some(ball(0, 0, "run", Some(1), "Shaheen")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_append_flow() {
    let app = create_router(AppState::in_memory());
    let id = start(&app).await;
    let uri = format!("/matches/{id}/commentary");

    let deliveries = [
        ball(0, 0, "run", Some(4), "Shaheen"),
        ball(0, 1, "wide", None, "Shaheen"),
        ball(0, 1, "run", Some(6), "Shaheen"),
        ball(0, 2, "wicket", None, "Shaheen"),
    ];
    for delivery in deliveries {
        let (status, body) = call(&app, "POST", &uri, Some(delivery)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["matchId"], id.as_str());
    }

    let (status, body) = call(&app, "GET", &format!("/matches/{id}/stats"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eventCount"], 4);
    assert_eq!(body["stats"]["totalRuns"], 11);
    assert_eq!(body["stats"]["batsmen"]["Kohli"]["runs"], 10);
    assert_eq!(body["stats"]["batsmen"]["Kohli"]["fours"], 1);
    assert_eq!(body["stats"]["batsmen"]["Kohli"]["sixes"], 1);
    assert_eq!(body["stats"]["bowlers"]["Shaheen"]["ballsBowled"], 3);
    assert_eq!(body["stats"]["bowlers"]["Shaheen"]["wickets"], 1);
    assert_eq!(body["stats"]["bowlers"]["Shaheen"]["overs"], 0.3);
    assert_eq!(body["stats"]["currentBowler"]["name"], "Shaheen");

    let (_, body) = call(&app, "GET", &uri, None).await;
    let order: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["position"].as_i64().unwrap())
        .collect();
    assert_eq!(order, vec![3, 2, 1, 0]);

    let (_, body) = call(&app, "GET", &format!("/matches/{id}/commentary/recent"), None).await;
    assert_eq!(body.as_array().unwrap().len(), 4);
    assert_eq!(body[0]["eventType"], "wicket");
}

#[tokio::test]
async fn test_invalid_deliveries_are_400() {
    let app = create_router(AppState::in_memory());
    let id = start(&app).await;
    let uri = format!("/matches/{id}/commentary");

    for delivery in [
        ball(0, 7, "run", Some(1), "Shaheen"),
        ball(-1, 0, "run", Some(1), "Shaheen"),
        ball(0, 0, "boundary", Some(4), "Shaheen"),
        ball(0, 0, "run", Some(-2), "Shaheen"),
        json!({"over": 0, "ball": 0}),
        json!("not an object"),
    ] {
        let (status, body) = call(&app, "POST", &uri, Some(delivery.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{delivery}");
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    let (_, body) = call(&app, "GET", &format!("/matches/{id}"), None).await;
    assert_eq!(body["commentary"], json!([]));
}

#[tokio::test]
async fn test_paused_match_rejects_commentary() {
    let app = create_router(AppState::in_memory());
    let id = start(&app).await;
    let uri = format!("/matches/{id}/commentary");

    call(&app, "POST", &uri, Some(ball(0, 0, "run", Some(1), "Afridi"))).await;

    let (status, body) = call(&app, "POST", &format!("/matches/{id}/pause"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paused");

    let (status, body) = call(&app, "POST", &uri, Some(ball(0, 1, "run", Some(1), "Afridi"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "MATCH_PAUSED");

    let (_, body) = call(&app, "GET", &format!("/matches/{id}"), None).await;
    assert_eq!(body["commentary"].as_array().unwrap().len(), 1);

    let (status, body) = call(&app, "POST", &format!("/matches/{id}/resume"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "live");

    let (status, _) = call(&app, "POST", &uri, Some(ball(0, 1, "run", Some(1), "Afridi"))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_recent_commentary_without_cache() {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(CounterAllocator::new()),
        CacheHandle::Unavailable,
        16,
        Default::default(),
    );
    let app = create_router(state);
    let id = start(&app).await;

    let (status, _) = call(
        &app,
        "POST",
        &format!("/matches/{id}/commentary"),
        Some(ball(0, 0, "bye", None, "Rauf")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, "GET", &format!("/matches/{id}/commentary/recent"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_journal_backed_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = GatewayConfig {
        journal_path: Some(dir.path().join("scoreboard.journal")),
        ..GatewayConfig::default()
    };

    {
        let app = create_router(AppState::from_config(&config).await.unwrap());
        let id = start(&app).await;
        call(
            &app,
            "POST",
            &format!("/matches/{id}/commentary"),
            Some(ball(0, 0, "run", Some(2), "Naseem")),
        )
        .await;
    }

    let app = create_router(AppState::from_config(&config).await.unwrap());
    let (status, body) = call(&app, "GET", "/matches/0001/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalRuns"], 2);

    assert_eq!(start(&app).await, "0002");
}
