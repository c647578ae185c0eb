//! End-to-end check-in flow over HTTP against the in-memory store.
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use campus_checkin::api;
use campus_checkin::app_state::AppState;
use campus_checkin::domain::{Clock, ManualClock};
use campus_checkin::persistence::{AttendanceStore, MemoryStore};

struct TestServer {
    base: String,
    client: Client,
    clock: Arc<ManualClock>,
}

impl TestServer {
    async fn start() -> Self {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store: Arc<dyn AttendanceStore> = Arc::new(MemoryStore::with_clock(
            Arc::clone(&clock) as Arc<dyn Clock>
        ));
        let state = AppState::new(store, Duration::seconds(300));
        let app = api::build_app(state, StdDuration::from_secs(5));

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base: format!("http://{addr}"),
            client: Client::new(),
            clock,
        }
    }

    async fn post(&self, path: &str, user: i64, role: &str, body: Value) -> (StatusCode, Value) {
        let result = self
            .client
            .post(format!("{}{path}", self.base))
            .header("x-user-id", user.to_string())
            .header("x-user-role", role)
            .json(&body)
            .send()
            .await;
        let Ok(response) = result else {
            panic!("request to {path} failed");
        };
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, path: &str, user: i64, role: &str) -> (StatusCode, Value) {
        let result = self
            .client
            .get(format!("{}{path}", self.base))
            .header("x-user-id", user.to_string())
            .header("x-user-role", role)
            .send()
            .await;
        let Ok(response) = result else {
            panic!("request to {path} failed");
        };
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn create_event(&self, title: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/v1/events",
                1,
                "admin",
                json!({
                    "title": title,
                    "starts_at": (Utc::now() + Duration::days(1)).to_rfc3339(),
                    "location": "Auditorium",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let Some(id) = body.get("event_id").and_then(Value::as_i64) else {
            panic!("missing event_id in {body}");
        };
        id
    }

    async fn register(&self, event_id: i64, user: i64) {
        let (status, _) = self
            .post(
                &format!("/api/v1/events/{event_id}/register"),
                user,
                "student",
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    async fn issue(&self, event_id: i64) -> String {
        let (status, body) = self
            .post(
                &format!("/api/v1/attendance/{event_id}/token"),
                1,
                "admin",
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("expires_in_seconds").and_then(Value::as_u64), Some(300));
        let Some(token) = body.get("token").and_then(Value::as_str) else {
            panic!("missing token in {body}");
        };
        token.to_string()
    }

    async fn check_in(&self, event_id: i64, token: &str, user: i64) -> (StatusCode, Value) {
        self.post(
            "/api/v1/attendance/check-in",
            user,
            "student",
            json!({ "event_id": event_id, "scanned_token": token }),
        )
        .await
    }
}

fn error_code(body: &Value) -> Option<u64> {
    body.get("error")
        .and_then(|e| e.get("code"))
        .and_then(Value::as_u64)
}

#[tokio::test]
async fn check_in_then_repeat_conflicts() {
    let server = TestServer::start().await;
    let event = server.create_event("Welcome night").await;
    server.register(event, 100).await;
    let token = server.issue(event).await;

    let (status, body) = server.check_in(event, &token, 100).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("checked_in_at").is_some());

    let (status, body) = server.check_in(event, &token, 100).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), Some(2002));
}

#[tokio::test]
async fn stale_token_is_rejected_after_reissue() {
    let server = TestServer::start().await;
    let event = server.create_event("Workshop").await;
    server.register(event, 100).await;
    let stale = server.issue(event).await;
    let _fresh = server.issue(event).await;

    let (status, body) = server.check_in(event, &stale, 100).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), Some(4001));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let server = TestServer::start().await;
    let event = server.create_event("Seminar").await;
    server.register(event, 100).await;
    let token = server.issue(event).await;

    server.clock.advance(Duration::seconds(301));
    let (status, _) = server.check_in(event, &token, 100).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unregistered_student_is_forbidden() {
    let server = TestServer::start().await;
    let event = server.create_event("Debate").await;
    let token = server.issue(event).await;

    let (status, body) = server.check_in(event, &token, 200).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), Some(4002));
}

#[tokio::test]
async fn token_from_other_event_is_rejected() {
    let server = TestServer::start().await;
    let e1 = server.create_event("Concert").await;
    let e2 = server.create_event("Movie night").await;
    server.register(e2, 100).await;
    let token = server.issue(e1).await;

    let (status, _) = server.check_in(e2, &token, 100).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_token_is_a_validation_error() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post(
            "/api/v1/attendance/check-in",
            100,
            "student",
            json!({ "eventId": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), Some(1001));
}

#[tokio::test]
async fn string_event_id_is_accepted() {
    let server = TestServer::start().await;
    let event = server.create_event("Career fair").await;
    server.register(event, 100).await;
    let token = server.issue(event).await;

    let (status, body) = server
        .post(
            "/api/v1/attendance/check-in",
            100,
            "student",
            json!({ "eventId": event.to_string(), "scannedToken": token }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("event_id").and_then(Value::as_i64), Some(event));
}

#[tokio::test]
async fn unreadable_check_in_bodies_are_validation_errors() {
    let server = TestServer::start().await;
    let url = format!("{}/api/v1/attendance/check-in", server.base);

    let requests = [
        server.client.post(&url),
        server
            .client
            .post(&url)
            .header("content-type", "application/json")
            .body("{not json"),
        server
            .client
            .post(&url)
            .header("content-type", "application/json")
            .body(r#"{"eventId": 1.5, "scannedToken": "abc"}"#),
    ];

    for request in requests {
        let result = request
            .header("x-user-id", "100")
            .header("x-user-role", "student")
            .send()
            .await;
        let Ok(response) = result else {
            panic!("check-in request failed");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        assert_eq!(error_code(&body), Some(1001));
    }
}

#[tokio::test]
async fn events_with_registrations_cannot_be_deleted() {
    let server = TestServer::start().await;
    let empty = server.create_event("Cancelled mixer").await;
    let attended = server.create_event("Open mic").await;
    server.register(attended, 100).await;

    let delete = |id: i64| {
        server
            .client
            .delete(format!("{}/api/v1/events/{id}", server.base))
            .header("x-user-id", "1")
            .header("x-user-role", "admin")
            .send()
    };

    let Ok(response) = delete(empty).await else {
        panic!("delete request failed");
    };
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let Ok(response) = delete(attended).await else {
        panic!("delete request failed");
    };
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    assert_eq!(error_code(&body), Some(2002));

    let (status, _) = server
        .get(&format!("/api/v1/events/{empty}"), 1, "admin")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn students_cannot_issue_tokens() {
    let server = TestServer::start().await;
    let event = server.create_event("Town hall").await;
    let (status, body) = server
        .post(
            &format!("/api/v1/attendance/{event}/token"),
            100,
            "student",
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), Some(4004));
}

#[tokio::test]
async fn roster_reflects_check_ins() {
    let server = TestServer::start().await;
    let event = server.create_event("Volunteer day").await;
    server.register(event, 100).await;
    server.register(event, 101).await;
    let token = server.issue(event).await;
    let _ = server.check_in(event, &token, 101).await;

    let (status, body) = server
        .get(&format!("/api/v1/events/{event}/attendance"), 1, "admin")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("registered").and_then(Value::as_u64), Some(2));
    assert_eq!(body.get("checked_in").and_then(Value::as_u64), Some(1));

    let (status, body) = server
        .get("/api/v1/events/my-registrations", 101, "student")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([event]));
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::start().await;
    let Ok(response) = server
        .client
        .get(format!("{}/health", server.base))
        .send()
        .await
    else {
        panic!("health request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
}
