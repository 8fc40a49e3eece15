// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use competition_session::config::{ClientConfig, Config};
use competition_session::db::CompetitionStore;
use competition_session::middleware::auth::create_jwt;
use competition_session::models::{Competition, CompetitionStatus, Role};
use competition_session::routes::create_router;
use competition_session::session::{AuthServiceClient, CompetitionContext, MemoryTokenStore};
use competition_session::AppState;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[allow(dead_code)]
pub const COACH_ID: &str = "coach-1";

/// The two competitions assigned to `COACH_ID`.
#[allow(dead_code)]
pub fn scenario_competitions() -> Vec<Competition> {
    vec![
        Competition::new("C1", "Spring Cup", CompetitionStatus::Upcoming),
        Competition::new("C2", "Winter Cup", CompetitionStatus::Completed),
    ]
}

/// Create a session token signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(actor_id: &str, role: Role, competition: Option<&str>) -> String {
    create_jwt(
        actor_id,
        role,
        competition,
        &Config::test_default().jwt_signing_key,
        3600,
    )
    .expect("Failed to create JWT")
}

/// Create the real service with `COACH_ID` assigned to C1 and C2, and an
/// unassigned C3. Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let db = CompetitionStore::new();
    for competition in scenario_competitions() {
        db.upsert_competition(competition);
    }
    db.upsert_competition(Competition::new(
        "C3",
        "Autumn Open",
        CompetitionStatus::Ongoing,
    ));
    db.assign(COACH_ID, "C1");
    db.assign(COACH_ID, "C2");

    let state = Arc::new(AppState {
        config: Config::test_default(),
        db,
    });

    (create_router(state.clone()), state)
}

/// Serve `app` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    format!("http://{}", addr)
}

/// Canned auth service that counts switch requests.
///
/// Assigned competitions are C1 and C2; switching to either returns
/// `{"token": "newtoken"}`, anything else is rejected with 403.
#[allow(dead_code)]
pub struct MockAuthService {
    pub base_url: String,
    pub switch_calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockAuthService {
    pub async fn spawn() -> Self {
        Self::spawn_with_delay(Duration::ZERO).await
    }

    /// Like `spawn`, but every switch response is delayed.
    pub async fn spawn_with_delay(delay: Duration) -> Self {
        let switch_calls = Arc::new(AtomicUsize::new(0));
        let calls = switch_calls.clone();

        let app = Router::new()
            .route(
                "/api/auth/assigned-competitions",
                get(|| async { Json(json!({ "competitions": scenario_competitions() })) }),
            )
            .route(
                "/api/auth/set-competition",
                post(move |Json(body): Json<Value>| {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(delay).await;
                        match body["competitionId"].as_str() {
                            Some("C1") | Some("C2") => {
                                (StatusCode::OK, Json(json!({ "token": "newtoken" })))
                            }
                            _ => (
                                StatusCode::FORBIDDEN,
                                Json(json!({ "message": "Not authorized for this competition" })),
                            ),
                        }
                    }
                }),
            );

        Self {
            base_url: spawn_server(app).await,
            switch_calls,
        }
    }

    pub fn switch_calls(&self) -> usize {
        self.switch_calls.load(Ordering::SeqCst)
    }
}

/// Client pointed at `base_url` with a short timeout.
#[allow(dead_code)]
pub fn test_client(base_url: &str) -> AuthServiceClient {
    AuthServiceClient::new(&ClientConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
    })
    .expect("Failed to build client")
}

/// Context over a fresh in-memory store. Returns the store for inspection.
#[allow(dead_code)]
pub fn test_context(base_url: &str) -> (CompetitionContext, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    let context = CompetitionContext::new(store.clone(), test_client(base_url));
    (context, store)
}
