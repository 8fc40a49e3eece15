// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes: competition assignments and competition switching.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser};
use crate::models::{Competition, Role};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Session routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        .route(
            "/api/auth/assigned-competitions",
            get(get_assigned_competitions),
        )
        .route("/api/auth/set-competition", post(set_competition))
}

// ─── Session ─────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub sub: String,
    pub role: Role,
    pub current_competition: Option<String>,
}

/// Describe the verified session.
async fn get_me(Extension(user): Extension<AuthUser>) -> Json<SessionResponse> {
    Json(SessionResponse {
        sub: user.actor_id,
        role: user.role,
        current_competition: user.current_competition,
    })
}

// ─── Assignments ─────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AssignedCompetitionsResponse {
    pub competitions: Vec<Competition>,
}

/// List the competitions the caller may operate under.
async fn get_assigned_competitions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<AssignedCompetitionsResponse> {
    let competitions = state.db.assigned_competitions(&user.actor_id, user.role);

    tracing::debug!(
        actor_id = %user.actor_id,
        role = %user.role,
        count = competitions.len(),
        "Listing assigned competitions"
    );

    Json(AssignedCompetitionsResponse { competitions })
}

// ─── Competition Switch ──────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetCompetitionRequest {
    #[validate(length(min = 1, max = 64))]
    pub competition_id: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SetCompetitionResponse {
    pub token: String,
}

/// Re-issue the caller's session token with a new current competition.
///
/// The old token is not revoked; it simply keeps its old claim until it
/// expires.
async fn set_competition(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SetCompetitionRequest>,
) -> Result<Json<SetCompetitionResponse>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if !state
        .db
        .is_assigned(&user.actor_id, user.role, &request.competition_id)
    {
        tracing::warn!(
            actor_id = %user.actor_id,
            role = %user.role,
            competition_id = %request.competition_id,
            "Rejected switch to unassigned competition"
        );
        return Err(AppError::Forbidden(
            AppError::NOT_AUTHORIZED_FOR_COMPETITION.to_string(),
        ));
    }

    let token = create_jwt(
        &user.actor_id,
        user.role,
        Some(&request.competition_id),
        &state.config.jwt_signing_key,
        state.config.token_ttl_secs,
    )?;

    tracing::info!(
        actor_id = %user.actor_id,
        role = %user.role,
        competition_id = %request.competition_id,
        "Issued session token for competition"
    );

    Ok(Json(SetCompetitionResponse { token }))
}
