// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT session tokens: issuance and the authentication middleware.

use crate::error::AppError;
use crate::models::Role;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (actor ID)
    pub sub: String,
    /// Role the session was opened under
    pub role: Role,
    /// Competition the session currently operates under
    #[serde(
        rename = "currentCompetition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_competition: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated actor extracted from a verified JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub actor_id: String,
    pub role: Role,
    pub current_competition: Option<String>,
}

/// Middleware that requires valid JWT authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => &h[7..],
        _ => return Err(AppError::Unauthorized),
    };

    let claims = verify_jwt(token, &state.config.jwt_signing_key)?;

    request.extensions_mut().insert(AuthUser {
        actor_id: claims.sub,
        role: claims.role,
        current_competition: claims.current_competition,
    });

    Ok(next.run(request).await)
}

/// Verify a session token's signature and expiry.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            AppError::InvalidToken
        })
}

/// Create a JWT for an actor session.
///
/// Login issues a token with no competition; switching issues a fresh one
/// carrying the selected competition id.
pub fn create_jwt(
    actor_id: &str,
    role: Role,
    current_competition: Option<&str>,
    signing_key: &[u8],
    ttl_secs: u64,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: actor_id.to_string(),
        role,
        current_competition: current_competition.map(str::to_string),
        iat: now,
        exp: now + ttl_secs as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
