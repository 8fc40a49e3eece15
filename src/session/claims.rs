// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Unverified session-token decoding.
//!
//! The client cannot check signatures, so decoded claims are only hints
//! (e.g. which competition was last selected). Authorization is always
//! decided by the auth service.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// Claim set readable from a session token without contacting the server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    /// Kept as text so tokens for roles this build does not know still decode.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(rename = "currentCompetition", default)]
    pub current_competition: Option<String>,
    #[serde(default)]
    pub exp: Option<u64>,
}

/// Decode a token's claims without verifying signature or expiry.
///
/// Only the payload segment is read, so the header's `alg` (including
/// `none`) does not matter. Returns `None` unless the token has exactly
/// three segments and a base64url JSON object payload.
pub fn decode_unverified(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        tracing::debug!("Session token is not a three-part JWT");
        return None;
    };

    let bytes = match URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Session token payload is not base64url");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(error = %e, "Could not decode session token claims");
            None
        }
    }
}

/// Competition id carried by the token, if any.
///
/// Absent, malformed and claim-less tokens all mean "no competition selected".
pub fn current_competition_claim(token: Option<&str>) -> Option<String> {
    decode_unverified(token?)?
        .current_competition
        .filter(|id| !id.is_empty())
}
