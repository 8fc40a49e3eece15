// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the auth service's session endpoints.

use crate::config::ClientConfig;
use crate::models::Competition;
use crate::session::SessionError;
use serde::{de::DeserializeOwned, Deserialize};

const FETCH_FAILED: &str = "Failed to fetch competitions";
const SWITCH_FAILED: &str = "Failed to switch competition";

/// Auth service client. Cheap to clone.
#[derive(Clone)]
pub struct AuthServiceClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct AssignedCompetitionsBody {
    competitions: Vec<Competition>,
}

#[derive(Deserialize)]
struct SetCompetitionBody {
    token: String,
}

/// Error body returned by the service on non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl AuthServiceClient {
    pub fn new(config: &ClientConfig) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| SessionError::Transport {
                message: "Failed to build HTTP client".to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `GET /api/auth/assigned-competitions`
    pub async fn assigned_competitions(
        &self,
        token: &str,
    ) -> Result<Vec<Competition>, SessionError> {
        let response = self
            .http
            .get(format!("{}/api/auth/assigned-competitions", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| SessionError::Transport {
                message: FETCH_FAILED.to_string(),
                source,
            })?;

        let body: AssignedCompetitionsBody = check_response_json(response, FETCH_FAILED).await?;
        Ok(body.competitions)
    }

    /// `POST /api/auth/set-competition`, returning the newly issued token.
    pub async fn set_competition(
        &self,
        token: &str,
        competition_id: &str,
    ) -> Result<String, SessionError> {
        let response = self
            .http
            .post(format!("{}/api/auth/set-competition", self.base_url))
            .bearer_auth(token)
            .json(&serde_json::json!({ "competitionId": competition_id }))
            .send()
            .await
            .map_err(|source| SessionError::Transport {
                message: SWITCH_FAILED.to_string(),
                source,
            })?;

        let body: SetCompetitionBody = check_response_json(response, SWITCH_FAILED).await?;
        Ok(body.token)
    }
}

/// Check response status and parse the JSON body.
///
/// Failures carry the server's `message` when it sent one, else `fallback`.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, SessionError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());

        tracing::warn!(status = status.as_u16(), message = %message, "Auth service rejected request");
        return Err(SessionError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|source| SessionError::Transport {
            message: fallback.to_string(),
            source,
        })
}
