// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side competition-scoped session management.
//!
//! A [`CompetitionContext`] lives at the root of the authenticated shell and
//! tracks which competition the signed-in actor operates under. It reads the
//! role-scoped token from a [`TokenStore`], talks to the auth service through
//! an [`AuthServiceClient`], and broadcasts [`ContextEvent`]s so that
//! competition-scoped data can refresh after a switch.

pub mod claims;
pub mod client;
pub mod context;
pub mod token_store;

pub use claims::{current_competition_claim, decode_unverified, TokenClaims};
pub use client::AuthServiceClient;
pub use context::{CompetitionContext, ContextEvent, ContextSnapshot};
pub use token_store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore};

use crate::models::Role;

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No role is active for this session")]
    MissingRole,

    #[error("No session token stored for role {0}")]
    MissingToken(Role),

    /// Non-2xx response; `message` is the server's message or a fallback.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Request never produced a usable response.
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// The session was torn down while a switch was outstanding.
    #[error("Session for role {0} ended before the switch completed")]
    SessionEnded(Role),

    #[error("Token store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// HTTP status of a rejected request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SessionError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
