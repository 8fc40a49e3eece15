// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Competition-scoped sessions for the competition registration app.
//!
//! This crate provides both halves of the "current competition" flow:
//! the auth service endpoints that list an actor's assigned competitions
//! and re-issue session tokens for a chosen competition, and the client
//! session context that stores role-scoped tokens and switches between
//! competitions.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod session;

use config::Config;
use db::CompetitionStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: CompetitionStore,
}
