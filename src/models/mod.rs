// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models shared by the auth service and the session client.

pub mod competition;
pub mod role;
pub mod user;

pub use competition::{AgeGroup, Competition, CompetitionStatus};
pub use role::Role;
pub use user::UserProfile;
