// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Actor roles and their role-scoped storage keys.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Kind of actor operating the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    Player,
    Coach,
    Admin,
    SuperAdmin,
    Judge,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Player,
        Role::Coach,
        Role::Admin,
        Role::SuperAdmin,
        Role::Judge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Coach => "coach",
            Role::Admin => "admin",
            Role::SuperAdmin => "super-admin",
            Role::Judge => "judge",
        }
    }

    /// Storage key of the role's session token (`<role>_token`).
    pub fn token_key(&self) -> String {
        format!("{}_token", self.as_str())
    }

    /// Storage key of the role's cached profile (`<role>_user`).
    pub fn user_key(&self) -> String {
        format!("{}_user", self.as_str())
    }

    /// Whether the role may operate under every competition without an
    /// explicit assignment.
    pub fn sees_all_competitions(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys() {
        assert_eq!(Role::Coach.token_key(), "coach_token");
        assert_eq!(Role::Coach.user_key(), "coach_user");
        assert_eq!(Role::SuperAdmin.token_key(), "super-admin_token");
    }

    #[test]
    fn test_serde_matches_as_str() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            assert_eq!(serde_json::from_str::<Role>(&json).unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role() {
        assert!(serde_json::from_str::<Role>("\"referee\"").is_err());
    }
}
