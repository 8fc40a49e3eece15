// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory competition store with typed operations.
//!
//! Holds:
//! - Competitions (keyed by `_id`)
//! - Assignments (actor ID -> ordered competition IDs)

use crate::error::AppError;
use crate::models::{Competition, Role};
use dashmap::DashMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Seed file layout loaded at startup.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub competitions: Vec<Competition>,
    /// Actor ID -> competition IDs the actor may operate under.
    #[serde(default)]
    pub assignments: HashMap<String, Vec<String>>,
}

/// Competition store, cheap to clone (shared maps).
#[derive(Clone, Default)]
pub struct CompetitionStore {
    competitions: Arc<DashMap<String, Competition>>,
    assignments: Arc<DashMap<String, Vec<String>>>,
}

impl CompetitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from seed data.
    pub fn from_seed(seed: SeedData) -> Self {
        let store = Self::new();
        for competition in seed.competitions {
            store.upsert_competition(competition);
        }
        for (actor_id, competition_ids) in seed.assignments {
            for competition_id in competition_ids {
                store.assign(&actor_id, &competition_id);
            }
        }
        store
    }

    /// Load a JSON seed file.
    pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to read seed file {}: {}",
                path.display(),
                e
            ))
        })?;
        let seed: SeedData = serde_json::from_str(&raw).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to parse seed file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            competitions = seed.competitions.len(),
            actors = seed.assignments.len(),
            "Loaded seed data"
        );
        Ok(Self::from_seed(seed))
    }

    // ─── Competition Operations ──────────────────────────────────

    /// Create or replace a competition.
    pub fn upsert_competition(&self, competition: Competition) {
        self.competitions.insert(competition.id.clone(), competition);
    }

    pub fn get_competition(&self, competition_id: &str) -> Option<Competition> {
        self.competitions
            .get(competition_id)
            .map(|entry| entry.value().clone())
    }

    /// All competitions, earliest start first; undated ones last, then by name.
    pub fn list_competitions(&self) -> Vec<Competition> {
        let mut all: Vec<Competition> = self
            .competitions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| {
            (a.start_date.is_none(), a.start_date, &a.name, &a.id).cmp(&(
                b.start_date.is_none(),
                b.start_date,
                &b.name,
                &b.id,
            ))
        });
        all
    }

    // ─── Assignment Operations ───────────────────────────────────

    /// Assign a competition to an actor. Repeated assignments are ignored.
    pub fn assign(&self, actor_id: &str, competition_id: &str) {
        let mut ids = self.assignments.entry(actor_id.to_string()).or_default();
        if !ids.iter().any(|id| id == competition_id) {
            ids.push(competition_id.to_string());
        }
    }

    /// Competitions the actor may operate under, in assignment order.
    ///
    /// Assignments pointing at unknown competitions are skipped.
    pub fn assigned_competitions(&self, actor_id: &str, role: Role) -> Vec<Competition> {
        if role.sees_all_competitions() {
            return self.list_competitions();
        }

        let ids = match self.assignments.get(actor_id) {
            Some(ids) => ids.clone(),
            None => return Vec::new(),
        };

        ids.iter()
            .filter_map(|id| self.get_competition(id))
            .collect()
    }

    /// Whether the actor may operate under the competition.
    pub fn is_assigned(&self, actor_id: &str, role: Role, competition_id: &str) -> bool {
        if !self.competitions.contains_key(competition_id) {
            return false;
        }
        if role.sees_all_competitions() {
            return true;
        }
        self.assignments
            .get(actor_id)
            .is_some_and(|ids| ids.iter().any(|id| id == competition_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompetitionStatus;

    fn seeded() -> CompetitionStore {
        let store = CompetitionStore::new();
        store.upsert_competition(Competition::new(
            "C1",
            "Spring Cup",
            CompetitionStatus::Upcoming,
        ));
        store.upsert_competition(Competition::new(
            "C2",
            "Winter Cup",
            CompetitionStatus::Completed,
        ));
        store.upsert_competition(Competition::new("C3", "Autumn Open", CompetitionStatus::Ongoing));
        store.assign("coach-1", "C2");
        store.assign("coach-1", "C1");
        store
    }

    #[test]
    fn test_assigned_competitions_keep_assignment_order() {
        let store = seeded();
        let ids: Vec<String> = store
            .assigned_competitions("coach-1", Role::Coach)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["C2", "C1"]);
    }

    #[test]
    fn test_duplicate_assignment_ignored() {
        let store = seeded();
        store.assign("coach-1", "C1");
        assert_eq!(store.assigned_competitions("coach-1", Role::Coach).len(), 2);
    }

    #[test]
    fn test_super_admin_sees_everything() {
        let store = seeded();
        assert_eq!(
            store.assigned_competitions("root", Role::SuperAdmin).len(),
            3
        );
        assert!(store.is_assigned("root", Role::SuperAdmin, "C3"));
        assert!(!store.is_assigned("root", Role::SuperAdmin, "C9"));
    }

    #[test]
    fn test_membership() {
        let store = seeded();
        assert!(store.is_assigned("coach-1", Role::Coach, "C1"));
        assert!(!store.is_assigned("coach-1", Role::Coach, "C3"));
        assert!(!store.is_assigned("nobody", Role::Player, "C1"));
    }

    #[test]
    fn test_dangling_assignment_skipped() {
        let store = seeded();
        store.assign("judge-1", "C404");
        store.assign("judge-1", "C3");
        let assigned = store.assigned_competitions("judge-1", Role::Judge);
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].id, "C3");
    }

    #[test]
    fn test_seed_roundtrip_from_json() {
        let seed: SeedData = serde_json::from_str(
            r#"{
                "competitions": [{"_id": "C1", "name": "Spring Cup", "status": "upcoming"}],
                "assignments": {"player-7": ["C1"]}
            }"#,
        )
        .unwrap();
        let store = CompetitionStore::from_seed(seed);
        assert!(store.is_assigned("player-7", Role::Player, "C1"));
    }
}
