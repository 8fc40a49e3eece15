// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Competition context: which competition the actor currently operates under.
//!
//! Lifecycle:
//! 1. `initialize(role)` when the authenticated shell mounts (or the role
//!    changes): fetch the assignment list, rehydrate the selection from the
//!    token claim
//! 2. `switch_competition(id)`: obtain a new token from the server, replace
//!    the stored one, broadcast `CompetitionChanged`
//! 3. `clear_context()` / `logout()` / `teardown()` when the shell unmounts
//!
//! Subscribers refresh competition-scoped data on `CompetitionChanged`
//! instead of the whole application reloading.

use crate::models::{Competition, Role, UserProfile};
use crate::session::claims::current_competition_claim;
use crate::session::client::AuthServiceClient;
use crate::session::token_store::TokenStore;
use crate::session::SessionError;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Point-in-time view of the context for consuming views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSnapshot {
    pub current_competition: Option<Competition>,
    pub assigned_competitions: Vec<Competition>,
    /// True while a fetch or switch is outstanding; switch UI stays disabled.
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Notifications for competition-scoped stores.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextEvent {
    /// A new token for `competition_id` was stored.
    CompetitionChanged {
        role: Role,
        competition_id: String,
        competition: Option<Competition>,
    },
    /// Selection and assignments were dropped (logout or teardown).
    Cleared { role: Option<Role> },
}

#[derive(Default)]
struct ContextState {
    role: Option<Role>,
    snapshot: ContextSnapshot,
    /// Bumped on every teardown; a switch started under an older session
    /// must not write into the current one.
    session: u64,
}

impl ContextState {
    fn reset(&mut self) {
        *self = ContextState {
            session: self.session.wrapping_add(1),
            ..ContextState::default()
        };
    }
}

/// Per-application competition context.
pub struct CompetitionContext {
    store: Arc<dyn TokenStore>,
    client: AuthServiceClient,
    state: RwLock<ContextState>,
    events: broadcast::Sender<ContextEvent>,
}

impl CompetitionContext {
    pub fn new(store: Arc<dyn TokenStore>, client: AuthServiceClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            client,
            state: RwLock::new(ContextState::default()),
            events,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ContextState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ContextState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ─── Accessors ───────────────────────────────────────────────

    pub fn snapshot(&self) -> ContextSnapshot {
        self.read_state().snapshot.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.read_state().role
    }

    pub fn current_competition(&self) -> Option<Competition> {
        self.read_state().snapshot.current_competition.clone()
    }

    pub fn assigned_competitions(&self) -> Vec<Competition> {
        self.read_state().snapshot.assigned_competitions.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().snapshot.is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.read_state().snapshot.error.clone()
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Receive `ContextEvent`s from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ContextEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: ContextEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    // ─── Lifecycle ───────────────────────────────────────────────

    /// Load the assignment list for `role` and rehydrate the selection.
    ///
    /// Never fails: a missing role or token leaves the context empty, and a
    /// failed fetch is recorded in `error`.
    pub async fn initialize(&self, role: Option<Role>) {
        let Some(role) = role else {
            self.write_state().reset();
            return;
        };

        {
            let mut state = self.write_state();
            state.role = Some(role);
            state.snapshot = ContextSnapshot {
                is_loading: true,
                ..ContextSnapshot::default()
            };
        }

        let token = match self.store.token(role) {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::debug!(role = %role, "No stored token, context stays empty");
                self.finish_initialize(role, ContextSnapshot::default());
                return;
            }
            Err(e) => {
                tracing::warn!(role = %role, error = %e, "Failed to read stored token");
                self.finish_initialize(
                    role,
                    ContextSnapshot {
                        error: Some(e.to_string()),
                        ..ContextSnapshot::default()
                    },
                );
                return;
            }
        };

        let snapshot = match self.client.assigned_competitions(&token).await {
            Ok(competitions) => {
                // The claim is only an id reference; display data comes from the list
                let current = current_competition_claim(Some(&token))
                    .and_then(|id| competitions.iter().find(|c| c.id == id).cloned());

                tracing::info!(
                    role = %role,
                    assigned = competitions.len(),
                    current = current.as_ref().map(|c| c.id.as_str()).unwrap_or("none"),
                    "Competition context loaded"
                );

                ContextSnapshot {
                    current_competition: current,
                    assigned_competitions: competitions,
                    is_loading: false,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(role = %role, error = %e, "Failed to fetch assigned competitions");
                ContextSnapshot {
                    error: Some(e.to_string()),
                    ..ContextSnapshot::default()
                }
            }
        };

        self.finish_initialize(role, snapshot);
    }

    /// Apply a finished initialization unless the role changed meanwhile.
    fn finish_initialize(&self, role: Role, snapshot: ContextSnapshot) {
        let mut state = self.write_state();
        if state.role != Some(role) {
            tracing::debug!(role = %role, "Discarding stale context load");
            return;
        }
        state.snapshot = snapshot;
    }

    /// Persist login credentials for `role` and load its context.
    pub async fn login(
        &self,
        role: Role,
        token: &str,
        user: &UserProfile,
    ) -> Result<(), SessionError> {
        self.store.save_login(role, token, user)?;
        tracing::info!(role = %role, user = %user.id, "Session stored");
        self.initialize(Some(role)).await;
        Ok(())
    }

    /// Switch to `competition_id` by obtaining a new token from the server.
    ///
    /// On failure neither the stored token nor the current competition
    /// changes; the error is recorded and returned. If the session is torn
    /// down while the request is outstanding, the issued token is dropped
    /// and `SessionEnded` is returned.
    pub async fn switch_competition(&self, competition_id: &str) -> Result<(), SessionError> {
        let (role, session, already_current) = {
            let state = self.read_state();
            let role = state.role.ok_or(SessionError::MissingRole)?;
            let already_current = state
                .snapshot
                .current_competition
                .as_ref()
                .is_some_and(|c| c.id == competition_id);
            (role, state.session, already_current)
        };

        let token = self
            .store
            .token(role)?
            .ok_or(SessionError::MissingToken(role))?;

        if already_current {
            tracing::debug!(role = %role, competition_id, "Competition already selected");
            return Ok(());
        }

        self.write_state().snapshot.is_loading = true;

        let response = self.client.set_competition(&token, competition_id).await;

        // Held across the store write so a concurrent logout either sees the
        // new token and removes it, or invalidates the session before it lands
        let mut state = self.write_state();
        if state.session != session || state.role != Some(role) {
            tracing::info!(
                role = %role,
                competition_id,
                "Session ended during switch, dropping new token"
            );
            return Err(SessionError::SessionEnded(role));
        }

        // The new token replaces the old one in a single write
        let result = response.and_then(|new_token| {
            self.store
                .set_token(role, &new_token)
                .map_err(SessionError::from)
        });

        if let Err(e) = result {
            tracing::warn!(role = %role, competition_id, error = %e, "Competition switch failed");
            state.snapshot.is_loading = false;
            state.snapshot.error = Some(e.to_string());
            return Err(e);
        }

        let competition = state
            .snapshot
            .assigned_competitions
            .iter()
            .find(|c| c.id == competition_id)
            .cloned();
        if competition.is_none() {
            tracing::warn!(
                role = %role,
                competition_id,
                "Switched to a competition missing from the local assignment list"
            );
        }
        state.snapshot.current_competition = competition.clone();
        state.snapshot.is_loading = false;
        state.snapshot.error = None;
        drop(state);

        tracing::info!(role = %role, competition_id, "Switched competition");

        self.publish(ContextEvent::CompetitionChanged {
            role,
            competition_id: competition_id.to_string(),
            competition,
        });
        Ok(())
    }

    /// Drop selection, assignments and error. The stored token is untouched.
    pub fn clear_context(&self) {
        let role = {
            let mut state = self.write_state();
            state.snapshot.current_competition = None;
            state.snapshot.assigned_competitions.clear();
            state.snapshot.error = None;
            state.role
        };
        self.publish(ContextEvent::Cleared { role });
    }

    /// Clear the context and forget the role (shell unmount).
    ///
    /// Any switch still in flight is abandoned.
    pub fn teardown(&self) {
        let role = {
            let mut state = self.write_state();
            let role = state.role;
            state.reset();
            role
        };
        self.publish(ContextEvent::Cleared { role });
    }

    /// Tear the context down and remove the active role's credentials.
    pub fn logout(&self) -> Result<(), SessionError> {
        let role = self.role();
        // Teardown first so an outstanding switch cannot store its token
        // after the credentials are gone
        self.teardown();
        if let Some(role) = role {
            self.store.clear_role(role)?;
            tracing::info!(role = %role, "Logged out");
        }
        Ok(())
    }
}
