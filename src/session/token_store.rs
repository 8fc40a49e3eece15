// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role-scoped persisted credentials.
//!
//! Each role keeps its own `<role>_token` and `<role>_user` entries so that
//! several roles' sessions can coexist on one client. Values are plain
//! strings; nothing is encrypted and expiry is not checked here.

use crate::models::{Role, UserProfile};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Token store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt store file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value persistence for session credentials.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key` in a single step.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    fn token(&self, role: Role) -> Result<Option<String>, StoreError> {
        self.get(&role.token_key())
    }

    fn set_token(&self, role: Role, token: &str) -> Result<(), StoreError> {
        self.set(&role.token_key(), token)
    }

    /// Cached profile for the role. An unreadable entry counts as absent.
    fn cached_user(&self, role: Role) -> Result<Option<UserProfile>, StoreError> {
        let Some(raw) = self.get(&role.user_key())? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(role = %role, error = %e, "Ignoring unreadable cached user");
                Ok(None)
            }
        }
    }

    /// Persist the credentials handed out at login.
    fn save_login(&self, role: Role, token: &str, user: &UserProfile) -> Result<(), StoreError> {
        let user_json = serde_json::to_string(user).map_err(|source| StoreError::Corrupt {
            path: PathBuf::from(role.user_key()),
            source,
        })?;
        self.set(&role.user_key(), &user_json)?;
        self.set_token(role, token)
    }

    /// Forget both the token and the cached user of a role.
    fn clear_role(&self, role: Role) -> Result<(), StoreError> {
        self.remove(&role.token_key())?;
        self.remove(&role.user_key())
    }
}

/// Process-local store, mainly for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: DashMap<String, String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Writes hold an exclusive lock on a sibling `<file>.lock` for the whole
/// read-modify-write, so any number of instances and processes sharing the
/// file keep each other's keys. The file itself is replaced by renaming a
/// uniquely named temp file, so readers never see a partial write.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        Self {
            path,
            lock_path: lock_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(self.io_err(source)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(self.dir()).map_err(|e| self.io_err(e))?;
        tmp.write_all(json.as_bytes()).map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StoreError> {
        std::fs::create_dir_all(self.dir()).map_err(|e| self.io_err(e))?;

        let lock_err = |source| StoreError::Io {
            path: self.lock_path.clone(),
            source,
        };
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(lock_err)?;
        // Released when `lock` is closed
        lock.lock().map_err(lock_err)?;

        let mut entries = self.load()?;
        apply(&mut entries);
        self.save(&entries)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
