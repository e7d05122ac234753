//! Persisted client preferences.
//!
//! [`FileSettingsStore`] keeps a flat JSON object of string values on disk.
//! Writes go to a sibling temp file that is renamed over the target, so a
//! crash never leaves a half-written file behind. A missing file reads as an
//! empty store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::boundary::BoundaryPreference;
use crate::defaults::{SETTINGS_KEY_BOUNDARY, SETTINGS_KEY_SESSION};
use crate::error::{Error, Result};
use crate::models::UserSession;
use crate::traits::SettingsStore;

type SettingsMap = BTreeMap<String, String>;

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON file backed [`SettingsStore`].
pub struct FileSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<SettingsMap> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(SettingsMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                Error::Config(format!(
                    "settings file {} is not a JSON object of strings: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SettingsMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_map(&self, map: &SettingsMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(
            subsystem = "settings",
            component = "file_store",
            path = %self.path.display(),
            keys = map.len(),
            "Settings written"
        );
        Ok(())
    }

    async fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut SettingsMap) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        f(&mut map);
        self.write_map(&map).await
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.update(|map| {
            map.remove(key);
        })
        .await
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory [`SettingsStore`] for tests and offline runs.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<SettingsMap>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}

// =============================================================================
// TYPED HELPERS
// =============================================================================

/// Stored boundary preference, falling back to the default.
///
/// An unreadable stored value is logged and ignored.
pub async fn load_boundary(store: &dyn SettingsStore) -> Result<BoundaryPreference> {
    let Some(raw) = store.get(SETTINGS_KEY_BOUNDARY).await? else {
        return Ok(BoundaryPreference::default());
    };
    match raw.parse() {
        Ok(boundary) => Ok(boundary),
        Err(e) => {
            warn!(
                subsystem = "settings",
                op = "load_boundary",
                value = %raw,
                error = %e,
                "Ignoring stored boundary preference"
            );
            Ok(BoundaryPreference::default())
        }
    }
}

pub async fn save_boundary(store: &dyn SettingsStore, boundary: BoundaryPreference) -> Result<()> {
    store.set(SETTINGS_KEY_BOUNDARY, boundary.as_str()).await
}

/// The remembered session, if any.
///
/// A stored value that does not parse is logged and treated as logged out.
pub async fn load_session(store: &dyn SettingsStore) -> Result<Option<UserSession>> {
    let Some(raw) = store.get(SETTINGS_KEY_SESSION).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(session) => Ok(Some(session)),
        Err(e) => {
            warn!(
                subsystem = "settings",
                op = "load_session",
                error = %e,
                "Ignoring unreadable stored session"
            );
            Ok(None)
        }
    }
}

pub async fn save_session(store: &dyn SettingsStore, session: &UserSession) -> Result<()> {
    let raw = serde_json::to_string(session)?;
    store.set(SETTINGS_KEY_SESSION, &raw).await
}

pub async fn clear_session(store: &dyn SettingsStore) -> Result<()> {
    store.remove(SETTINGS_KEY_SESSION).await
}
