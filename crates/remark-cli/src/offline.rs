//! File-backed store for `--offline` runs.
//!
//! The in-memory mock backend and auth service are seeded from a JSON
//! snapshot on start and written back when the command finishes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use remark_core::mock::{MockAuthService, MockLandmarkBackend};
use remark_core::LandmarkRecord;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    landmarks: Vec<LandmarkRecord>,
    /// username -> Argon2id PHC hash
    #[serde(default)]
    accounts: BTreeMap<String, String>,
}

pub struct OfflineStore {
    path: PathBuf,
    pub landmarks: MockLandmarkBackend,
    pub auth: MockAuthService,
}

impl OfflineStore {
    /// Load the snapshot at `path`. A missing file starts an empty store.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let snapshot = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes)
                .with_context(|| format!("offline store {} is corrupt", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read offline store {}", path.display()))
            }
        };
        debug!(
            subsystem = "cli",
            component = "offline",
            path = %path.display(),
            result_count = snapshot.landmarks.len(),
            "Offline store loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            landmarks: MockLandmarkBackend::with_records(snapshot.landmarks),
            auth: MockAuthService::with_accounts(snapshot.accounts),
        })
    }

    /// Write the current state back to disk.
    pub async fn persist(&self) -> anyhow::Result<()> {
        let snapshot = Snapshot {
            landmarks: self.landmarks.records(),
            accounts: self.auth.accounts().into_iter().collect(),
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&snapshot)?).await?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to write offline store {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remark_core::{AuthService, Coordinates, LandmarkBackend, NewLandmark};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = OfflineStore::load(&dir.path().join("offline.json"))
            .await
            .unwrap();
        assert!(store.landmarks.records().is_empty());
        assert!(store.auth.accounts().is_empty());
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("offline.json");

        let store = OfflineStore::load(&path).await.unwrap();
        store.auth.sign_up("alice", "secret").await.unwrap();
        let created = store
            .landmarks
            .create(NewLandmark {
                author: "alice".to_string(),
                note: "Lighthouse".to_string(),
                coordinates: Coordinates {
                    latitude: -33.86,
                    longitude: 151.21,
                },
            })
            .await
            .unwrap();
        store.persist().await.unwrap();

        let reloaded = OfflineStore::load(&path).await.unwrap();
        assert_eq!(reloaded.landmarks.records(), vec![created]);
        assert!(reloaded.auth.log_in("alice", "secret").await.is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_keeps_only_password_hashes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("offline.json");

        let store = OfflineStore::load(&path).await.unwrap();
        store.auth.sign_up("alice", "Hunter2.secret").await.unwrap();
        store.persist().await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("Hunter2.secret"));
        let snapshot: Snapshot = serde_json::from_str(&written).unwrap();
        assert!(snapshot.accounts["alice"].starts_with("$argon2id$"));

        let reloaded = OfflineStore::load(&path).await.unwrap();
        assert!(reloaded.auth.log_in("alice", "Hunter2.secret").await.is_ok());
        assert!(reloaded.auth.log_in("alice", "hunter2.secret").await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("offline.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(OfflineStore::load(&path).await.is_err());
    }
}
