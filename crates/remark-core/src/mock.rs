//! In-memory landmark backend for deterministic testing and offline use.
//!
//! Behaves like the hosted store: ids are assigned on create, geo queries
//! come back nearest first (optionally within a radius), plain queries are
//! ordered by note text, and every query is capped at its limit.
//!
//! ## Usage
//!
//! ```rust
//! use remark_core::mock::MockLandmarkBackend;
//! use remark_core::{Coordinates, Error, LandmarkBackend, NewLandmark};
//!
//! # tokio_test_block(async {
//! let backend = MockLandmarkBackend::new();
//! backend.fail_next(Error::NetworkUnavailable("offline".into()));
//! let result = backend
//!     .create(NewLandmark {
//!         author: "alice".into(),
//!         note: "Nice view".into(),
//!         coordinates: Coordinates { latitude: 0.0, longitude: 0.0 },
//!     })
//!     .await;
//! assert!(result.is_err());
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::distance::great_circle_km;
use crate::error::{Error, Result};
use crate::models::{LandmarkQuery, LandmarkRecord, NewLandmark, UserSession};
use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::traits::{AuthService, LandmarkBackend};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Query(LandmarkQuery),
    Create(NewLandmark),
    FindById(String),
    Save(String),
    Delete(String),
}

#[derive(Default)]
struct MockState {
    records: Vec<LandmarkRecord>,
    failures: VecDeque<Error>,
    calls: Vec<MockCall>,
}

/// Mock landmark backend for testing.
#[derive(Clone, Default)]
pub struct MockLandmarkBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockLandmarkBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-loaded with records.
    pub fn with_records(records: Vec<LandmarkRecord>) -> Self {
        let backend = Self::new();
        backend.lock().records = records;
        backend
    }

    /// Insert a record as-is, duplicates included.
    ///
    /// Lets tests simulate a store that returns several rows for one id.
    pub fn insert_raw(&self, record: LandmarkRecord) {
        self.lock().records.push(record);
    }

    /// Make the next backend call fail with `error`. Queued failures are
    /// consumed in order, one per call.
    pub fn fail_next(&self, error: Error) {
        self.lock().failures.push_back(error);
    }

    /// All records currently stored, in insertion order.
    pub fn records(&self) -> Vec<LandmarkRecord> {
        self.lock().records.clone()
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self, call: MockCall) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl LandmarkBackend for MockLandmarkBackend {
    async fn query(&self, query: &LandmarkQuery) -> Result<Vec<LandmarkRecord>> {
        let state = self.begin(MockCall::Query(query.clone()))?;
        let limit = usize::try_from(query.limit.max(0)).unwrap_or(usize::MAX);

        let results = match query.near {
            Some(near) => {
                let mut scored: Vec<(f64, &LandmarkRecord)> = state
                    .records
                    .iter()
                    .map(|r| (great_circle_km(&near.origin, &r.coordinates), r))
                    .filter(|(d, _)| near.within_km.map_or(true, |max| *d <= max))
                    .collect();
                scored.sort_by(|a, b| a.0.total_cmp(&b.0));
                scored
                    .into_iter()
                    .take(limit)
                    .map(|(_, r)| r.clone())
                    .collect()
            }
            None => {
                let mut sorted = state.records.clone();
                sorted.sort_by(|a, b| {
                    a.note.cmp(&b.note).then_with(|| a.id.cmp(&b.id))
                });
                sorted.truncate(limit);
                sorted
            }
        };
        Ok(results)
    }

    async fn create(&self, landmark: NewLandmark) -> Result<LandmarkRecord> {
        let mut state = self.begin(MockCall::Create(landmark.clone()))?;
        let record = LandmarkRecord {
            id: Uuid::now_v7().to_string(),
            coordinates: landmark.coordinates,
            note: landmark.note,
            author: landmark.author,
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Vec<LandmarkRecord>> {
        let state = self.begin(MockCall::FindById(id.to_string()))?;
        Ok(state
            .records
            .iter()
            .filter(|r| r.id == id)
            .cloned()
            .collect())
    }

    async fn save(&self, record: &LandmarkRecord) -> Result<LandmarkRecord> {
        let mut state = self.begin(MockCall::Save(record.id.clone()))?;
        let stored = state
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| Error::RecordNotFound(record.id.clone()))?;
        stored.note = record.note.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, record: &LandmarkRecord) -> Result<()> {
        let mut state = self.begin(MockCall::Delete(record.id.clone()))?;
        let before = state.records.len();
        state.records.retain(|r| r.id != record.id);
        if state.records.len() == before {
            return Err(Error::RecordNotFound(record.id.clone()));
        }
        Ok(())
    }
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Default)]
struct MockAccounts {
    // username -> (user id, PHC password hash)
    users: HashMap<String, (String, String)>,
    failures: VecDeque<Error>,
}

/// In-memory user directory. Passwords are kept as Argon2id PHC hashes.
#[derive(Clone, Default)]
pub struct MockAuthService {
    accounts: Arc<Mutex<MockAccounts>>,
}

impl MockAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory pre-loaded with `(username, password hash)` pairs,
    /// as returned by [`accounts`](Self::accounts).
    pub fn with_accounts(accounts: impl IntoIterator<Item = (String, String)>) -> Self {
        let auth = Self::new();
        {
            let mut state = auth.lock();
            for (username, password_hash) in accounts {
                state
                    .users
                    .insert(username, (Uuid::now_v7().to_string(), password_hash));
            }
        }
        auth
    }

    /// All registered `(username, password hash)` pairs, sorted by username.
    pub fn accounts(&self) -> Vec<(String, String)> {
        let mut accounts: Vec<(String, String)> = self
            .lock()
            .users
            .iter()
            .map(|(username, (_, password_hash))| (username.clone(), password_hash.clone()))
            .collect();
        accounts.sort();
        accounts
    }

    /// Make the next auth call fail with `error`.
    pub fn fail_next(&self, error: Error) {
        self.lock().failures.push_back(error);
    }

    fn lock(&self) -> MutexGuard<'_, MockAccounts> {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> Result<MutexGuard<'_, MockAccounts>> {
        let mut accounts = self.lock();
        match accounts.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(accounts),
        }
    }
}

fn open_session(user_id: &str, username: &str) -> UserSession {
    UserSession {
        user_id: user_id.to_string(),
        username: username.to_string(),
        logged_in_at: chrono::Utc::now(),
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn sign_up(&self, username: &str, password: &str) -> Result<UserSession> {
        {
            let accounts = self.begin()?;
            if accounts.users.contains_key(username) {
                return Err(Error::UsernameTaken(username.to_string()));
            }
        }
        let password_hash = hash_password_blocking(password).await?;

        let mut accounts = self.lock();
        if accounts.users.contains_key(username) {
            return Err(Error::UsernameTaken(username.to_string()));
        }
        let user_id = Uuid::now_v7().to_string();
        accounts
            .users
            .insert(username.to_string(), (user_id.clone(), password_hash));
        Ok(open_session(&user_id, username))
    }

    async fn log_in(&self, username: &str, password: &str) -> Result<UserSession> {
        let account = {
            let accounts = self.begin()?;
            accounts.users.get(username).cloned()
        };
        let Some((user_id, stored)) = account else {
            return Err(Error::InvalidCredentials);
        };
        if !verify_password_blocking(password, &stored).await? {
            return Err(Error::InvalidCredentials);
        }
        Ok(open_session(&user_id, username))
    }

    async fn log_out(&self, _session: &UserSession) -> Result<()> {
        self.begin().map(|_| ())
    }
}
