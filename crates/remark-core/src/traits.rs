//! Core traits for LandmarkRemark abstractions.
//!
//! These traits describe the external collaborators the pipeline talks to:
//! the hosted landmark store, the user directory, and the local key-value
//! settings. Concrete implementations live in `remark-db` (PostgreSQL) and in
//! [`crate::mock`] / [`crate::settings`].

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{LandmarkQuery, LandmarkRecord, NewLandmark, UserSession};

// =============================================================================
// LANDMARK BACKEND
// =============================================================================

/// Remote store of landmark records.
#[async_trait]
pub trait LandmarkBackend: Send + Sync {
    /// Run a query. With `near` set results are nearest first (optionally
    /// limited to a radius); otherwise ordered by note text ascending.
    async fn query(&self, query: &LandmarkQuery) -> Result<Vec<LandmarkRecord>>;

    /// Store a new landmark and return it with its backend-assigned id.
    async fn create(&self, landmark: NewLandmark) -> Result<LandmarkRecord>;

    /// All records whose id equals `id`.
    ///
    /// Normally zero or one; more than one is a backend integrity fault that
    /// callers must treat as a failed lookup.
    async fn find_by_id(&self, id: &str) -> Result<Vec<LandmarkRecord>>;

    /// Persist the mutable fields of an existing record.
    async fn save(&self, record: &LandmarkRecord) -> Result<LandmarkRecord>;

    /// Remove an existing record.
    async fn delete(&self, record: &LandmarkRecord) -> Result<()>;
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// User registration and login against the backend.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user.
    async fn sign_up(&self, username: &str, password: &str) -> Result<UserSession>;

    /// Check credentials and open a session.
    async fn log_in(&self, username: &str, password: &str) -> Result<UserSession>;

    /// Close a session.
    async fn log_out(&self, session: &UserSession) -> Result<()>;
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Small persisted key-value store for client preferences.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}
