//! Landmark domain types.
//!
//! A [`LandmarkRecord`] is what the backend stores and returns. An
//! [`Annotation`] is the client-side view of one record: the same fields plus
//! the ownership scope and the distance hint, both captured when the
//! annotation is built.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::distance::{format_distance_hint, great_circle_km};
use crate::error::{Error, Result};

// =============================================================================
// COORDINATES
// =============================================================================

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees (positive = North, negative = South)
    pub latitude: f64,

    /// Longitude in decimal degrees (positive = East, negative = West)
    pub longitude: f64,
}

impl Coordinates {
    /// Build a coordinate pair, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidInput(format!(
                "latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidInput(format!(
                "longitude {} outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        great_circle_km(self, other)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// One landmark as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecord {
    /// Opaque backend-assigned identifier.
    pub id: String,
    pub coordinates: Coordinates,
    pub note: String,
    /// Username of the creator.
    pub author: String,
}

/// Request for creating a new landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLandmark {
    pub author: String,
    pub note: String,
    pub coordinates: Coordinates,
}

/// Geo-proximity part of a landmark query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearPoint {
    /// Reference point; results come back nearest first.
    pub origin: Coordinates,
    /// Search radius in kilometres. `None` searches the whole planet.
    pub within_km: Option<f64>,
}

/// Query sent to the backend.
///
/// With `near` set the backend orders by distance from the origin; without
/// it results are ordered by note text ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkQuery {
    pub near: Option<NearPoint>,
    pub limit: i64,
}

// =============================================================================
// ANNOTATIONS
// =============================================================================

/// Whether a landmark belongs to the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnershipScope {
    Mine,
    Others,
}

impl OwnershipScope {
    /// Scope of a landmark written by `author` as seen by `current_user`.
    pub fn of(author: &str, current_user: &str) -> Self {
        if author == current_user {
            OwnershipScope::Mine
        } else {
            OwnershipScope::Others
        }
    }
}

/// Client-side view of one landmark.
///
/// `scope` and `distance_hint` are snapshots taken at construction. A change
/// of user or device location requires rebuilding the annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub coordinates: Coordinates,
    pub note: String,
    pub author: String,
    pub scope: OwnershipScope,
    /// Present only when a reference location was known at build time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_hint: Option<String>,
}

impl Annotation {
    /// Build an annotation for `current_user`, measuring from `reference` when known.
    pub fn from_record(
        record: LandmarkRecord,
        current_user: &str,
        reference: Option<Coordinates>,
    ) -> Self {
        let distance_hint = reference
            .map(|origin| format_distance_hint(great_circle_km(&origin, &record.coordinates)));
        Self {
            scope: OwnershipScope::of(&record.author, current_user),
            id: record.id,
            coordinates: record.coordinates,
            note: record.note,
            author: record.author,
            distance_hint,
        }
    }
}

/// Scope selector used by the search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScopeFilter {
    #[default]
    All,
    Mine,
    Others,
}

impl ScopeFilter {
    pub fn matches(&self, scope: OwnershipScope) -> bool {
        match self {
            ScopeFilter::All => true,
            ScopeFilter::Mine => scope == OwnershipScope::Mine,
            ScopeFilter::Others => scope == OwnershipScope::Others,
        }
    }
}

impl FromStr for ScopeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ScopeFilter::All),
            "mine" => Ok(ScopeFilter::Mine),
            "others" => Ok(ScopeFilter::Others),
            other => Err(Error::InvalidInput(format!(
                "unknown scope '{}', expected All, Mine or Others",
                other
            ))),
        }
    }
}

impl fmt::Display for ScopeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScopeFilter::All => "All",
            ScopeFilter::Mine => "Mine",
            ScopeFilter::Others => "Others",
        };
        f.write_str(s)
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// A logged-in user as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub username: String,
    pub logged_in_at: chrono::DateTime<chrono::Utc>,
}
