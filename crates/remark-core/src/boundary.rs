//! Search-radius preference chosen by the user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How far from the device the landmark query reaches.
///
/// Only the next fetch is affected by a change; the current list is not
/// refiltered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPreference {
    OneKm,
    TenKm,
    HundredKm,
    /// No radius: the whole planet, nearest first.
    #[default]
    Unbounded,
}

impl BoundaryPreference {
    pub const ALL: [BoundaryPreference; 4] = [
        BoundaryPreference::OneKm,
        BoundaryPreference::TenKm,
        BoundaryPreference::HundredKm,
        BoundaryPreference::Unbounded,
    ];

    /// Radius in kilometres, or `None` when unbounded.
    pub fn radius_km(&self) -> Option<f64> {
        match self {
            BoundaryPreference::OneKm => Some(1.0),
            BoundaryPreference::TenKm => Some(10.0),
            BoundaryPreference::HundredKm => Some(100.0),
            BoundaryPreference::Unbounded => None,
        }
    }

    /// Stable token used for persistence and the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryPreference::OneKm => "1km",
            BoundaryPreference::TenKm => "10km",
            BoundaryPreference::HundredKm => "100km",
            BoundaryPreference::Unbounded => "planet",
        }
    }
}

impl fmt::Display for BoundaryPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoundaryPreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim().to_lowercase();
        BoundaryPreference::ALL
            .into_iter()
            .find(|b| b.as_str() == token)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "unknown boundary '{}', expected one of 1km, 10km, 100km, planet",
                    s.trim()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        assert_eq!(BoundaryPreference::default(), BoundaryPreference::Unbounded);
        assert_eq!(BoundaryPreference::default().radius_km(), None);
    }

    #[test]
    fn test_radius_values() {
        assert_eq!(BoundaryPreference::OneKm.radius_km(), Some(1.0));
        assert_eq!(BoundaryPreference::TenKm.radius_km(), Some(10.0));
        assert_eq!(BoundaryPreference::HundredKm.radius_km(), Some(100.0));
    }

    #[test]
    fn test_parse_display_tokens() {
        for b in BoundaryPreference::ALL {
            assert_eq!(b.to_string().parse::<BoundaryPreference>().unwrap(), b);
        }
        assert_eq!(
            " Planet ".parse::<BoundaryPreference>().unwrap(),
            BoundaryPreference::Unbounded
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "5km".parse::<BoundaryPreference>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&BoundaryPreference::HundredKm).unwrap();
        assert_eq!(json, "\"hundred_km\"");
    }
}
