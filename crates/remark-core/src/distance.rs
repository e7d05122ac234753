//! Great-circle distance and the human-readable distance hint shown next to
//! each landmark.

use tracing::debug;

use crate::defaults::{EARTH_RADIUS_KM, HINT_CLOSE_M, HINT_HERE_M, HINT_NEAR_M};
use crate::models::Coordinates;

/// Haversine distance between two points in kilometres.
pub fn great_circle_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Format a distance in kilometres as a short hint such as `"1.24 km away"`.
///
/// Below 50 m the value is bucketed; under 1 km it is shown in metres with
/// one decimal; otherwise in kilometres with two decimals. Rounding is half
/// away from zero and trailing zeros are dropped (`500 m`, `2.5 km`).
/// The unit is picked before rounding, so a distance just short of 1 km
/// reads `"1000 m away"`.
///
/// Negative or non-finite input is clamped to zero.
///
/// # Example
/// ```
/// use remark_core::distance::format_distance_hint;
///
/// assert_eq!(format_distance_hint(0.004), "just here");
/// assert_eq!(format_distance_hint(1.236), "1.24 km away");
/// ```
pub fn format_distance_hint(distance_km: f64) -> String {
    let km = if distance_km.is_finite() && distance_km > 0.0 {
        distance_km
    } else {
        if distance_km != 0.0 {
            debug!(
                subsystem = "pipeline",
                component = "distance",
                distance_km,
                "Clamping invalid distance to zero"
            );
        }
        0.0
    };

    let metres = km * 1000.0;
    if metres <= HINT_HERE_M {
        "just here".to_string()
    } else if metres <= HINT_NEAR_M {
        "less than 20 m away".to_string()
    } else if metres <= HINT_CLOSE_M {
        "less than 50 m away".to_string()
    } else if km < 1.0 {
        format!("{} m away", round_to(metres, 1))
    } else {
        format!("{} km away", round_to(km, 2))
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
