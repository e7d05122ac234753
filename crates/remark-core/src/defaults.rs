//! Centralized default constants for LandmarkRemark.
//!
//! Every crate references these constants instead of defining its own
//! magic numbers. Organized by domain area.

// =============================================================================
// QUERY
// =============================================================================

/// Maximum records requested per landmark query.
///
/// The hosted service caps a page at 1000 rows; the client stays below it.
pub const QUERY_LIMIT: i64 = 900;

/// Mean Earth radius in kilometres used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// DISTANCE HINTS
// =============================================================================

/// At or below this many metres a landmark is "just here".
pub const HINT_HERE_M: f64 = 5.0;

/// At or below this many metres a landmark is "less than 20 m away".
pub const HINT_NEAR_M: f64 = 20.0;

/// At or below this many metres a landmark is "less than 50 m away".
pub const HINT_CLOSE_M: f64 = 50.0;

// =============================================================================
// VALIDATION
// =============================================================================

/// Minimum trimmed, whitespace-condensed note length in characters.
pub const MIN_NOTE_CHARS: usize = 3;

/// Accepted usernames: leading letters followed by 2-15 letters, digits, `-`, `_` or `.`.
pub const USERNAME_PATTERN: &str = r"^[A-Za-z]+[A-Za-z0-9\-_.]{2,15}$";

/// Accepted passwords: 3-25 characters from a restricted printable set.
pub const PASSWORD_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_~-]{3,25}$";

// =============================================================================
// SETTINGS
// =============================================================================

/// Settings key holding the boundary preference.
pub const SETTINGS_KEY_BOUNDARY: &str = "boundary";

/// Settings key holding the logged-in session.
pub const SETTINGS_KEY_SESSION: &str = "session";

/// Settings file name under the user's home directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Settings directory name under the user's home directory.
pub const SETTINGS_DIR_NAME: &str = ".remark";

/// Settings file used when no home directory is known.
pub const FALLBACK_SETTINGS_FILE: &str = "remark-settings.json";

/// Offline landmark store, kept next to the settings file.
pub const OFFLINE_FILE_NAME: &str = "offline.json";

// =============================================================================
// DATABASE
// =============================================================================

/// Default database URL when `DATABASE_URL` is not set.
pub const DATABASE_URL: &str = "postgres://localhost/remark";

// =============================================================================
// EVENTS
// =============================================================================

/// Default list event broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 64;
