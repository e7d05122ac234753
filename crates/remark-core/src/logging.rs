//! Structured logging schema and field name constants for LandmarkRemark.
//!
//! All crates use these names for structured `tracing` fields so log
//! output can be filtered by the same keys across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, operation failed and was reported to the caller |
//! | INFO  | Lifecycle events (startup, login), operation completions |
//! | DEBUG | Decision points (query shape, stale local list), intermediate values |
//! | TRACE | Per-record iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "pipeline", "db", "settings", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "landmarks", "users", "pool", "file_store"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "fetch_all", "create", "update", "delete", "log_in"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Landmark id being operated on.
pub const LANDMARK_ID: &str = "landmark_id";

/// Username the operation runs as.
pub const USERNAME: &str = "username";

/// Search query text.
pub const QUERY: &str = "query";

/// Selected boundary preference.
pub const BOUNDARY: &str = "boundary";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Search radius in kilometres (absent when unbounded).
pub const RADIUS_KM: &str = "radius_km";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
