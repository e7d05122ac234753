//! # remark-core
//!
//! Core types, traits, and the landmark query pipeline for LandmarkRemark.
//!
//! This crate holds everything that does not touch a real backend: the
//! landmark and annotation model, distance hints, the search filter, the
//! pipeline that keeps the in-memory list, input validation, user-facing
//! messages, and local settings. `remark-db` provides the PostgreSQL
//! implementations of the backend traits.

pub mod boundary;
pub mod defaults;
pub mod distance;
pub mod error;
pub mod events;
pub mod logging;
pub mod messages;
pub mod mock;
pub mod models;
pub mod password;
pub mod pipeline;
pub mod search;
pub mod settings;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use boundary::BoundaryPreference;
pub use distance::{format_distance_hint, great_circle_km};
pub use error::{Error, Result};
pub use events::{EventBus, ListEvent};
pub use messages::{Operation, UserMessage};
pub use models::*;
pub use pipeline::LandmarkPipeline;
pub use search::{condense_whitespace, filter_annotations, normalize_text};
pub use settings::{FileSettingsStore, MemorySettingsStore};
pub use traits::*;
pub use validation::{validate_note, validate_password, validate_username};
