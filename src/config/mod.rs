//! Experience configuration.
//!
//! Loading and validation of YAML experience files: phase schedules,
//! share link settings, and placeholder defaults.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
