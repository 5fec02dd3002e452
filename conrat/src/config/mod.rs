//! Configuration loading
//!
//! The schema lives in `conrat-core`; this module reads it from YAML,
//! expands environment references, validates it and freezes it in an `Arc`.

pub mod loader;
pub mod validation;

pub use conrat_core::config::*;
pub use loader::{
    ConfigLimits, ConfigLoader, DEFAULTS_ORIGIN, LoadResult, LoadWarning, LoaderOptions, discover,
};
pub use validation::{ValidationResult, Validator};
