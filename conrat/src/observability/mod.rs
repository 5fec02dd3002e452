//! Observability
//!
//! Diagnostic logging and counters for a running session. Markers are the
//! experiment's output and live in [`crate::markers`]; this module only covers
//! what operators watch while a session runs.

pub mod logging;
pub mod metrics;

pub use logging::{LogFormat, init_logging};
pub use metrics::init_metrics;
