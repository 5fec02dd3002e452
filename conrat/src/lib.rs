//! `conrat` - Phase controller for timed Connections + RAT experiments
//!
//! Drives a participant through Connections puzzles with rated rests,
//! Remote Associates Test items and a questionnaire, emitting one
//! `Player<ID>_<Label>` marker per phase boundary for ERP alignment.

pub mod cli;
pub mod config;
pub mod error;
pub mod experiment;
pub mod frontend;
pub mod markers;
pub mod observability;
pub mod puzzles;
pub mod runtime;
pub mod timer;
