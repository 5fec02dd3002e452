//! `conrat` Core — shared domain types
//!
//! This crate provides the marker vocabulary, the Connections puzzle
//! catalog, the experiment configuration schema and the error types
//! shared by the `conrat` controller and its tooling. It performs no I/O.

pub mod config;
pub mod error;
pub mod marker;
pub mod puzzle;

pub use config::ExperimentConfig;
pub use marker::{Marker, MarkerLabel, ParticipantId, Rating, RatingResponse, YesNo};
pub use puzzle::{PuzzleCatalog, PuzzleGroup};
