//! Configuration schema
//!
//! Typed form of the experiment YAML file. Loading, environment
//! substitution and validation live in the `conrat` crate.

pub mod schema;

pub use schema::*;
