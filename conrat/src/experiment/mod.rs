//! Experiment phase controller
//!
//! A session is a fixed sequence of screens driven by one
//! [`SessionController`]. The controller owns exactly one active stage at a
//! time; each timed sub-machine is a plain struct that reports back through a
//! step value instead of a callback, so the controller alone decides what
//! comes next.
//!
//! # Architecture
//!
//! - [`ConnectionsBlock`] — one 16-tile puzzle, ended by the first correct group
//! - [`RatingPrompt`] — post-puzzle rest with a first-choice-wins 1..5 rating
//! - [`RatTask`] — all RAT items, each think → reveal → Yes/No → rest
//! - [`Questionnaire`] — sequential 1..5 items with skip-to-`NoResponse`
//! - [`SkipRoute`] — where a master skip goes for the active stage
//!
//! Engines receive a [`PhaseContext`] for every operation: the marker writer,
//! the scheduler and the session record, borrowed from the controller for the
//! duration of one event.

pub mod connections;
pub mod controller;
pub mod phase;
pub mod questionnaire;
pub mod rat;
pub mod rating;
pub mod session;
pub mod skip;

pub use connections::{BlockStep, ConnectionsBlock, GuessFeedback, Tile};
pub use controller::{InputEvent, MessageScreen, SessionController, Stage};
pub use phase::{InstructionKind, Phase};
pub use questionnaire::{Questionnaire, QuestionnaireStep};
pub use rat::{RatStage, RatStep, RatTask};
pub use rating::{RatingPrompt, RestStep, WriteOnce};
pub use session::Session;
pub use skip::SkipRoute;

use crate::markers::MarkerWriter;
use crate::timer::Scheduler;

/// What an engine may touch while handling one event.
pub struct PhaseContext<'a> {
    /// Marker output
    pub markers: &'a mut MarkerWriter,
    /// Timer scheduling
    pub scheduler: &'a mut dyn Scheduler,
    /// Session record
    pub session: &'a mut Session,
}
