//! Marker emission
//!
//! Markers are fire-and-forget: the session pushes each one to a
//! [`MarkerSink`] and never waits on, retries, or reacts to the outcome.
//! [`MarkerWriter`] is the only path markers take out of the controller.
//!
//! # Sinks
//!
//! - [`JsonlSink`] — newline-delimited JSON with sequence and timestamp
//! - [`ConsoleSink`] — `[MARKER]` lines on stderr
//! - [`MemorySink`] — shared in-memory log
//! - [`FanoutSink`] — several of the above at once

pub mod console;
pub mod fanout;
pub mod jsonl;
pub mod memory;

pub use console::ConsoleSink;
pub use fanout::FanoutSink;
pub use jsonl::JsonlSink;
pub use memory::MemorySink;

use conrat_core::{Marker, MarkerLabel, ParticipantId};

use crate::error::MarkerError;
use crate::observability::metrics;

/// Destination for marker text.
pub trait MarkerSink: Send {
    /// Delivers one marker.
    ///
    /// # Errors
    ///
    /// Returns a [`MarkerError`] if the marker could not be delivered. The
    /// caller logs it and moves on.
    fn push(&mut self, marker: &Marker) -> Result<(), MarkerError>;
}

/// Builds `Player<ID>_<Label>` markers and hands them to a sink.
pub struct MarkerWriter {
    sink: Box<dyn MarkerSink>,
    participant: Option<ParticipantId>,
    emitted: u64,
    failed: u64,
}

impl std::fmt::Debug for MarkerWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerWriter")
            .field("participant", &self.participant)
            .field("emitted", &self.emitted)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl MarkerWriter {
    /// Creates a writer with no participant yet.
    #[must_use]
    pub fn new(sink: Box<dyn MarkerSink>) -> Self {
        Self {
            sink,
            participant: None,
            emitted: 0,
            failed: 0,
        }
    }

    /// Sets the participant used in every later marker's prefix.
    pub fn set_participant(&mut self, id: ParticipantId) {
        self.participant = Some(id);
    }

    /// Emits one marker.
    ///
    /// A sink failure is logged and counted; it never reaches the caller.
    pub fn emit(&mut self, label: MarkerLabel) {
        let marker = Marker::new(self.participant.as_ref(), &label);
        tracing::info!(marker = %marker, kind = label.kind(), "marker");
        metrics::record_marker(label.kind());
        self.emitted += 1;

        if let Err(e) = self.sink.push(&marker) {
            self.failed += 1;
            metrics::record_marker_failure();
            tracing::warn!(marker = %marker, error = %e, "marker sink rejected marker");
        }
    }

    /// Markers emitted so far, delivered or not.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Markers the sink failed to accept.
    #[must_use]
    pub const fn failed(&self) -> u64 {
        self.failed
    }
}
