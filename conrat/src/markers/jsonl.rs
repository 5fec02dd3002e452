//! JSONL marker log.
//!
//! One JSON object per line with a zero-based `sequence`, an RFC 3339 UTC
//! `timestamp` taken at push time, and the `marker` text. Each line is
//! flushed before `push` returns so an aborted session keeps everything
//! emitted up to that point.

use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use conrat_core::Marker;

use super::MarkerSink;
use crate::error::MarkerError;

#[derive(Debug, Serialize)]
struct MarkerRecord<'a> {
    sequence: u64,
    timestamp: DateTime<Utc>,
    marker: &'a Marker,
}

/// Buffered JSONL marker writer.
pub struct JsonlSink {
    writer: BufWriter<Box<dyn Write + Send>>,
    sequence: u64,
}

// Box<dyn Write> is not Debug
impl std::fmt::Debug for JsonlSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlSink")
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl JsonlSink {
    /// Creates a sink that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: BufWriter::new(writer),
            sequence: 0,
        }
    }

    /// Creates (truncating) a marker log at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, MarkerError> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Records written so far.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.sequence
    }
}

impl MarkerSink for JsonlSink {
    fn push(&mut self, marker: &Marker) -> Result<(), MarkerError> {
        let record = MarkerRecord {
            sequence: self.sequence,
            timestamp: Utc::now(),
            marker,
        };
        let line = serde_json::to_string(&record)?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        self.sequence += 1;
        Ok(())
    }
}
