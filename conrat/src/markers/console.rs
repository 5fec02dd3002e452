//! Console marker echo.

use std::io::Write;

use conrat_core::Marker;

use super::MarkerSink;
use crate::error::MarkerError;

/// Writes `[MARKER] <text>` lines, to stderr unless told otherwise.
pub struct ConsoleSink {
    out: Box<dyn Write + Send>,
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink").finish_non_exhaustive()
    }
}

impl ConsoleSink {
    /// Echoes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Echoes to an arbitrary writer.
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }
}

impl MarkerSink for ConsoleSink {
    fn push(&mut self, marker: &Marker) -> Result<(), MarkerError> {
        writeln!(self.out, "[MARKER] {marker}")?;
        Ok(())
    }
}
