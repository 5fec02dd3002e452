//! In-memory marker log.

use std::sync::{Arc, Mutex};

use conrat_core::Marker;

use super::MarkerSink;
use crate::error::MarkerError;

/// Collects markers in a shared vector.
///
/// Clones share the same log, so a caller can keep one handle and give the
/// other to the controller.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    log: Arc<Mutex<Vec<Marker>>>,
}

impl MemorySink {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out everything recorded so far.
    ///
    /// A poisoned lock still yields its contents.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Marker> {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Recorded marker texts, in order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl MarkerSink for MemorySink {
    fn push(&mut self, marker: &Marker) -> Result<(), MarkerError> {
        self.log
            .lock()
            .map_err(|_| MarkerError::Poisoned)?
            .push(marker.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use conrat_core::MarkerLabel;

    use super::*;

    #[test]
    fn clones_share_one_log() {
        let handle = MemorySink::new();
        let mut writer_side = handle.clone();
        writer_side
            .push(&Marker::new(None, &MarkerLabel::PostSurveyStart))
            .unwrap();
        assert_eq!(handle.texts(), vec!["PlayerNA_PostSurvey_Start"]);
    }
}
