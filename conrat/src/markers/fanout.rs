//! Several sinks behind one.

use conrat_core::Marker;

use super::MarkerSink;
use crate::error::MarkerError;

/// Pushes every marker to each inner sink in order.
///
/// A failing sink does not stop delivery to the rest; the first error is
/// returned after all sinks were tried.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn MarkerSink>>,
}

impl std::fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl FanoutSink {
    /// Creates an empty fan-out (accepts and drops everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with(mut self, sink: Box<dyn MarkerSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of inner sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether there are no inner sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl MarkerSink for FanoutSink {
    fn push(&mut self, marker: &Marker) -> Result<(), MarkerError> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.push(marker) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use conrat_core::MarkerLabel;

    use super::*;
    use crate::markers::MemorySink;

    struct Refuses;

    impl MarkerSink for Refuses {
        fn push(&mut self, _marker: &Marker) -> Result<(), MarkerError> {
            Err(MarkerError::Poisoned)
        }
    }

    #[test]
    fn failing_sink_does_not_starve_others() {
        let memory = MemorySink::new();
        let mut fanout = FanoutSink::new()
            .with(Box::new(Refuses))
            .with(Box::new(memory.clone()));

        let result = fanout.push(&Marker::new(None, &MarkerLabel::SessionStart));
        assert!(matches!(result, Err(MarkerError::Poisoned)));
        assert_eq!(memory.texts(), vec!["PlayerNA_Session_Start"]);
        assert_eq!(fanout.len(), 2);
    }

    #[test]
    fn empty_fanout_accepts() {
        let mut fanout = FanoutSink::new();
        assert!(fanout.is_empty());
        assert!(fanout.push(&Marker::new(None, &MarkerLabel::PostSurveyEnd)).is_ok());
    }
}
