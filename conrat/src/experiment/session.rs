//! Session record.

use conrat_core::{ParticipantId, RatingResponse, YesNo};
use serde::Serialize;

/// What the session has collected so far.
///
/// Counters track completed units: a Connections block counts once its
/// puzzle ends, a RAT item once its rest ends, a question once it is
/// answered or skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Set on ID submission
    pub participant_id: Option<ParticipantId>,
    /// Connections blocks whose puzzle has ended
    pub connections_completed: u32,
    /// RAT items fully completed
    pub rat_index: u32,
    /// Questionnaire items answered or skipped
    pub questionnaire_index: u32,
    /// One terminal value per Connections rest, in block order
    pub spontaneity_ratings: Vec<RatingResponse>,
    /// One answer per RAT item, in item order
    pub rat_responses: Vec<YesNo>,
    /// One terminal value per questionnaire item
    pub questionnaire_responses: Vec<RatingResponse>,
}

impl Session {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the collected record at info level.
    pub fn log_summary(&self) {
        let participant = self
            .participant_id
            .as_ref()
            .map_or("NA", ParticipantId::as_str);
        let ratings = join(&self.spontaneity_ratings);
        let rat = self
            .rat_responses
            .iter()
            .map(|a| a.code())
            .collect::<Vec<_>>()
            .join(",");
        let questionnaire = join(&self.questionnaire_responses);

        tracing::info!(
            participant,
            connections_completed = self.connections_completed,
            spontaneity_ratings = %ratings,
            rat_items = self.rat_index,
            rat_responses = %rat,
            questionnaire_items = self.questionnaire_index,
            questionnaire_responses = %questionnaire,
            "session complete"
        );
    }
}

fn join(values: &[RatingResponse]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
