//! Master skip routing.
//!
//! The experimenter's skip key means "move on" everywhere. Which sub-machine
//! it reaches depends only on the active stage, so routing is a pure function
//! of [`Stage`] and exactly one route applies at a time.

use super::Stage;

/// Where a master skip goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipRoute {
    /// Advance a static message screen
    AdvanceMessage,
    /// Close the post-puzzle rest now (`NoResponse` if unrated)
    ResolveRatingRest,
    /// Treat the puzzle as finished and go to its rest, granting no match
    CompletePuzzle,
    /// Force the RAT item to its next stage
    AdvanceRat,
    /// Record `NoResponse` for the current question
    SkipQuestion,
    /// Nothing to skip (ID entry, or the session is over)
    Nothing,
}

impl SkipRoute {
    /// Picks the route for the active stage.
    #[must_use]
    pub const fn route(stage: &Stage) -> Self {
        match stage {
            Stage::Message(_) => Self::AdvanceMessage,
            Stage::Rest(_) => Self::ResolveRatingRest,
            Stage::Puzzle(_) => Self::CompletePuzzle,
            Stage::Rat(_) => Self::AdvanceRat,
            Stage::Questionnaire(_) => Self::SkipQuestion,
            Stage::ParticipantId | Stage::Finished => Self::Nothing,
        }
    }

    /// Metric label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AdvanceMessage => "advance_message",
            Self::ResolveRatingRest => "resolve_rating_rest",
            Self::CompletePuzzle => "complete_puzzle",
            Self::AdvanceRat => "advance_rat",
            Self::SkipQuestion => "skip_question",
            Self::Nothing => "nothing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::MessageScreen;

    #[test]
    fn static_stages_route_without_engines() {
        assert_eq!(SkipRoute::route(&Stage::ParticipantId), SkipRoute::Nothing);
        assert_eq!(SkipRoute::route(&Stage::Finished), SkipRoute::Nothing);
        assert_eq!(
            SkipRoute::route(&Stage::Message(MessageScreen::Farewell)),
            SkipRoute::AdvanceMessage
        );
    }
}
