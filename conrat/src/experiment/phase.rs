//! Phase tags
//!
//! A [`Phase`] names the screen the session is on. It is `Copy` so timers can
//! carry the tag of the phase that started them, and the controller compares
//! that tag against the live phase before acting on an expiry.

use std::fmt;

/// Which instruction screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    /// Before the first Connections puzzle
    Connections,
    /// Before the first RAT item
    Rat,
}

/// The current position in the fixed session sequence.
///
/// Indices are 1-based, matching the marker vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Participant ID entry
    ParticipantId,
    /// Welcome screen
    Intro,
    /// Task instructions
    Instructions(InstructionKind),
    /// Puzzle grid for block `i` (including the solved-group display)
    ConnectionsPuzzle(u32),
    /// Rest + spontaneity rating after block `i`
    ConnectionsRest(u32),
    /// RAT item `i`, cue words shown
    RatThink(u32),
    /// RAT item `i`, answer revealed, waiting for Yes/No
    RatReveal(u32),
    /// Rest after RAT item `i`
    RatRest(u32),
    /// End-of-tasks screen
    Congratulations,
    /// Questionnaire item `i`
    Questionnaire(u32),
    /// Thank-you screen awaiting acknowledgment
    Exit,
    /// Session over; no further input is accepted
    Finished,
}

impl Phase {
    /// Fixed name of the phase kind, used for log fields and metric labels.
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::ParticipantId => "participant_id",
            Self::Intro => "intro",
            Self::Instructions(InstructionKind::Connections) => "connections_instructions",
            Self::Instructions(InstructionKind::Rat) => "rat_instructions",
            Self::ConnectionsPuzzle(_) => "connections_puzzle",
            Self::ConnectionsRest(_) => "connections_rest",
            Self::RatThink(_) => "rat_think",
            Self::RatReveal(_) => "rat_reveal",
            Self::RatRest(_) => "rat_rest",
            Self::Congratulations => "congratulations",
            Self::Questionnaire(_) => "questionnaire",
            Self::Exit => "exit",
            Self::Finished => "finished",
        }
    }

    /// Returns `true` once the session can accept no more input.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionsPuzzle(i)
            | Self::ConnectionsRest(i)
            | Self::RatThink(i)
            | Self::RatReveal(i)
            | Self::RatRest(i)
            | Self::Questionnaire(i) => write!(f, "{}[{i}]", self.kind()),
            _ => f.write_str(self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_index() {
        assert_eq!(Phase::RatReveal(3).to_string(), "rat_reveal[3]");
        assert_eq!(Phase::Intro.to_string(), "intro");
    }

    #[test]
    fn same_kind_different_index_are_distinct_tags() {
        assert_ne!(Phase::ConnectionsRest(1), Phase::ConnectionsRest(2));
        assert_eq!(Phase::ConnectionsRest(2).kind(), Phase::ConnectionsRest(1).kind());
    }
}
