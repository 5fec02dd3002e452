//! Marker vocabulary
//!
//! Every phase boundary of a session is announced to the recording side as a
//! marker string of the form `Player<ID>_<Label>`. Downstream EEG analysis
//! matches these strings literally, so [`MarkerLabel`]'s `Display` output is
//! the wire format and must not change.
//!
//! All indices carried by labels are 1-based.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder used in the `Player<ID>` prefix before an ID is known.
pub const UNKNOWN_PARTICIPANT: &str = "NA";

// ============================================================================
// Participant
// ============================================================================

/// A non-empty, trimmed participant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Parses raw entry text into an ID.
    ///
    /// Surrounding whitespace is removed; blank input yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the ID text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A 1..=5 rating chosen by the participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest value on the scale.
    pub const MIN: u8 = 1;
    /// Highest value on the scale.
    pub const MAX: u8 = 5;

    /// Creates a rating, returning `None` outside `1..=5`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("rating {value} outside 1..=5"))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal value of a rating prompt: a rating, or the explicit absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingResponse {
    /// The participant chose a value
    Rated(Rating),
    /// The prompt closed without a choice (timeout or master skip)
    NoResponse,
}

impl RatingResponse {
    /// Returns the bound rating, if any.
    #[must_use]
    pub const fn rating(self) -> Option<Rating> {
        match self {
            Self::Rated(r) => Some(r),
            Self::NoResponse => None,
        }
    }
}

impl fmt::Display for RatingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rated(r) => write!(f, "{r}"),
            Self::NoResponse => f.write_str("NoResponse"),
        }
    }
}

/// Answer to "did you know the RAT answer before it was revealed?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum YesNo {
    /// Knew it
    Yes,
    /// Did not know it
    No,
}

impl YesNo {
    /// Single-letter code used in markers.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Yes => "Y",
            Self::No => "N",
        }
    }
}

// ============================================================================
// Labels
// ============================================================================

/// The closed set of events a session can announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerLabel {
    /// Participant ID submitted
    SessionStart,
    /// Puzzle grid shown
    ConnectionsStart {
        /// Block number
        block: u32,
    },
    /// A 4-tile selection was evaluated
    ConnectionsGuess {
        /// Block number
        block: u32,
        /// Guess number within the block
        guess: u32,
        /// Whether the four tiles shared a group
        correct: bool,
    },
    /// Puzzle solved
    ConnectionsEnd {
        /// Block number
        block: u32,
    },
    /// Post-puzzle rest began
    ConnectionsRestStart {
        /// Block number
        block: u32,
    },
    /// Post-puzzle rest ended
    ConnectionsRestEnd {
        /// Block number
        block: u32,
    },
    /// Spontaneity rating for a block (value or `NoResponse`)
    ConnectionRating {
        /// Block number
        block: u32,
        /// Bound value
        response: RatingResponse,
    },
    /// RAT cue words shown
    RatStart {
        /// Item number
        item: u32,
    },
    /// Yes/No recorded for a RAT item
    RatResponse {
        /// Item number
        item: u32,
        /// Recorded answer
        answer: YesNo,
    },
    /// RAT item closed
    RatEnd {
        /// Item number
        item: u32,
    },
    /// Post-item rest began
    RatRestStart {
        /// Item number
        item: u32,
    },
    /// Post-item rest ended
    RatRestEnd {
        /// Item number
        item: u32,
    },
    /// Questionnaire opened
    PostSurveyStart,
    /// Questionnaire closed
    PostSurveyEnd,
    /// Questionnaire answer (value or `NoResponse`)
    PostQuestion {
        /// Question number
        item: u32,
        /// Bound value
        response: RatingResponse,
    },
}

impl MarkerLabel {
    /// Fixed, low-cardinality name of the label kind (for metrics labels).
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SessionStart => "session_start",
            Self::ConnectionsStart { .. } => "connections_start",
            Self::ConnectionsGuess { .. } => "connections_guess",
            Self::ConnectionsEnd { .. } => "connections_end",
            Self::ConnectionsRestStart { .. } => "connections_rest_start",
            Self::ConnectionsRestEnd { .. } => "connections_rest_end",
            Self::ConnectionRating { .. } => "connection_rating",
            Self::RatStart { .. } => "rat_start",
            Self::RatResponse { .. } => "rat_response",
            Self::RatEnd { .. } => "rat_end",
            Self::RatRestStart { .. } => "rat_rest_start",
            Self::RatRestEnd { .. } => "rat_rest_end",
            Self::PostSurveyStart => "post_survey_start",
            Self::PostSurveyEnd => "post_survey_end",
            Self::PostQuestion { .. } => "post_question",
        }
    }
}

impl fmt::Display for MarkerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::SessionStart => f.write_str("Session_Start"),
            Self::ConnectionsStart { block } => write!(f, "Connections{block}_Start"),
            Self::ConnectionsGuess {
                block,
                guess,
                correct,
            } => {
                let outcome = if correct { "Correct" } else { "Incorrect" };
                write!(f, "Connections{block}_Guess{guess}_{outcome}")
            }
            Self::ConnectionsEnd { block } => write!(f, "Connections{block}_End"),
            Self::ConnectionsRestStart { block } => write!(f, "Connections{block}_Rest_Start"),
            Self::ConnectionsRestEnd { block } => write!(f, "Connections{block}_Rest_End"),
            Self::ConnectionRating { block, response } => {
                write!(f, "ConnectionQ{block}_{response}")
            }
            Self::RatStart { item } => write!(f, "RAT{item}_Start"),
            Self::RatResponse { item, answer } => write!(f, "RAT{item}_Response_{}", answer.code()),
            Self::RatEnd { item } => write!(f, "RAT{item}_End"),
            Self::RatRestStart { item } => write!(f, "RAT{item}_Rest_Start"),
            Self::RatRestEnd { item } => write!(f, "RAT{item}_Rest_End"),
            Self::PostSurveyStart => f.write_str("PostSurvey_Start"),
            Self::PostSurveyEnd => f.write_str("PostSurvey_End"),
            Self::PostQuestion { item, response } => write!(f, "PostQ{item}_{response}"),
        }
    }
}

// ============================================================================
// Marker
// ============================================================================

/// A fully qualified, immutable marker: `Player<ID>_<Label>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Marker(String);

impl Marker {
    /// Builds the marker text for `label`, prefixed with the participant.
    ///
    /// Uses [`UNKNOWN_PARTICIPANT`] when no ID has been captured yet.
    #[must_use]
    pub fn new(participant: Option<&ParticipantId>, label: &MarkerLabel) -> Self {
        let id = participant.map_or(UNKNOWN_PARTICIPANT, ParticipantId::as_str);
        Self(format!("Player{id}_{label}"))
    }

    /// Returns the marker text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
