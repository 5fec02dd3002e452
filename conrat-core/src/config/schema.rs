//! Configuration schema types
//!
//! Every field has a default, so an empty mapping (or no file at all)
//! describes the standard session: 15 Connections blocks, 10 RAT items and a
//! 5-item questionnaire with 10 s think and 15 s rest windows.

use serde::{Deserialize, Serialize};

/// Default number of Connections blocks (the loop bound of the session).
pub const DEFAULT_CONNECTIONS_BLOCKS: u32 = 15;

/// Default post-puzzle rest window in seconds.
pub const DEFAULT_REST_SECONDS: u32 = 15;

/// Default RAT think window in seconds.
pub const DEFAULT_THINK_SECONDS: u32 = 10;

/// Default time the solved group stays on screen before the rest begins.
pub const DEFAULT_SOLVED_DISPLAY_MS: u64 = 2500;

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration for one experiment session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Connections stage settings
    pub connections: ConnectionsConfig,

    /// Remote Associates Test stage settings
    pub rat: RatConfig,

    /// Post-task questionnaire settings
    pub questionnaire: QuestionnaireConfig,

    /// Seed for tile sampling and shuffling; OS entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

// ============================================================================
// Connections
// ============================================================================

/// Connections stage: N puzzle blocks, each followed by a rated rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionsConfig {
    /// Number of puzzle blocks
    pub blocks: u32,

    /// Rest window after each puzzle, in seconds
    pub rest_seconds: u32,

    /// How long the found group stays on screen, in milliseconds
    pub solved_display_ms: u64,
}

impl Default for ConnectionsConfig {
    fn default() -> Self {
        Self {
            blocks: DEFAULT_CONNECTIONS_BLOCKS,
            rest_seconds: DEFAULT_REST_SECONDS,
            solved_display_ms: DEFAULT_SOLVED_DISPLAY_MS,
        }
    }
}

// ============================================================================
// RAT
// ============================================================================

/// Remote Associates Test stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatConfig {
    /// Think window before the answer is revealed, in seconds
    pub think_seconds: u32,

    /// Rest window after each item, in seconds
    pub rest_seconds: u32,

    /// Items in presentation order
    pub items: Vec<RatItem>,
}

impl Default for RatConfig {
    fn default() -> Self {
        Self {
            think_seconds: DEFAULT_THINK_SECONDS,
            rest_seconds: DEFAULT_REST_SECONDS,
            items: default_rat_items(),
        }
    }
}

/// Three cue words and the word that links them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatItem {
    /// Cue words (exactly three after validation)
    pub cues: Vec<String>,

    /// The linking word
    pub answer: String,
}

impl RatItem {
    /// Creates an item from three cues and an answer.
    #[must_use]
    pub fn new(cues: [&str; 3], answer: &str) -> Self {
        Self {
            cues: cues.iter().map(ToString::to_string).collect(),
            answer: answer.to_string(),
        }
    }

    /// Cue words joined for display (`"cottage / swiss / cake"`).
    #[must_use]
    pub fn prompt(&self) -> String {
        self.cues.join(" / ")
    }
}

/// The standard ten-item set.
#[must_use]
pub fn default_rat_items() -> Vec<RatItem> {
    vec![
        RatItem::new(["cottage", "swiss", "cake"], "cheese"),
        RatItem::new(["cream", "skate", "water"], "ice"),
        RatItem::new(["rocking", "wheel", "high"], "chair"),
        RatItem::new(["show", "life", "row"], "boat"),
        RatItem::new(["fountain", "baking", "pop"], "soda"),
        RatItem::new(["duck", "fold", "dollar"], "bill"),
        RatItem::new(["sleeping", "bean", "trash"], "bag"),
        RatItem::new(["dew", "comb", "bee"], "honey"),
        RatItem::new(["night", "wrist", "stop"], "watch"),
        RatItem::new(["loser", "throat", "spot"], "sore"),
    ]
}

// ============================================================================
// Questionnaire
// ============================================================================

/// Post-task questionnaire: sequential 1..5 ratings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuestionnaireConfig {
    /// Question texts in presentation order
    pub questions: Vec<String>,
}

impl Default for QuestionnaireConfig {
    fn default() -> Self {
        Self {
            questions: (1..=5).map(|i| format!("Follow-up question {i}")).collect(),
        }
    }
}
