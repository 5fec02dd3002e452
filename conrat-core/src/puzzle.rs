//! Connections puzzle catalog
//!
//! A catalog is the pool of category groups a puzzle is drawn from. Each
//! puzzle samples [`GROUPS_PER_PUZZLE`] groups and lays their members out as
//! a 16-tile grid, so the catalog must hold at least that many groups with
//! distinct labels.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;

/// Groups drawn for a single puzzle.
pub const GROUPS_PER_PUZZLE: usize = 4;

/// Members per group (and tiles per correct selection).
pub const MEMBERS_PER_GROUP: usize = 4;

/// One category and its four members, as stored in the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleGroup {
    /// Category label shown when the group is found
    #[serde(rename = "group")]
    pub label: String,
    /// Member words
    pub members: Vec<String>,
}

impl PuzzleGroup {
    /// Convenience constructor.
    #[must_use]
    pub fn new(label: impl Into<String>, members: [&str; MEMBERS_PER_GROUP]) -> Self {
        Self {
            label: label.into(),
            members: members.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A validated, de-duplicated set of puzzle groups.
#[derive(Debug, Clone)]
pub struct PuzzleCatalog {
    groups: Vec<PuzzleGroup>,
    duplicates_dropped: usize,
}

impl PuzzleCatalog {
    /// Validates raw groups into a catalog.
    ///
    /// Labels and members are trimmed. A group repeating an earlier label is
    /// dropped (first occurrence wins) so that a label identifies exactly one
    /// group inside any puzzle.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::MalformedGroup`] for an empty label or a group
    /// without exactly four non-empty members, and
    /// [`PuzzleError::TooFewGroups`] when fewer than four distinct groups
    /// remain.
    pub fn from_groups(raw: Vec<PuzzleGroup>) -> Result<Self, PuzzleError> {
        let mut seen = HashSet::new();
        let mut groups = Vec::with_capacity(raw.len());
        let mut duplicates_dropped = 0;

        for (index, group) in raw.into_iter().enumerate() {
            let label = group.label.trim().to_string();
            if label.is_empty() {
                return Err(PuzzleError::MalformedGroup {
                    index,
                    label,
                    reason: "empty group label".to_string(),
                });
            }

            let members: Vec<String> = group
                .members
                .iter()
                .map(|m| m.trim().to_string())
                .collect();
            if members.len() != MEMBERS_PER_GROUP {
                return Err(PuzzleError::MalformedGroup {
                    index,
                    label,
                    reason: format!(
                        "expected {MEMBERS_PER_GROUP} members, found {}",
                        members.len()
                    ),
                });
            }
            if members.iter().any(String::is_empty) {
                return Err(PuzzleError::MalformedGroup {
                    index,
                    label,
                    reason: "empty member word".to_string(),
                });
            }

            if !seen.insert(label.clone()) {
                duplicates_dropped += 1;
                continue;
            }
            groups.push(PuzzleGroup { label, members });
        }

        if groups.len() < GROUPS_PER_PUZZLE {
            return Err(PuzzleError::TooFewGroups {
                required: GROUPS_PER_PUZZLE,
                found: groups.len(),
            });
        }

        Ok(Self {
            groups,
            duplicates_dropped,
        })
    }

    /// Returns the distinct groups.
    #[must_use]
    pub fn groups(&self) -> &[PuzzleGroup] {
        &self.groups
    }

    /// Number of distinct groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Always `false` for a constructed catalog; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of source groups dropped because their label repeated.
    #[must_use]
    pub const fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }
}
