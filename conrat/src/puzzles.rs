//! Puzzle sources
//!
//! A [`PuzzleSource`] produces the validated [`PuzzleCatalog`] the
//! Connections blocks draw from. Loading happens once at startup and any
//! failure is fatal.

use std::path::{Path, PathBuf};

use conrat_core::puzzle::{PuzzleCatalog, PuzzleGroup};

use crate::error::PuzzleError;

/// Supplies the Connections catalog.
pub trait PuzzleSource {
    /// Loads and validates the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`PuzzleError`] when the source is missing, malformed, or
    /// holds fewer than four distinct groups.
    fn load(&self) -> Result<PuzzleCatalog, PuzzleError>;
}

/// Reads a JSON array of `{"group": "...", "members": [..4 words..]}`.
#[derive(Debug, Clone)]
pub struct JsonFilePuzzleSource {
    path: PathBuf,
}

impl JsonFilePuzzleSource {
    /// Creates a source for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path this source reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PuzzleSource for JsonFilePuzzleSource {
    fn load(&self) -> Result<PuzzleCatalog, PuzzleError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|_| PuzzleError::MissingFile {
            path: self.path.clone(),
        })?;
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

        let groups: Vec<PuzzleGroup> =
            serde_json::from_str(raw).map_err(|e| PuzzleError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let catalog = PuzzleCatalog::from_groups(groups)?;
        if catalog.duplicates_dropped() > 0 {
            tracing::warn!(
                path = %self.path.display(),
                dropped = catalog.duplicates_dropped(),
                "puzzle groups with repeated labels dropped"
            );
        }
        tracing::info!(
            path = %self.path.display(),
            groups = catalog.len(),
            "puzzle catalog loaded"
        );
        Ok(catalog)
    }
}

/// In-memory groups, validated on every load.
#[derive(Debug, Clone, Default)]
pub struct StaticPuzzleSource {
    groups: Vec<PuzzleGroup>,
}

impl StaticPuzzleSource {
    /// Wraps `groups`.
    #[must_use]
    pub const fn new(groups: Vec<PuzzleGroup>) -> Self {
        Self { groups }
    }
}

impl PuzzleSource for StaticPuzzleSource {
    fn load(&self) -> Result<PuzzleCatalog, PuzzleError> {
        PuzzleCatalog::from_groups(self.groups.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR_GROUPS: &str = r#"[
        {"group": "Fish", "members": ["Bass", "Pike", "Carp", "Sole"]},
        {"group": "Planets", "members": ["Mars", "Venus", "Earth", "Saturn"]},
        {"group": "Colours", "members": ["Red", "Blue", "Green", "Teal"]},
        {"group": "Fish", "members": ["Cod", "Hake", "Ling", "Dab"]},
        {"group": "Trees", "members": ["Oak", "Ash", "Elm", "Yew"]}
    ]"#;

    fn write(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn loads_and_dedups_json_catalog() {
        let file = write(FOUR_GROUPS);
        let catalog = JsonFilePuzzleSource::new(file.path()).load().unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.duplicates_dropped(), 1);
        assert_eq!(catalog.groups()[0].members[0], "Bass");
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = JsonFilePuzzleSource::new("/nonexistent/puzzles.json")
            .load()
            .unwrap_err();
        assert!(matches!(err, PuzzleError::MissingFile { .. }));
    }

    #[test]
    fn malformed_json_is_fatal() {
        let file = write(r#"{"group": "not an array"}"#);
        let err = JsonFilePuzzleSource::new(file.path()).load().unwrap_err();
        assert!(matches!(err, PuzzleError::Parse { .. }));
    }

    #[test]
    fn short_group_is_fatal() {
        let file = write(r#"[{"group": "Fish", "members": ["Bass", "Pike", "Carp"]}]"#);
        let err = JsonFilePuzzleSource::new(file.path()).load().unwrap_err();
        assert!(matches!(err, PuzzleError::MalformedGroup { index: 0, .. }));
    }

    #[test]
    fn static_source_needs_four_distinct_groups() {
        let source = StaticPuzzleSource::new(vec![
            PuzzleGroup::new("A", ["a", "b", "c", "d"]),
            PuzzleGroup::new("A", ["e", "f", "g", "h"]),
            PuzzleGroup::new("B", ["i", "j", "k", "l"]),
        ]);
        assert!(matches!(
            source.load(),
            Err(PuzzleError::TooFewGroups { found: 2, .. })
        ));
    }
}
