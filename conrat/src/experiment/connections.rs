//! Connections puzzle block
//!
//! One block draws four groups from the catalog, lays their sixteen members
//! out in random order and waits for the participant to select four tiles
//! that share a group. The block ends on the first correct group: the group
//! stays on screen for the solved-display delay and then the block reports
//! [`BlockStep::Completed`]. Incorrect guesses are unlimited.

use std::time::Duration;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use conrat_core::MarkerLabel;
use conrat_core::puzzle::{GROUPS_PER_PUZZLE, MEMBERS_PER_GROUP, PuzzleCatalog};

use super::{Phase, PhaseContext};
use crate::observability::metrics;
use crate::timer::{Delay, TimerId};

/// Tiles in one puzzle grid.
pub const TILE_COUNT: usize = GROUPS_PER_PUZZLE * MEMBERS_PER_GROUP;

/// One word on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Word shown
    pub text: String,
    /// Label of the group the word belongs to
    pub group: String,
    /// Whether the tile is part of a found group
    pub matched: bool,
}

/// Outcome of the most recent evaluated guess, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessFeedback {
    /// The four tiles formed the named group
    Correct {
        /// Group label
        label: String,
    },
    /// The four tiles did not share a group
    Incorrect,
}

/// What the controller should do after a block operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStep {
    /// Stay on the puzzle
    Continue,
    /// The solved group has been shown; move to the rest
    Completed,
}

/// State of one puzzle block.
#[derive(Debug)]
pub struct ConnectionsBlock {
    index: u32,
    tiles: Vec<Tile>,
    selected: Vec<usize>,
    guess_count: u32,
    feedback: Option<GuessFeedback>,
    solved_display: Duration,
    display: Option<Delay>,
}

impl ConnectionsBlock {
    /// Draws a fresh puzzle and announces it.
    ///
    /// Emits `Connections<i>_Start`.
    pub fn start<R: Rng + ?Sized>(
        index: u32,
        catalog: &PuzzleCatalog,
        rng: &mut R,
        solved_display: Duration,
        ctx: &mut PhaseContext<'_>,
    ) -> Self {
        let mut tiles: Vec<Tile> = catalog
            .groups()
            .choose_multiple(rng, GROUPS_PER_PUZZLE)
            .flat_map(|group| {
                group.members.iter().map(|member| Tile {
                    text: member.clone(),
                    group: group.label.clone(),
                    matched: false,
                })
            })
            .collect();
        tiles.shuffle(rng);

        tracing::debug!(block = index, tiles = tiles.len(), "puzzle drawn");
        ctx.markers.emit(MarkerLabel::ConnectionsStart { block: index });

        Self {
            index,
            tiles,
            selected: Vec::with_capacity(MEMBERS_PER_GROUP),
            guess_count: 0,
            feedback: None,
            solved_display,
            display: None,
        }
    }

    /// Builds a block from a fixed tile layout without emitting anything.
    #[cfg(test)]
    pub(crate) fn with_tiles(index: u32, tiles: Vec<Tile>, solved_display: Duration) -> Self {
        Self {
            index,
            tiles,
            selected: Vec::new(),
            guess_count: 0,
            feedback: None,
            solved_display,
            display: None,
        }
    }

    /// Selects or deselects a tile.
    ///
    /// Ignored for an out-of-range index, a matched tile, or once the puzzle
    /// is solved. The fourth selection is evaluated immediately and the
    /// selection is cleared whatever the outcome.
    pub fn toggle(&mut self, tile: usize, ctx: &mut PhaseContext<'_>) {
        if self.is_solved() {
            tracing::debug!(block = self.index, tile, "tile ignored after solve");
            return;
        }
        let Some(t) = self.tiles.get(tile) else {
            tracing::debug!(block = self.index, tile, "tile index out of range");
            return;
        };
        if t.matched {
            return;
        }

        if let Some(pos) = self.selected.iter().position(|&s| s == tile) {
            self.selected.remove(pos);
            return;
        }
        if self.selected.len() < MEMBERS_PER_GROUP {
            self.selected.push(tile);
        }
        if self.selected.len() == MEMBERS_PER_GROUP {
            self.evaluate(ctx);
        }
    }

    /// Clears the current selection without evaluating it.
    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    fn evaluate(&mut self, ctx: &mut PhaseContext<'_>) {
        self.guess_count += 1;
        let first = &self.tiles[self.selected[0]].group;
        let correct = self
            .selected
            .iter()
            .all(|&i| self.tiles[i].group == *first);

        metrics::record_guess(correct);
        ctx.markers.emit(MarkerLabel::ConnectionsGuess {
            block: self.index,
            guess: self.guess_count,
            correct,
        });

        if correct {
            let label = first.clone();
            for &i in &self.selected {
                self.tiles[i].matched = true;
            }
            ctx.markers
                .emit(MarkerLabel::ConnectionsEnd { block: self.index });
            tracing::debug!(block = self.index, guess = self.guess_count, group = %label, "group found");
            self.feedback = Some(GuessFeedback::Correct { label });
            self.display = Some(Delay::start(
                self.solved_display,
                Phase::ConnectionsPuzzle(self.index),
                ctx.scheduler,
            ));
        } else {
            self.feedback = Some(GuessFeedback::Incorrect);
        }
        self.selected.clear();
    }

    /// Routes a wakeup; completes once the solved-display delay elapses.
    pub fn on_timer(&mut self, id: TimerId) -> BlockStep {
        if self.display.as_mut().is_some_and(|delay| delay.on_fired(id)) {
            BlockStep::Completed
        } else {
            BlockStep::Continue
        }
    }

    /// Leaves the block early, cancelling a pending solved-display delay.
    pub fn abandon(&mut self, ctx: &mut PhaseContext<'_>) {
        if let Some(delay) = self.display.as_mut() {
            delay.cancel(ctx.scheduler);
        }
    }

    /// 1-based block number.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Tiles in display order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Selected tile indices in selection order (never more than four).
    #[must_use]
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Evaluated guesses so far.
    #[must_use]
    pub const fn guess_count(&self) -> u32 {
        self.guess_count
    }

    /// Outcome of the latest guess.
    #[must_use]
    pub const fn feedback(&self) -> Option<&GuessFeedback> {
        self.feedback.as_ref()
    }

    /// Whether a correct group has been found.
    #[must_use]
    pub const fn is_solved(&self) -> bool {
        matches!(self.feedback, Some(GuessFeedback::Correct { .. }))
    }
}

#[cfg(test)]
mod tests {
    use conrat_core::PuzzleGroup;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::experiment::testing::Harness;

    const DISPLAY: Duration = Duration::from_millis(2500);

    /// Tiles laid out group by group: indices 0-3 are group A, 4-7 B, and so on.
    fn ordered_tiles() -> Vec<Tile> {
        ["A", "B", "C", "D"]
            .iter()
            .flat_map(|g| {
                (1..=4).map(move |m| Tile {
                    text: format!("{g}{m}"),
                    group: (*g).to_string(),
                    matched: false,
                })
            })
            .collect()
    }

    fn catalog() -> PuzzleCatalog {
        PuzzleCatalog::from_groups(vec![
            PuzzleGroup::new("Fish", ["bass", "carp", "pike", "sole"]),
            PuzzleGroup::new("Planets", ["mars", "venus", "earth", "saturn"]),
            PuzzleGroup::new("Colors", ["red", "blue", "green", "teal"]),
            PuzzleGroup::new("Trees", ["oak", "elm", "ash", "fir"]),
            PuzzleGroup::new("Metals", ["iron", "tin", "gold", "lead"]),
        ])
        .unwrap()
    }

    #[test]
    fn start_draws_four_complete_groups() {
        let mut h = Harness::new();
        let mut rng = StdRng::seed_from_u64(7);
        let block = ConnectionsBlock::start(1, &catalog(), &mut rng, DISPLAY, &mut h.ctx());

        assert_eq!(block.tiles().len(), TILE_COUNT);
        let mut groups: Vec<&str> = block.tiles().iter().map(|t| t.group.as_str()).collect();
        groups.sort_unstable();
        groups.dedup();
        assert_eq!(groups.len(), 4);
        for g in groups {
            assert_eq!(block.tiles().iter().filter(|t| t.group == g).count(), 4);
        }
        assert_eq!(h.labels(), vec!["Connections1_Start"]);
    }

    #[test]
    fn same_seed_same_layout() {
        let mut h = Harness::new();
        let a = ConnectionsBlock::start(1, &catalog(), &mut StdRng::seed_from_u64(3), DISPLAY, &mut h.ctx());
        let b = ConnectionsBlock::start(1, &catalog(), &mut StdRng::seed_from_u64(3), DISPLAY, &mut h.ctx());
        assert_eq!(a.tiles(), b.tiles());
    }

    #[test]
    fn incorrect_guess_clears_selection_and_stays_active() {
        let mut h = Harness::new();
        let mut block = ConnectionsBlock::with_tiles(1, ordered_tiles(), DISPLAY);
        for i in [0, 1, 2, 4] {
            block.toggle(i, &mut h.ctx());
        }

        assert_eq!(h.labels(), vec!["Connections1_Guess1_Incorrect"]);
        assert!(block.selected().is_empty());
        assert_eq!(block.feedback(), Some(&GuessFeedback::Incorrect));
        assert!(!block.is_solved());
        assert_eq!(h.scheduler.pending(), 0);
    }

    #[test]
    fn correct_guess_emits_end_then_completes_after_delay() {
        let mut h = Harness::new();
        let mut block = ConnectionsBlock::with_tiles(1, ordered_tiles(), DISPLAY);
        for i in [0, 1, 2, 4] {
            block.toggle(i, &mut h.ctx());
        }
        for i in [7, 6, 5, 4] {
            block.toggle(i, &mut h.ctx());
        }

        assert_eq!(
            h.labels(),
            vec![
                "Connections1_Guess1_Incorrect",
                "Connections1_Guess2_Correct",
                "Connections1_End",
            ]
        );
        assert!(block.tiles()[4..8].iter().all(|t| t.matched));
        assert!(block.is_solved());

        assert!(h.next_fire(2).is_none());
        h.scheduler.set_now(Duration::from_secs(2));
        let fired = h.next_fire(1).unwrap();
        assert_eq!(fired.owner, Phase::ConnectionsPuzzle(1));
        assert_eq!(block.on_timer(fired.id), BlockStep::Completed);
        assert_eq!(block.on_timer(fired.id), BlockStep::Continue);
    }

    #[test]
    fn foreign_wakeup_does_not_complete_solved_block() {
        let mut h = Harness::new();
        let mut block = ConnectionsBlock::with_tiles(1, ordered_tiles(), DISPLAY);
        assert_eq!(block.on_timer(TimerId::new(99)), BlockStep::Continue);

        for i in 0..4 {
            block.toggle(i, &mut h.ctx());
        }
        assert_eq!(block.on_timer(TimerId::new(99)), BlockStep::Continue);
        let fired = h.next_fire(3).unwrap();
        assert_eq!(block.on_timer(fired.id), BlockStep::Completed);
    }

    #[test]
    fn clicks_after_solve_are_ignored() {
        let mut h = Harness::new();
        let mut block = ConnectionsBlock::with_tiles(2, ordered_tiles(), DISPLAY);
        for i in 0..4 {
            block.toggle(i, &mut h.ctx());
        }
        for i in 8..12 {
            block.toggle(i, &mut h.ctx());
        }
        assert_eq!(block.guess_count(), 1);
        assert!(block.selected().is_empty());
        assert_eq!(h.labels().len(), 2);
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut h = Harness::new();
        let mut block = ConnectionsBlock::with_tiles(1, ordered_tiles(), DISPLAY);
        block.toggle(3, &mut h.ctx());
        block.toggle(9, &mut h.ctx());
        block.toggle(3, &mut h.ctx());
        assert_eq!(block.selected(), &[9]);

        block.deselect_all();
        assert!(block.selected().is_empty());
        assert_eq!(block.guess_count(), 0);
    }

    #[test]
    fn out_of_range_tile_is_ignored() {
        let mut h = Harness::new();
        let mut block = ConnectionsBlock::with_tiles(1, ordered_tiles(), DISPLAY);
        block.toggle(16, &mut h.ctx());
        block.toggle(usize::MAX, &mut h.ctx());
        assert!(block.selected().is_empty());
    }

    #[test]
    fn abandon_cancels_display_delay() {
        let mut h = Harness::new();
        let mut block = ConnectionsBlock::with_tiles(1, ordered_tiles(), DISPLAY);
        for i in 0..4 {
            block.toggle(i, &mut h.ctx());
        }
        assert_eq!(h.scheduler.pending(), 1);
        block.abandon(&mut h.ctx());
        assert_eq!(h.scheduler.pending(), 0);
    }

    proptest! {
        #[test]
        fn selection_never_exceeds_four(clicks in proptest::collection::vec(0usize..20, 0..200)) {
            let mut h = Harness::new();
            let mut block = ConnectionsBlock::with_tiles(1, ordered_tiles(), DISPLAY);
            let mut guesses_seen = 0;
            for click in clicks {
                let before = block.guess_count();
                block.toggle(click, &mut h.ctx());
                prop_assert!(block.selected().len() < MEMBERS_PER_GROUP);
                if block.guess_count() > before {
                    guesses_seen += 1;
                    prop_assert!(block.selected().is_empty());
                }
            }
            prop_assert_eq!(block.guess_count(), guesses_seen);

            let labels = h.labels();
            let ends = labels.iter().filter(|l| l.ends_with("_End")).count();
            prop_assert!(ends <= 1);
            if ends == 1 {
                let end = labels.iter().position(|l| l == "Connections1_End").unwrap();
                prop_assert!(labels[end - 1].ends_with("_Correct"));
                prop_assert_eq!(end, labels.len() - 1);
            }
        }
    }
}
