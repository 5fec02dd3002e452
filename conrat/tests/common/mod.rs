//! Shared integration-test harness: scripted in-process sessions on a
//! virtual clock, and helpers for spawning the `conrat` binary.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::time::Duration;

use conrat::config::{ExperimentConfig, RatItem};
use conrat::experiment::{InputEvent, Phase, Session, SessionController, Stage};
use conrat::markers::MemorySink;
use conrat::puzzles::{PuzzleSource, StaticPuzzleSource};
use conrat::timer::ManualScheduler;
use conrat_core::config::default_rat_items;
use conrat_core::{PuzzleCatalog, PuzzleGroup, YesNo};

// ============================================================================
// Fixtures
// ============================================================================

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Six distinct groups.
pub fn catalog() -> PuzzleCatalog {
    StaticPuzzleSource::new(vec![
        PuzzleGroup::new("Fish", ["bass", "carp", "pike", "sole"]),
        PuzzleGroup::new("Planets", ["mars", "venus", "earth", "saturn"]),
        PuzzleGroup::new("Colours", ["red", "blue", "green", "teal"]),
        PuzzleGroup::new("Trees", ["oak", "elm", "ash", "fir"]),
        PuzzleGroup::new("Metals", ["iron", "tin", "zinc", "lead"]),
        PuzzleGroup::new("Birds", ["wren", "crow", "kite", "swan"]),
    ])
    .load()
    .unwrap()
}

/// Default windows, `blocks` puzzles, the first `rat_items` standard RAT
/// items and `questions` placeholder questions. Seeded.
pub fn config(blocks: u32, rat_items: usize, questions: usize) -> ExperimentConfig {
    let mut config = ExperimentConfig::default();
    config.connections.blocks = blocks;
    config.rat.items = default_rat_items().into_iter().take(rat_items).collect::<Vec<RatItem>>();
    config.questionnaire.questions = (1..=questions).map(|i| format!("Question {i}")).collect();
    config.seed = Some(42);
    config
}

// ============================================================================
// Scripted Sessions
// ============================================================================

/// A controller on a virtual clock with its marker log.
pub struct Scripted {
    pub controller: SessionController<ManualScheduler>,
    pub sink: MemorySink,
}

impl Scripted {
    pub fn new(config: ExperimentConfig) -> Self {
        let sink = MemorySink::new();
        let controller = SessionController::new(
            Arc::new(config),
            catalog(),
            ManualScheduler::new(),
            Box::new(sink.clone()),
        );
        Self { controller, sink }
    }

    pub fn send(&mut self, event: InputEvent) -> &mut Self {
        self.controller.handle(event);
        self
    }

    pub fn id(&mut self, id: &str) -> &mut Self {
        self.send(InputEvent::SubmitId(id.to_string()))
    }

    pub fn cont(&mut self) -> &mut Self {
        self.send(InputEvent::Continue)
    }

    pub fn skip(&mut self) -> &mut Self {
        self.send(InputEvent::MasterSkip)
    }

    pub fn rate(&mut self, value: u8) -> &mut Self {
        self.send(InputEvent::Rate(value))
    }

    pub fn answer(&mut self, answer: YesNo) -> &mut Self {
        self.send(InputEvent::Answer(answer))
    }

    pub fn wait_secs(&mut self, secs: u64) -> &mut Self {
        self.controller.advance_clock(Duration::from_secs(secs));
        self
    }

    pub fn wait_ms(&mut self, ms: u64) -> &mut Self {
        self.controller.advance_clock(Duration::from_millis(ms));
        self
    }

    /// Tile indices of each still-unmatched group on the current grid,
    /// keyed by group label in first-seen order.
    fn groups(&self) -> Vec<Vec<usize>> {
        let Stage::Puzzle(block) = self.controller.stage() else {
            panic!("not on a puzzle: {}", self.controller.phase());
        };
        let mut labels: Vec<&str> = Vec::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (i, tile) in block.tiles().iter().enumerate() {
            if tile.matched {
                continue;
            }
            match labels.iter().position(|l| *l == tile.group) {
                Some(g) => groups[g].push(i),
                None => {
                    labels.push(&tile.group);
                    groups.push(vec![i]);
                }
            }
        }
        groups
    }

    /// Selects one complete group.
    pub fn solve(&mut self) -> &mut Self {
        let group = self.groups().swap_remove(0);
        for tile in group {
            self.send(InputEvent::ToggleTile(tile));
        }
        self
    }

    /// Selects three tiles of one group and one of another.
    pub fn wrong_guess(&mut self) -> &mut Self {
        let groups = self.groups();
        let picks = [groups[0][0], groups[0][1], groups[0][2], groups[1][0]];
        for tile in picks {
            self.send(InputEvent::ToggleTile(tile));
        }
        self
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn session(&self) -> &Session {
        self.controller.session()
    }

    /// Marker texts with the `Player<ID>_` prefix removed.
    pub fn labels(&self) -> Vec<String> {
        self.sink
            .texts()
            .iter()
            .map(|t| t.split_once('_').map_or_else(|| t.clone(), |(_, l)| l.to_string()))
            .collect()
    }
}

// ============================================================================
// Binary
// ============================================================================

/// Runs `conrat` with `args` and no stdin.
pub fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_conrat"))
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run conrat")
}

/// Runs `conrat` with `args`, feeding `input` on stdin.
pub fn run_cli_with_input(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_conrat"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn conrat");

    if let Some(mut stdin) = child.stdin.take() {
        // The session may finish before consuming everything.
        let _ = stdin.write_all(input.as_bytes());
    }
    child.wait_with_output().expect("failed to wait for conrat")
}
