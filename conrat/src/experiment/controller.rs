//! Session controller
//!
//! Sequences the fixed session:
//!
//! ```text
//! ParticipantId → Intro → Instructions(Connections)
//!   → {ConnectionsPuzzle(i) → ConnectionsRest(i)} × blocks
//!   → Instructions(Rat) → {RatThink(j) → RatReveal(j) → RatRest(j)} × items
//!   → Congratulations → Questionnaire(k) × questions → Exit → Finished
//! ```
//!
//! Exactly one [`Stage`] is active. Inputs and timer wakeups are handled one
//! at a time; a wakeup is dropped unless its owner tag equals the current
//! phase, so a timer can never act on a phase it does not belong to.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use conrat_core::{ExperimentConfig, MarkerLabel, ParticipantId, PuzzleCatalog, YesNo};

use super::connections::BlockStep;
use super::questionnaire::QuestionnaireStep;
use super::rat::{RatStage, RatStep};
use super::rating::RestStep;
use super::{
    ConnectionsBlock, InstructionKind, Phase, PhaseContext, Questionnaire, RatTask, RatingPrompt,
    Session, SkipRoute,
};
use crate::frontend::{Screen, TileView};
use crate::markers::{MarkerSink, MarkerWriter};
use crate::observability::metrics;
use crate::timer::{ManualScheduler, Scheduler, TimerFired};

// ============================================================================
// Events and stages
// ============================================================================

/// Participant or experimenter input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Participant ID entry submitted
    SubmitId(String),
    /// Acknowledge a message screen
    Continue,
    /// Click a tile (0-based)
    ToggleTile(usize),
    /// Clear the tile selection
    DeselectAll,
    /// Choose a 1..5 rating
    Rate(u8),
    /// Yes/No after a RAT reveal
    Answer(YesNo),
    /// Experimenter's global skip
    MasterSkip,
}

/// Static text screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageScreen {
    /// Welcome
    Intro,
    /// Before the first puzzle
    ConnectionsInstructions,
    /// Before the first RAT item
    RatInstructions,
    /// After the RAT stage
    Congratulations,
    /// Thank-you screen; acknowledging it ends the session
    Farewell,
}

impl MessageScreen {
    /// Phase tag for this screen.
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Self::Intro => Phase::Intro,
            Self::ConnectionsInstructions => Phase::Instructions(InstructionKind::Connections),
            Self::RatInstructions => Phase::Instructions(InstructionKind::Rat),
            Self::Congratulations => Phase::Congratulations,
            Self::Farewell => Phase::Exit,
        }
    }

    /// Renders the screen text. Counts and windows come from `config`.
    #[must_use]
    pub fn render(self, config: &ExperimentConfig) -> Screen {
        let enter = "Press Enter to continue.";
        let (title, body, hint) = match self {
            Self::Intro => (
                "WELCOME TO THE EXPERIMENT",
                "You will complete two tasks: a Connections game and a Remote Associates Test (RAT)."
                    .to_string(),
                enter,
            ),
            Self::ConnectionsInstructions => (
                "CONNECTIONS GAME - INSTRUCTIONS",
                format!(
                    "You will see 16 tiles, each with a word. Your goal is to find one correct \
                     group of four words that belong together.\n\n\
                     Select exactly four tiles. If they form a correct group, the category will \
                     be shown and the puzzle will end.\n\n\
                     You will complete {} puzzles in a row.\n\
                     Between puzzles, there will be a {}-second rest period. During rest, please \
                     rate how spontaneous your answer felt (1 = deliberate, 5 = spontaneous).",
                    config.connections.blocks, config.connections.rest_seconds
                ),
                enter,
            ),
            Self::RatInstructions => (
                "REMOTE ASSOCIATES TEST (RAT) - INSTRUCTIONS",
                format!(
                    "For each item you will see 3 words.\n\n\
                     - You will have {think} seconds to silently think of a fourth word that \
                     relates to all three.\n\
                     - After {think} seconds, the correct answer will be revealed.\n\
                     - Press Y if you already knew the answer before it was revealed, or N if \
                     you did not.\n\
                     - After your Y/N, there is a {rest}-second rest period before the next item.\n\
                     - There are {items} items in total.",
                    think = config.rat.think_seconds,
                    rest = config.rat.rest_seconds,
                    items = config.rat.items.len(),
                ),
                enter,
            ),
            Self::Congratulations => (
                "CONGRATULATIONS!",
                "You've completed the tasks. A researcher will now ask a few follow-up questions."
                    .to_string(),
                "Press Enter to proceed to the questions.",
            ),
            Self::Farewell => (
                "THANK YOU!",
                "You've completed everything.".to_string(),
                "Press Enter to exit.",
            ),
        };
        Screen::Message {
            title: title.to_string(),
            body,
            hint: hint.to_string(),
        }
    }
}

/// The one active stage of the session.
#[derive(Debug)]
pub enum Stage {
    /// Waiting for a participant ID
    ParticipantId,
    /// A static message screen
    Message(MessageScreen),
    /// A Connections puzzle
    Puzzle(ConnectionsBlock),
    /// The rated rest after a puzzle
    Rest(RatingPrompt),
    /// The RAT stage
    Rat(RatTask),
    /// The questionnaire
    Questionnaire(Questionnaire),
    /// Session over
    Finished,
}

/// A stage reporting that it has run to completion.
#[derive(Debug, Clone, Copy)]
enum Outcome {
    IdAccepted,
    MessageDone(MessageScreen),
    PuzzleDone(u32),
    RestDone(u32),
    RatDone,
    QuestionnaireDone,
}

// ============================================================================
// Controller
// ============================================================================

/// Owns the session and drives it from events.
pub struct SessionController<S> {
    config: Arc<ExperimentConfig>,
    catalog: PuzzleCatalog,
    rng: StdRng,
    scheduler: S,
    markers: MarkerWriter,
    session: Session,
    stage: Stage,
}

impl<S> std::fmt::Debug for SessionController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("stage", &self.stage)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<S: Scheduler> SessionController<S> {
    /// Creates a controller on the participant-ID screen.
    ///
    /// Tile draws are seeded from `config.seed` when set, otherwise from OS
    /// entropy.
    pub fn new(
        config: Arc<ExperimentConfig>,
        catalog: PuzzleCatalog,
        scheduler: S,
        sink: Box<dyn MarkerSink>,
    ) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            config,
            catalog,
            rng,
            scheduler,
            markers: MarkerWriter::new(sink),
            session: Session::new(),
            stage: Stage::ParticipantId,
        }
    }

    fn split(&mut self) -> (&mut Stage, PhaseContext<'_>) {
        (
            &mut self.stage,
            PhaseContext {
                markers: &mut self.markers,
                scheduler: &mut self.scheduler,
                session: &mut self.session,
            },
        )
    }

    /// Handles one input event.
    pub fn handle(&mut self, event: InputEvent) {
        let before = self.phase();
        if before.is_finished() {
            tracing::debug!(?event, "session finished; input ignored");
            return;
        }

        let outcome = match event {
            InputEvent::MasterSkip => self.master_skip(),
            other => self.dispatch(other),
        };
        if let Some(outcome) = outcome {
            self.advance(outcome);
        }
        self.note_transition(before);
    }

    /// Handles one timer wakeup.
    pub fn handle_timer(&mut self, fired: TimerFired) {
        let before = self.phase();
        if fired.owner != before {
            metrics::record_stale_timer();
            tracing::debug!(owner = %fired.owner, current = %before, id = fired.id.get(), "stale timer dropped");
            return;
        }

        let outcome = {
            let (stage, mut ctx) = self.split();
            match stage {
                Stage::Puzzle(block) => (block.on_timer(fired.id) == BlockStep::Completed)
                    .then(|| Outcome::PuzzleDone(block.index())),
                Stage::Rest(prompt) => match prompt.on_timer(fired.id, &mut ctx) {
                    RestStep::Resolved(_) => Some(Outcome::RestDone(prompt.block())),
                    RestStep::Continue => None,
                },
                Stage::Rat(task) => {
                    (task.on_timer(fired.id, &mut ctx) == RatStep::Completed).then_some(Outcome::RatDone)
                }
                _ => None,
            }
        };
        if let Some(outcome) = outcome {
            self.advance(outcome);
        }
        self.note_transition(before);
    }

    fn dispatch(&mut self, event: InputEvent) -> Option<Outcome> {
        let (stage, mut ctx) = self.split();
        match (stage, event) {
            (Stage::ParticipantId, InputEvent::SubmitId(raw)) => {
                let Some(id) = ParticipantId::parse(&raw) else {
                    tracing::debug!("blank participant id ignored");
                    return None;
                };
                tracing::info!(participant = %id, "session started");
                ctx.markers.set_participant(id.clone());
                ctx.session.participant_id = Some(id);
                ctx.markers.emit(MarkerLabel::SessionStart);
                Some(Outcome::IdAccepted)
            }
            (Stage::Message(screen), InputEvent::Continue) => Some(Outcome::MessageDone(*screen)),
            (Stage::Puzzle(block), InputEvent::ToggleTile(tile)) => {
                block.toggle(tile, &mut ctx);
                None
            }
            (Stage::Puzzle(block), InputEvent::DeselectAll) => {
                block.deselect_all();
                None
            }
            (Stage::Rest(prompt), InputEvent::Rate(value)) => {
                prompt.choose(value, &mut ctx);
                None
            }
            (Stage::Rat(task), InputEvent::Answer(answer)) => {
                (task.answer(answer, &mut ctx) == RatStep::Completed).then_some(Outcome::RatDone)
            }
            (Stage::Questionnaire(q), InputEvent::Rate(value)) => {
                (q.answer(value, &mut ctx) == QuestionnaireStep::Completed)
                    .then_some(Outcome::QuestionnaireDone)
            }
            (_, event) => {
                tracing::debug!(?event, "input does not apply to current phase");
                None
            }
        }
    }

    fn master_skip(&mut self) -> Option<Outcome> {
        let route = SkipRoute::route(&self.stage);
        metrics::record_master_skip(route.label());
        tracing::info!(phase = %self.phase(), route = route.label(), "master skip");

        let (stage, mut ctx) = self.split();
        match (route, stage) {
            (SkipRoute::AdvanceMessage, Stage::Message(screen)) => {
                Some(Outcome::MessageDone(*screen))
            }
            (SkipRoute::ResolveRatingRest, Stage::Rest(prompt)) => {
                prompt.resolve(&mut ctx);
                Some(Outcome::RestDone(prompt.block()))
            }
            (SkipRoute::CompletePuzzle, Stage::Puzzle(block)) => {
                block.abandon(&mut ctx);
                Some(Outcome::PuzzleDone(block.index()))
            }
            (SkipRoute::AdvanceRat, Stage::Rat(task)) => {
                (task.force_advance(&mut ctx) == RatStep::Completed).then_some(Outcome::RatDone)
            }
            (SkipRoute::SkipQuestion, Stage::Questionnaire(q)) => {
                (q.skip(&mut ctx) == QuestionnaireStep::Completed)
                    .then_some(Outcome::QuestionnaireDone)
            }
            _ => None,
        }
    }

    /// Moves to whatever follows a completed stage.
    fn advance(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::IdAccepted => self.stage = Stage::Message(MessageScreen::Intro),
            Outcome::MessageDone(screen) => self.after_message(screen),
            Outcome::PuzzleDone(block) => {
                self.session.connections_completed += 1;
                let seconds = self.config.connections.rest_seconds;
                let (_, mut ctx) = self.split();
                let prompt = RatingPrompt::start(block, seconds, &mut ctx);
                self.stage = Stage::Rest(prompt);
            }
            Outcome::RestDone(block) => {
                if block < self.config.connections.blocks {
                    self.start_puzzle(block + 1);
                } else {
                    self.stage = Stage::Message(MessageScreen::RatInstructions);
                }
            }
            Outcome::RatDone => self.stage = Stage::Message(MessageScreen::Congratulations),
            Outcome::QuestionnaireDone => self.stage = Stage::Message(MessageScreen::Farewell),
        }
    }

    fn after_message(&mut self, screen: MessageScreen) {
        match screen {
            MessageScreen::Intro => {
                self.stage = Stage::Message(MessageScreen::ConnectionsInstructions);
            }
            MessageScreen::ConnectionsInstructions => {
                if self.config.connections.blocks > 0 {
                    self.start_puzzle(1);
                } else {
                    self.stage = Stage::Message(MessageScreen::RatInstructions);
                }
            }
            MessageScreen::RatInstructions => {
                let config = Arc::clone(&self.config);
                let (_, mut ctx) = self.split();
                let task = RatTask::start(&config.rat, &mut ctx);
                self.stage = if task.is_done() {
                    Stage::Message(MessageScreen::Congratulations)
                } else {
                    Stage::Rat(task)
                };
            }
            MessageScreen::Congratulations => {
                let config = Arc::clone(&self.config);
                let (_, mut ctx) = self.split();
                let q = Questionnaire::start(&config.questionnaire.questions, &mut ctx);
                self.stage = if q.is_complete() {
                    Stage::Message(MessageScreen::Farewell)
                } else {
                    Stage::Questionnaire(q)
                };
            }
            MessageScreen::Farewell => self.stage = Stage::Finished,
        }
    }

    fn start_puzzle(&mut self, block: u32) {
        let display = Duration::from_millis(self.config.connections.solved_display_ms);
        let mut ctx = PhaseContext {
            markers: &mut self.markers,
            scheduler: &mut self.scheduler,
            session: &mut self.session,
        };
        let puzzle = ConnectionsBlock::start(block, &self.catalog, &mut self.rng, display, &mut ctx);
        self.stage = Stage::Puzzle(puzzle);
    }

    fn note_transition(&self, before: Phase) {
        let after = self.phase();
        if after == before {
            return;
        }
        metrics::record_phase_transition(before.kind(), after.kind());
        tracing::debug!(from = %before, to = %after, "phase transition");
        if after.is_finished() {
            self.session.log_summary();
        }
    }

    /// Current phase tag.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match &self.stage {
            Stage::ParticipantId => Phase::ParticipantId,
            Stage::Message(screen) => screen.phase(),
            Stage::Puzzle(block) => Phase::ConnectionsPuzzle(block.index()),
            Stage::Rest(prompt) => Phase::ConnectionsRest(prompt.block()),
            Stage::Rat(task) => task.phase(),
            Stage::Questionnaire(q) => Phase::Questionnaire(q.item_number()),
            Stage::Finished => Phase::Finished,
        }
    }

    /// Whether the thank-you screen has been acknowledged.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.stage, Stage::Finished)
    }

    /// The session record so far.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The active stage.
    #[must_use]
    pub const fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Markers emitted so far.
    #[must_use]
    pub const fn markers_emitted(&self) -> u64 {
        self.markers.emitted()
    }

    /// The scheduler, for runtimes that need to reach it directly.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Describes what should be on screen.
    #[must_use]
    pub fn screen(&self) -> Screen {
        match &self.stage {
            Stage::ParticipantId => Screen::ParticipantId,
            Stage::Message(screen) => screen.render(&self.config),
            Stage::Puzzle(block) => Screen::Puzzle {
                block: block.index(),
                blocks: self.config.connections.blocks,
                tiles: block
                    .tiles()
                    .iter()
                    .enumerate()
                    .map(|(i, t)| TileView {
                        text: t.text.clone(),
                        selected: block.selected().contains(&i),
                        matched: t.matched,
                    })
                    .collect(),
                selected: block
                    .selected()
                    .iter()
                    .filter_map(|&i| block.tiles().get(i).map(|t| t.text.clone()))
                    .collect(),
                feedback: block.feedback().cloned(),
            },
            Stage::Rest(prompt) => Screen::Rest {
                block: prompt.block(),
                remaining: prompt.remaining(),
                rating: prompt.choice().map(conrat_core::Rating::value),
            },
            Stage::Rat(task) => rat_screen(task),
            Stage::Questionnaire(q) => Screen::Question {
                item: q.item_number(),
                items: u32::try_from(q.len()).unwrap_or(u32::MAX),
                text: q.current().unwrap_or_default().to_string(),
            },
            Stage::Finished => Screen::Finished,
        }
    }
}

fn rat_screen(task: &RatTask) -> Screen {
    let item = task.item_number();
    let items = u32::try_from(task.len()).unwrap_or(u32::MAX);
    let prompt = task.current().map(conrat_core::config::RatItem::prompt).unwrap_or_default();
    let remaining = task.remaining().unwrap_or(0);
    match task.stage() {
        RatStage::Think => Screen::RatThink {
            item,
            items,
            prompt,
            remaining,
        },
        RatStage::Reveal => Screen::RatReveal {
            item,
            items,
            prompt,
            answer: task
                .current()
                .map(|i| i.answer.to_uppercase())
                .unwrap_or_default(),
        },
        RatStage::Rest | RatStage::Done => Screen::RatRest { item, remaining },
    }
}

impl SessionController<ManualScheduler> {
    /// Advances the virtual clock by `by`, delivering every wakeup that
    /// falls due along the way in order.
    pub fn advance_clock(&mut self, by: Duration) {
        let deadline = self.scheduler.now() + by;
        while let Some(fired) = self.scheduler.pop_until(deadline) {
            self.handle_timer(fired);
        }
        self.scheduler.set_now(deadline);
    }
}
