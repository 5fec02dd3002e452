//! Participant-facing front-end
//!
//! The controller describes what to show as a [`Screen`]; a [`Presenter`]
//! draws it. Input arrives as text lines turned into
//! [`InputEvent`](crate::experiment::InputEvent)s by [`parse_line`].

pub mod input;
pub mod terminal;

pub use input::parse_line;
pub use terminal::TerminalPresenter;

use std::io;

use crate::experiment::GuessFeedback;

/// One tile as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileView {
    /// Word on the tile
    pub text: String,
    /// Currently selected
    pub selected: bool,
    /// Part of the found group
    pub matched: bool,
}

/// Everything a presenter needs to draw the current phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Participant ID entry
    ParticipantId,
    /// Static text screen awaiting Continue
    Message {
        /// Heading
        title: String,
        /// Body text
        body: String,
        /// How to continue
        hint: String,
    },
    /// Connections grid
    Puzzle {
        /// 1-based block number
        block: u32,
        /// Total blocks
        blocks: u32,
        /// Tiles in display order
        tiles: Vec<TileView>,
        /// Selected words in selection order
        selected: Vec<String>,
        /// Outcome of the latest guess
        feedback: Option<GuessFeedback>,
    },
    /// Post-puzzle rest with spontaneity prompt
    Rest {
        /// Block just finished
        block: u32,
        /// Seconds left
        remaining: u32,
        /// Bound rating, if any
        rating: Option<u8>,
    },
    /// RAT cue words with countdown
    RatThink {
        /// 1-based item number
        item: u32,
        /// Total items
        items: u32,
        /// Cue words for display
        prompt: String,
        /// Seconds left
        remaining: u32,
    },
    /// RAT answer revealed, waiting for Y/N
    RatReveal {
        /// 1-based item number
        item: u32,
        /// Total items
        items: u32,
        /// Cue words for display
        prompt: String,
        /// The linking word
        answer: String,
    },
    /// Rest between RAT items
    RatRest {
        /// 1-based item number
        item: u32,
        /// Seconds left
        remaining: u32,
    },
    /// Questionnaire item
    Question {
        /// 1-based item number
        item: u32,
        /// Total items
        items: u32,
        /// Question text
        text: String,
    },
    /// Session over
    Finished,
}

/// Draws screens.
pub trait Presenter {
    /// Shows `screen`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the output cannot be written.
    fn render(&mut self, screen: &Screen) -> io::Result<()>;
}
