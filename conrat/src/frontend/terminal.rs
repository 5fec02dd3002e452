//! Plain-text terminal presenter.

use std::io::{self, Write};

use super::{Presenter, Screen, TileView};
use crate::experiment::GuessFeedback;

/// Tiles per grid row.
const GRID_WIDTH: usize = 4;

/// Writes screens as text, redrawing only when the screen changed.
pub struct TerminalPresenter<W> {
    out: W,
    last: Option<Screen>,
}

impl TerminalPresenter<io::Stdout> {
    /// Presents on stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalPresenter<W> {
    /// Presents on an arbitrary writer.
    pub const fn new(out: W) -> Self {
        Self { out, last: None }
    }

    /// Consumes the presenter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, screen: &Screen) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out)?;
        match screen {
            Screen::ParticipantId => {
                writeln!(out, "ENTER PLAYER ID")?;
                writeln!(out, "Please enter your Participant/Player ID and press Enter.")?;
            }
            Screen::Message { title, body, hint } => {
                writeln!(out, "{title}\n\n{body}\n\n{hint}")?;
            }
            Screen::Puzzle {
                block,
                blocks,
                tiles,
                selected,
                feedback,
            } => {
                writeln!(out, "CONNECTIONS {block}/{blocks}")?;
                draw_grid(out, tiles)?;
                if selected.is_empty() {
                    writeln!(out, "Selected: None")?;
                } else {
                    writeln!(out, "Selected: {}", selected.join(", "))?;
                }
                match feedback {
                    Some(GuessFeedback::Correct { label }) => {
                        writeln!(out, "Correct! Group: {label}")?;
                    }
                    Some(GuessFeedback::Incorrect) => writeln!(out, "Wrong group! Try again.")?,
                    None => writeln!(out, "Find a correct group to win!")?,
                }
                writeln!(out, "Enter a tile number (1-16), or 'c' to deselect all.")?;
            }
            Screen::Rest {
                remaining, rating, ..
            } => {
                writeln!(out, "Rest")?;
                writeln!(out, "Next step in {remaining}s")?;
                writeln!(
                    out,
                    "How spontaneous was your answer? (1 = very deliberate, 5 = very spontaneous)"
                )?;
                if let Some(r) = rating {
                    writeln!(out, "Recorded: {r}/5")?;
                }
            }
            Screen::RatThink {
                item,
                items,
                prompt,
                remaining,
            } => {
                writeln!(out, "RAT Item {item} of {items}")?;
                writeln!(out, "{prompt}")?;
                writeln!(out, "Thinking: {remaining}s")?;
                writeln!(out, "Think of a single word that relates to all three. No typing yet.")?;
            }
            Screen::RatReveal {
                item,
                items,
                prompt,
                answer,
            } => {
                writeln!(out, "RAT Item {item} of {items}")?;
                writeln!(out, "{prompt}")?;
                writeln!(out, "Answer: {answer}")?;
                writeln!(
                    out,
                    "Did you already know this answer before it was revealed? Press Y for Yes, N for No."
                )?;
            }
            Screen::RatRest { remaining, .. } => {
                writeln!(out, "Rest")?;
                writeln!(out, "Next item in {remaining}s")?;
            }
            Screen::Question { item, items, text } => {
                writeln!(out, "Question {item} of {items}")?;
                writeln!(out, "{text}")?;
                writeln!(out, "Please rate from 1 to 5.")?;
            }
            Screen::Finished => writeln!(out, "Goodbye.")?,
        }
        out.flush()
    }
}

fn draw_grid<W: Write>(out: &mut W, tiles: &[TileView]) -> io::Result<()> {
    for (row, chunk) in tiles.chunks(GRID_WIDTH).enumerate() {
        let cells: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(col, tile)| {
                let n = row * GRID_WIDTH + col + 1;
                let mark = if tile.matched {
                    '='
                } else if tile.selected {
                    '*'
                } else {
                    ' '
                };
                format!("{n:>2}{mark}{:<12}", tile.text)
            })
            .collect();
        writeln!(out, "{}", cells.join(" ").trim_end())?;
    }
    Ok(())
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, screen: &Screen) -> io::Result<()> {
        if self.last.as_ref() == Some(screen) {
            return Ok(());
        }
        self.draw(screen)?;
        self.last = Some(screen.clone());
        Ok(())
    }
}
