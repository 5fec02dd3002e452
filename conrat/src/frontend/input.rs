//! Line-oriented input.
//!
//! One line of text becomes at most one [`InputEvent`]. What a line means
//! depends on the current phase: digits are tile numbers on the puzzle grid
//! and ratings elsewhere.

use conrat_core::YesNo;

use crate::experiment::{InputEvent, Phase};

/// The master skip key.
pub const SKIP_KEY: &str = ".";

/// Parses one input line for `phase`.
///
/// `.` is the master skip everywhere and an empty line is Continue. On the
/// ID screen any other text is the ID. Tiles are numbered 1..=16 on screen
/// and converted to 0-based indices here. Returns `None` for lines that mean
/// nothing in the current phase.
#[must_use]
pub fn parse_line(line: &str, phase: Phase) -> Option<InputEvent> {
    let text = line.trim();
    if text == SKIP_KEY {
        return Some(InputEvent::MasterSkip);
    }
    if text.is_empty() {
        return Some(InputEvent::Continue);
    }

    match phase {
        Phase::ParticipantId => Some(InputEvent::SubmitId(text.to_string())),
        Phase::ConnectionsPuzzle(_) => {
            if text.eq_ignore_ascii_case("c") {
                return Some(InputEvent::DeselectAll);
            }
            match text.parse::<usize>() {
                Ok(n) if n >= 1 => Some(InputEvent::ToggleTile(n - 1)),
                _ => None,
            }
        }
        Phase::ConnectionsRest(_) | Phase::Questionnaire(_) => {
            text.parse::<u8>().ok().map(InputEvent::Rate)
        }
        Phase::RatReveal(_) => match text.to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(InputEvent::Answer(YesNo::Yes)),
            "n" | "no" => Some(InputEvent::Answer(YesNo::No)),
            _ => None,
        },
        _ => None,
    }
}
