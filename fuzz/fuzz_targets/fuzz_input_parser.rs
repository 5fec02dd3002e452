#![no_main]

use conrat::experiment::{InputEvent, InstructionKind, Phase};
use conrat::frontend::parse_line;
use libfuzzer_sys::fuzz_target;

const PHASES: [Phase; 9] = [
    Phase::ParticipantId,
    Phase::Intro,
    Phase::Instructions(InstructionKind::Connections),
    Phase::ConnectionsPuzzle(1),
    Phase::ConnectionsRest(1),
    Phase::RatThink(1),
    Phase::RatReveal(1),
    Phase::Questionnaire(1),
    Phase::Exit,
];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(line) = std::str::from_utf8(rest) else {
        return;
    };
    let phase = PHASES[usize::from(selector) % PHASES.len()];
    match parse_line(line, phase) {
        Some(InputEvent::ToggleTile(_) | InputEvent::DeselectAll) => {
            assert!(matches!(phase, Phase::ConnectionsPuzzle(_)));
        }
        Some(InputEvent::SubmitId(id)) => {
            assert_eq!(phase, Phase::ParticipantId);
            assert!(!id.trim().is_empty());
        }
        _ => {}
    }
});
