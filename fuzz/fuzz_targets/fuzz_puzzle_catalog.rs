#![no_main]

use conrat_core::puzzle::{GROUPS_PER_PUZZLE, PuzzleCatalog, PuzzleGroup};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(groups) = serde_json::from_slice::<Vec<PuzzleGroup>>(data) else {
        return;
    };
    if let Ok(catalog) = PuzzleCatalog::from_groups(groups) {
        assert!(catalog.len() >= GROUPS_PER_PUZZLE);
    }
});
