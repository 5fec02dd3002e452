mod common;

use common::{Scripted, config};
use conrat::experiment::{Phase, Stage};
use conrat_core::RatingResponse;

#[test]
fn skip_on_id_screen_does_nothing() {
    let mut s = Scripted::new(config(1, 1, 1));
    s.skip().skip();
    assert_eq!(s.phase(), Phase::ParticipantId);
    assert!(s.labels().is_empty());
}

#[test]
fn skipping_everything_still_marks_every_boundary() {
    let mut s = Scripted::new(config(1, 1, 1));
    s.id("9");
    let mut skips = 0;
    while s.phase() != Phase::Finished {
        s.skip();
        skips += 1;
        assert!(skips < 50, "stuck at {}", s.phase());
    }

    assert_eq!(
        s.labels(),
        vec![
            "Session_Start",
            "Connections1_Start",
            "Connections1_Rest_Start",
            "ConnectionQ1_NoResponse",
            "Connections1_Rest_End",
            "RAT1_Start",
            "RAT1_Response_N",
            "RAT1_End",
            "RAT1_Rest_Start",
            "RAT1_Rest_End",
            "PostSurvey_Start",
            "PostQ1_NoResponse",
            "PostSurvey_End",
        ]
    );
    assert_eq!(s.session().connections_completed, 1);
    assert_eq!(
        s.session().questionnaire_responses,
        vec![RatingResponse::NoResponse]
    );
    assert_eq!(s.controller.scheduler_mut().pending(), 0);
}

#[test]
fn skip_during_rest_keeps_bound_rating() {
    let mut s = Scripted::new(config(2, 1, 1));
    s.id("1").cont().cont().solve().wait_ms(2500);
    s.rate(2).wait_secs(3).skip();

    assert_eq!(s.phase(), Phase::ConnectionsPuzzle(2));
    let labels = s.labels();
    assert!(labels.contains(&"ConnectionQ1_2".to_string()));
    assert!(!labels.contains(&"ConnectionQ1_NoResponse".to_string()));
    assert_eq!(s.controller.scheduler_mut().pending(), 0);
}

#[test]
fn skip_during_solved_display_completes_block_once() {
    let mut s = Scripted::new(config(2, 1, 1));
    s.id("1").cont().cont().solve().wait_ms(100).skip();
    assert_eq!(s.phase(), Phase::ConnectionsRest(1));

    // The cancelled display delay would have been due here.
    s.wait_ms(3000);
    assert_eq!(s.phase(), Phase::ConnectionsRest(1));
    let rest_starts = s
        .labels()
        .iter()
        .filter(|l| *l == "Connections1_Rest_Start")
        .count();
    assert_eq!(rest_starts, 1);
    assert_eq!(s.session().connections_completed, 1);
}

#[test]
fn skip_on_unsolved_puzzle_grants_no_match() {
    let mut s = Scripted::new(config(1, 1, 1));
    s.id("1").cont().cont().wrong_guess().skip();

    assert_eq!(s.phase(), Phase::ConnectionsRest(1));
    let labels = s.labels();
    assert!(labels.contains(&"Connections1_Guess1_Incorrect".to_string()));
    assert!(!labels.iter().any(|l| l.ends_with("_Correct") || l == "Connections1_End"));
}

#[test]
fn skipped_think_countdown_leaves_no_wakeup_behind() {
    let mut s = Scripted::new(config(1, 2, 1));
    s.id("1").cont().cont().skip().skip().cont();
    assert_eq!(s.phase(), Phase::RatThink(1));

    s.wait_secs(3).skip();
    assert_eq!(s.phase(), Phase::RatReveal(1));
    s.wait_secs(60);
    assert_eq!(s.phase(), Phase::RatReveal(1));
    assert_eq!(s.labels().last().map(String::as_str), Some("RAT1_Start"));
}

#[test]
fn skip_during_rat_rest_moves_to_next_item() {
    let mut s = Scripted::new(config(1, 2, 1));
    s.id("1").cont().cont().skip().skip().cont();
    s.skip().skip();
    assert_eq!(s.phase(), Phase::RatRest(1));
    s.skip();
    assert_eq!(s.phase(), Phase::RatThink(2));
    assert!(matches!(s.controller.stage(), Stage::Rat(_)));
}
