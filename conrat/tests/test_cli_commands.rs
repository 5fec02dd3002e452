mod common;

use common::{fixture_path, run_cli, run_cli_with_input};

fn path(name: &str) -> String {
    fixture_path(name).to_str().unwrap().to_string()
}

#[test]
fn validate_valid_files() {
    let output = run_cli(&[
        "validate",
        "--config",
        &path("valid.yaml"),
        "--puzzles",
        &path("puzzles.json"),
    ]);
    assert!(
        output.status.success(),
        "validate should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(": ok"));
    assert!(stdout.contains("6 groups, 1 duplicates dropped"));
}

#[test]
fn validate_invalid_config_exits_with_config_code() {
    let output = run_cli(&["validate", "--config", &path("invalid.yaml")]);
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("connections.blocks"));
    assert!(stdout.contains("rat.think_seconds"));
    assert!(stdout.contains("rat.items[0].cues"));
}

#[test]
fn validate_json_output() {
    let output = run_cli(&[
        "validate",
        "--format",
        "json",
        "--puzzles",
        &path("malformed_puzzles.json"),
    ]);
    assert_eq!(output.status.code(), Some(4));
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("output should be valid JSON");
    assert_eq!(parsed["config"]["valid"], true);
    assert_eq!(parsed["puzzles"]["valid"], false);
}

#[test]
fn version_json() {
    let output = run_cli(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["name"], "conrat");
}

#[test]
fn completions_bash() {
    let output = run_cli(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("conrat"));
}

#[test]
fn run_missing_puzzles_fails_before_session() {
    let output = run_cli(&["--quiet", "run", "--puzzles", "/nonexistent/puzzles.json"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(output.stdout.is_empty(), "nothing should be shown to the participant");
}

#[test]
fn run_skipped_session_writes_jsonl_markers() {
    let dir = tempfile::tempdir().unwrap();
    let markers = dir.path().join("markers.jsonl");
    let mut input = String::from("P42\n");
    input.push_str(&".\n".repeat(40));

    let output = run_cli_with_input(
        &[
            "--quiet",
            "run",
            "--puzzles",
            &path("puzzles.json"),
            "--config",
            &path("valid.yaml"),
            "--markers",
            markers.to_str().unwrap(),
        ],
        &input,
    );
    assert!(
        output.status.success(),
        "run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = std::fs::read_to_string(&markers).unwrap();
    let records: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records[0]["marker"], "PlayerP42_Session_Start");
    assert_eq!(records[0]["sequence"], 0);
    assert_eq!(
        records.last().unwrap()["marker"],
        "PlayerP42_PostSurvey_End"
    );
    for pair in records.windows(2) {
        assert!(pair[1]["sequence"].as_u64() > pair[0]["sequence"].as_u64());
    }
    let rests = records
        .iter()
        .filter(|r| r["marker"].as_str().unwrap().ends_with("_Rest_End"))
        .count();
    assert_eq!(rests, 4);
    assert!(String::from_utf8_lossy(&output.stdout).contains("THANK YOU"));
}

#[test]
fn run_ends_cleanly_when_input_closes() {
    let output = run_cli_with_input(
        &["--quiet", "run", "--puzzles", &path("puzzles.json"), "--config", &path("valid.yaml")],
        "P1\n",
    );
    assert!(output.status.success());
}
