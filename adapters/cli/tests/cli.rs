use std::process::{Command, Output};

use serde_json::Value;

fn castle_rooms(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_castle-rooms"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch castle-rooms binary")
}

#[test]
fn bundled_skirmish_reports_a_json_summary() {
    let output = castle_rooms(&["--ticks", "600", "--tick-millis", "50", "--summary-json"]);
    assert!(output.status.success(), "castle-rooms exited with {}", output.status);

    let summary: Value = serde_json::from_slice(&output.stdout).expect("stdout is a JSON summary");
    assert_eq!(summary["ticks"], 600);
    assert_eq!(summary["elapsed_ms"], 30_000);
    assert_eq!(summary["players"].as_array().map(Vec::len), Some(2));
    assert_eq!(summary["rooms"].as_array().map(Vec::len), Some(10));
    assert_eq!(summary["rooms"][0]["bought"], true);
    assert_eq!(summary["events"]["destructions"], 1);
    assert_eq!(summary["events"]["reversions"], 1);

    let delivered: Vec<u64> = summary["deliveries"]
        .as_array()
        .expect("deliveries listed")
        .iter()
        .filter_map(|delivery| delivery["amount"].as_u64())
        .collect();
    assert!(delivered.contains(&100), "blue drill delivered: {delivered:?}");
    assert!(delivered.contains(&200), "sharded drill delivered: {delivered:?}");
}

#[test]
fn missing_scenario_file_is_reported() {
    let output = castle_rooms(&["--scenario", "does/not/exist.toml"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to read scenario"),
        "unexpected stderr: {stderr}"
    );
}
