use rating_engine::{
    dataset::{write_json, Dataset},
    utils::test_utils::{generate_matches, generate_players}
};
use std::{path::PathBuf, process::Command};

const BINARY: &str = env!("CARGO_BIN_EXE_rating-engine");

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rating-engine-cli-{}-{}", std::process::id(), name))
}

/// The binary exits with an error code when the dataset cannot be read
#[test]
fn test_missing_dataset_fails() {
    let output = Command::new(BINARY)
        .args(["recalculate", "--input", "/nonexistent/dataset.json"])
        .env("RUST_LOG", "error")
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to access"), "stderr: {}", stderr);
}

#[test]
fn test_recalculate_writes_output() {
    let players = generate_players(6);
    let dataset = Dataset {
        matches: generate_matches(20, &players),
        players,
        weights: None
    };
    let input = temp_path("input.json");
    let output_path = temp_path("output.json");
    write_json(&dataset, Some(&input)).unwrap();

    let output = Command::new(BINARY)
        .args(["--log-level", "warn", "recalculate", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    std::fs::remove_file(&input).unwrap();
    std::fs::remove_file(&output_path).unwrap();

    assert_eq!(written["ratings"].as_array().unwrap().len(), 6);
    assert_eq!(written["reports"].as_array().unwrap().len(), 3);
    assert!(written["trained_weights"].is_object());
}

#[test]
fn test_invalid_environment_override_fails() {
    let players = generate_players(2);
    let dataset = Dataset {
        matches: generate_matches(2, &players),
        players,
        weights: None
    };
    let input = temp_path("env-input.json");
    write_json(&dataset, Some(&input)).unwrap();

    let output = Command::new(BINARY)
        .args(["recalculate", "--input"])
        .arg(&input)
        .env("TRAINING_ITERATIONS", "lots")
        .output()
        .expect("Failed to execute binary");
    std::fs::remove_file(&input).unwrap();

    assert!(!output.status.success());
}
