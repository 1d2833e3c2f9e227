//! Smoke tests for the `clearcut` binary using the mock backend

#![cfg(feature = "cli")]

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn clearcut(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_clearcut"))
        .args(args)
        .output()
        .expect("failed to run clearcut")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_mock_run_saves_result() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("photo.png");
    std::fs::write(&input, PNG_SIGNATURE).unwrap();
    let out = temp.path().join("out");

    let output = clearcut(&[
        path_str(&input),
        "--backend",
        "mock",
        "--output-dir",
        path_str(&out),
        "--quiet",
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let saved = out.join("photo_clearcut.png");
    assert_eq!(std::fs::read(saved).unwrap(), PNG_SIGNATURE);
}

#[test]
fn test_json_progress_output() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("photo.png");
    std::fs::write(&input, PNG_SIGNATURE).unwrap();

    let output = clearcut(&[
        path_str(&input),
        "--backend",
        "mock",
        "--output-dir",
        path_str(temp.path()),
        "--json",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert!(events.iter().any(|e| e["status"] == "downloading_model"));
    assert!(events.iter().any(|e| e["status"] == "processing_image"));
    assert_eq!(events.last().unwrap()["event"], "saved");
}

#[test]
fn test_non_image_is_ignored() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("notes.txt");
    std::fs::write(&input, "hello").unwrap();

    let output = clearcut(&[
        path_str(&input),
        "--backend",
        "mock",
        "--output-dir",
        path_str(temp.path()),
        "--quiet",
    ]);

    assert!(output.status.success());
    assert!(!temp.path().join("notes_clearcut.png").exists());
}

#[test]
fn test_missing_program_fails() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("photo.png");
    std::fs::write(&input, PNG_SIGNATURE).unwrap();

    let output = clearcut(&[
        path_str(&input),
        "--program",
        "/nonexistent/clearcut-remover",
        "--output-dir",
        path_str(temp.path()),
        "--quiet",
    ]);

    assert!(!output.status.success());
    assert!(!temp.path().join("photo_clearcut.png").exists());
}
