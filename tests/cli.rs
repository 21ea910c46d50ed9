use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

fn luxdraw_cmd() -> Command {
    Command::cargo_bin("luxdraw").expect("binary exists")
}

/// Normalized landmarks for a pointing hand with the index tip at `(x, y)`.
fn pointing_landmarks(x: f64, y: f64) -> Vec<[f64; 2]> {
    let mut points = vec![[0.5, 0.8]; 21];
    for (tip, pip) in [(12, 10), (16, 14), (20, 18)] {
        points[pip] = [0.5, 0.5];
        points[tip] = [0.5, 0.6];
    }
    points[8] = [x, y];
    points[6] = [x, y + 0.1];
    points
}

fn event(t_ms: u64, landmarks: Option<Vec<[f64; 2]>>) -> String {
    json!({"t_ms": t_ms, "width": 640, "height": 480, "landmarks": landmarks}).to_string()
}

/// Config whose recognizer ignores the image and always reads `text`.
fn write_config(temp: &TempDir, text: &str) -> std::path::PathBuf {
    let path = temp.path().join("config.toml");
    let config = format!(
        r#"
[recognition]
command = "sh"
args = ["-c", "cat >/dev/null; echo '{text}'"]
"#
    );
    std::fs::write(&path, config).unwrap();
    path
}

fn write_trace(temp: &TempDir, lines: &[String]) -> std::path::PathBuf {
    let path = temp.path().join("trace.jsonl");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn last_status(stdout: &[u8]) -> Value {
    let text = String::from_utf8_lossy(stdout);
    let last = text.lines().last().expect("at least one status line");
    serde_json::from_str(last).unwrap()
}

#[test]
fn luxdraw_help_prints_usage() {
    luxdraw_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Gesture-driven sketchpad that evaluates handwritten arithmetic",
        ));
}

#[test]
fn no_flags_prints_usage() {
    luxdraw_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("luxdraw --serve"));
}

#[test]
fn output_requires_replay() {
    luxdraw_cmd()
        .args(["--output", "out.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required arguments were not provided",
        ));
}

#[cfg(unix)]
#[test]
fn replay_recognizes_and_evaluates_after_idle() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "12x3");
    let trace = write_trace(
        &temp,
        &[
            event(0, Some(pointing_landmarks(0.3, 0.5))),
            event(33, Some(pointing_landmarks(0.4, 0.5))),
            event(66, Some(pointing_landmarks(0.5, 0.5))),
            event(100, None),
            event(3000, None),
            event(7100, None),
        ],
    );
    let png = temp.path().join("final.png");

    let assert = luxdraw_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--replay")
        .arg(&trace)
        .arg("--output")
        .arg(&png)
        .assert()
        .success();

    let status = last_status(&assert.get_output().stdout);
    assert_eq!(status["status"], "Result");
    assert_eq!(status["detectedText"], "12x3");
    assert_eq!(status["result"], "36");
    assert!(png.exists());
}

#[cfg(unix)]
#[test]
fn replay_reports_invalid_expression() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "5/0");
    let trace = write_trace(
        &temp,
        &[
            event(0, Some(pointing_landmarks(0.3, 0.5))),
            event(33, Some(pointing_landmarks(0.4, 0.5))),
            event(66, None),
            event(7066, None),
        ],
    );

    let assert = luxdraw_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--replay")
        .arg(&trace)
        .assert()
        .success();

    let status = last_status(&assert.get_output().stdout);
    assert_eq!(status["status"], "Invalid Expression");
    assert_eq!(status["result"], "Error");
}

#[test]
fn replay_of_blank_canvas_stays_idle() {
    let temp = TempDir::new().unwrap();
    let trace = write_trace(&temp, &[event(0, None), event(8000, None)]);

    let assert = luxdraw_cmd()
        .arg("--config")
        .arg(temp.path().join("absent.toml"))
        .arg("--replay")
        .arg(&trace)
        .assert()
        .success();

    let status = last_status(&assert.get_output().stdout);
    assert_eq!(status["status"], "Idle");
    assert_eq!(status["result"], "");
}

#[test]
fn serve_answers_control_requests() {
    let temp = TempDir::new().unwrap();
    let input = [
        r#"{"type":"ping"}"#,
        r#"{"type":"clear"}"#,
        "not json",
        r#"{"type":"frame","image":"data:image/png;base64,!!!"}"#,
    ]
    .join("\n");

    let assert = luxdraw_cmd()
        .arg("--config")
        .arg(temp.path().join("absent.toml"))
        .arg("--serve")
        .write_stdin(input)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let replies: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(replies.len(), 4);
    assert_eq!(replies[0]["message"], "LuxDraw backend is running and ready!");
    assert_eq!(replies[1]["message"], "Canvas cleared successfully");
    assert!(replies[2]["error"].is_string());
    assert!(replies[3]["error"].is_string());
}
