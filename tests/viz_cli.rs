use std::fs;
use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_viz_cli"))
}

fn fixture_file(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("viz_cli_{}_{}", std::process::id(), name))
}

#[test]
fn replay_fixture_walks_every_index() {
    let output = cli()
        .args([
            "replay",
            "--fixture",
            &fixture_file("features.json"),
            "--seed",
            "7",
        ])
        .output()
        .expect("failed to run viz_cli replay");
    assert!(
        output.status.success(),
        "CLI exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let report: Value = serde_json::from_str(stdout.trim()).expect("run report JSON payload");

    // 160 records at 46.4 ms per poll and 60 fps
    assert_eq!(report["summary"]["frames"], 446);
    assert_eq!(report["summary"]["interrupted"], false);
    let streams = report["streams"].as_array().expect("streams array");
    assert_eq!(streams.len(), 3);
    for stream in streams {
        assert_eq!(stream["next_index"], 160, "stream {stream}");
        assert_eq!(stream["failed"], 0, "stream {stream}");
        assert_eq!(stream["dropped"], 0, "stream {stream}");
    }
}

#[test]
fn replay_writes_frame_lines_covering_each_mode() {
    let frames_out = temp_path("frames.jsonl");
    let output = cli()
        .args([
            "replay",
            "--fixture",
            &fixture_file("features.json"),
            "--seed",
            "7",
            "--frames-out",
        ])
        .arg(&frames_out)
        .output()
        .expect("failed to run viz_cli replay");
    assert!(output.status.success());

    let contents = fs::read_to_string(&frames_out).expect("frame output written");
    let _ = fs::remove_file(&frames_out);
    let modes: Vec<String> = contents
        .lines()
        .map(|line| {
            let frame: Value = serde_json::from_str(line).expect("frame JSON line");
            frame["mode"].as_str().unwrap_or_default().to_string()
        })
        .collect();

    assert_eq!(modes.len(), 446);
    assert_eq!(modes[0], "organic");
    for expected in ["kick", "shooting_star", "frequency_high", "water_ink", "metallic"] {
        assert!(
            modes.iter().any(|m| m == expected),
            "expected a {expected} frame"
        );
    }
}

#[test]
fn replay_honours_frame_limit() {
    let output = cli()
        .args([
            "replay",
            "--fixture",
            &fixture_file("features.json"),
            "--frames",
            "12",
        ])
        .output()
        .expect("failed to run viz_cli replay");
    assert!(output.status.success());
    let report: Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).expect("report");
    assert_eq!(report["summary"]["frames"], 12);
}

#[test]
fn missing_fixture_fails_with_exit_code_one() {
    let output = cli()
        .args(["replay", "--fixture", "/definitely/not/here.json"])
        .output()
        .expect("failed to run viz_cli replay");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("here.json"), "stderr was {stderr}");
}

#[test]
fn invalid_config_values_are_rejected() {
    let config_path = temp_path("bad_config.json");
    fs::write(&config_path, r#"{ "field": { "width": 0 } }"#).expect("write config");

    let output = cli()
        .args(["replay", "--fixture", &fixture_file("features.json"), "--config"])
        .arg(&config_path)
        .output()
        .expect("failed to run viz_cli replay");
    let _ = fs::remove_file(&config_path);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn defaults_prints_config_json() {
    let output = cli()
        .arg("defaults")
        .output()
        .expect("failed to run viz_cli defaults");
    assert!(output.status.success());
    let config: Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).expect("config");
    assert_eq!(config["server"]["base_url"], "http://127.0.0.1:5050");
    assert_eq!(config["polling"]["frame_length"], 2048);
    assert_eq!(config["modes"]["history_capacity"], 100);
}

#[test]
fn debug_verbosity_streams_mode_changes() {
    let output = cli()
        .args([
            "-vv",
            "replay",
            "--fixture",
            &fixture_file("features.json"),
            "--seed",
            "7",
        ])
        .output()
        .expect("failed to run viz_cli replay");
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("mode changed"),
        "expected live mode changes on stderr"
    );
    let report: Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).expect("report");
    assert_eq!(report["summary"]["frames"], 446);
}

#[test]
fn quiet_run_does_not_stream_mode_changes() {
    let output = cli()
        .args([
            "replay",
            "--fixture",
            &fixture_file("features.json"),
            "--frames",
            "60",
        ])
        .output()
        .expect("failed to run viz_cli replay");
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("mode changed"));
}

#[cfg(target_os = "linux")]
#[test]
fn failed_frame_output_is_reported() {
    let output = cli()
        .args([
            "replay",
            "--fixture",
            &fixture_file("features.json"),
            "--frames-out",
            "/dev/full",
        ])
        .output()
        .expect("failed to run viz_cli replay");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(
        stderr.contains("flushing frame output"),
        "stderr was {stderr}"
    );
}
