//! CLI integration tests
//!
//! These run the `nou` binary against the sample files in `data/`.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn nou() -> Command {
    Command::cargo_bin("nou").unwrap()
}

fn json_output(args: &[&str]) -> Value {
    let output = nou().args(args).assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn vec3(value: &Value) -> [f64; 3] {
    let a = value.as_array().unwrap();
    [a[0].as_f64().unwrap(), a[1].as_f64().unwrap(), a[2].as_f64().unwrap()]
}

fn assert_close(actual: [f64; 3], expected: [f64; 3]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-4, "{actual:?} != {expected:?}");
    }
}

#[test]
fn test_help_lists_commands() {
    nou()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rig"))
        .stdout(predicate::str::contains("scene"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_rig_info() {
    let rig = data_file("arm_rig.yaml");
    nou()
        .args(["rig", "info", "--no-color"])
        .arg(&rig)
        .assert()
        .success()
        .stdout(predicate::str::contains("Joints: 3"))
        .stdout(predicate::str::contains("└── 🦴 wrist"))
        .stdout(predicate::str::contains("swing"))
        .stdout(predicate::str::contains("additive"))
        .stdout(predicate::str::contains("scale channel"));
}

#[test]
fn test_rig_play_json() {
    let rig = data_file("arm_rig.yaml");
    let rows = json_output(&[
        "rig",
        "play",
        rig.to_str().unwrap(),
        "--frames",
        "2",
        "--dt",
        "0.5",
        "--format",
        "json",
    ]);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);

    // Shoulder swung up 90 degrees, elbow bent by half of the additive 90
    assert_eq!(rows[1]["joint"], "elbow");
    assert_eq!(rows[1]["parent"], "shoulder");
    assert_close(vec3(&rows[1]["position"]), [0.0, 1.0, 0.0]);

    let h = std::f64::consts::FRAC_1_SQRT_2;
    assert_close(vec3(&rows[2]["position"]), [-h, 1.0 + h, 0.0]);
    assert_close(vec3(&rows[2]["rotation"]), [0.0, 0.0, 135.0]);
}

#[test]
fn test_rig_sample_wraps_time() {
    let rig = data_file("arm_rig.yaml");
    let rows = json_output(&[
        "rig",
        "sample",
        rig.to_str().unwrap(),
        "--clip",
        "swing",
        "--time",
        "3.0",
        "--format",
        "json",
    ]);
    assert_eq!(rows[0]["joint"], "shoulder");
    assert_close(vec3(&rows[0]["rotation"]), [0.0, 0.0, 90.0]);
    assert_close(vec3(&rows[1]["position"]), [1.0, 0.0, 0.0]);
}

#[test]
fn test_rig_sample_unknown_clip() {
    nou()
        .args(["rig", "sample"])
        .arg(data_file("arm_rig.yaml"))
        .args(["--clip", "dance"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown clip 'dance'"))
        .stderr(predicate::str::contains("swing, bend"));
}

#[test]
fn test_scene_eval_json() {
    let scene = data_file("arm_scene.json");
    let rows = json_output(&["scene", "eval", scene.to_str().unwrap(), "--format", "json"]);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 4);

    let find = |name: &str| {
        rows.iter()
            .find(|r| r["node"] == name)
            .unwrap_or_else(|| panic!("missing {name}"))
    };
    assert_close(vec3(&find("forearm")["position"]), [0.0, 2.0, 0.0]);
    assert_close(vec3(&find("forearm")["scale"]), [2.0, 2.0, 2.0]);
    assert_close(vec3(&find("hand")["position"]), [0.0, 4.0, 0.0]);
    assert_eq!(find("hand")["depth"], 2);
    assert_close(vec3(&find("lamp")["position"]), [3.0, 0.0, 0.0]);

    // Parents come before children
    let depths: Vec<u64> = rows.iter().map(|r| r["depth"].as_u64().unwrap()).collect();
    assert!(depths.windows(2).all(|w| w[0] <= w[1]), "{depths:?}");
}

#[test]
fn test_scene_eval_tree() {
    nou()
        .args(["scene", "eval", "--no-color"])
        .arg(data_file("arm_scene.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("🔹 arm"))
        .stdout(predicate::str::contains("🔹 hand (0.000, 4.000, 0.000)"));
}

#[test]
fn test_scene_cycle_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("loop.yaml");
    fs::write(
        &path,
        "nodes:\n  - name: a\n    parent: b\n  - name: b\n    parent: a\n",
    )
    .unwrap();

    nou()
        .args(["scene", "eval"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle"));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rig.txt");
    fs::write(&path, "skin: {joints: []}").unwrap();

    nou()
        .args(["rig", "info"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file extension"));
}

#[test]
fn test_completions() {
    nou()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nou"));
}
