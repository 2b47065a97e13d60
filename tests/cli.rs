extern crate assert_cmd;
extern crate escapegrid;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[test]
fn render_writes_a_png() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("fractal.png");

    Command::cargo_bin("render")
        .unwrap()
        .args(&["--width", "40", "--height", "30", "-s", "workers", "-w", "3", "-f"])
        .arg(&file)
        .assert()
        .success();

    let bytes = fs::read(&file).unwrap();
    assert_eq!(&bytes[..8], &PNG_SIGNATURE);
}

#[test]
fn render_accepts_negative_offsets() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("offset.png");

    Command::cargo_bin("render")
        .unwrap()
        .args(&["--width", "16", "--height", "16", "-x", "-0.75", "-z", "2", "-f"])
        .arg(&file)
        .assert()
        .success();

    assert!(file.exists());
}

#[test]
fn render_skips_empty_grids() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("empty.png");

    Command::cargo_bin("render")
        .unwrap()
        .args(&["--width", "0", "--height", "16", "-f"])
        .arg(&file)
        .assert()
        .success();

    assert!(!file.exists());
}

#[test]
fn render_rejects_unknown_strategies() {
    Command::cargo_bin("render")
        .unwrap()
        .args(&["-s", "quantum"])
        .assert()
        .failure();
}

#[test]
fn render_rejects_a_zero_zoom() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("render")
        .unwrap()
        .args(&["--width", "8", "--height", "8", "-z", "0", "-f"])
        .arg(dir.path().join("never.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("zoom must be non-zero"));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn render_refuses_sides_too_large_for_an_image() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("huge.png");

    Command::cargo_bin("render")
        .unwrap()
        .args(&["--width", "4294967296", "--height", "0", "-f"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("too large for an image"));

    assert!(!file.exists());
}

#[test]
fn benchmark_prints_one_line_per_measurement() {
    Command::cargo_bin("escapegrid")
        .unwrap()
        .args(&[
            "--max-size", "20", "--step", "10", "--rounds", "1", "--verify", "-s", "basic", "-s",
            "bufferedRowWorkers",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("basic 0 "))
        .stdout(predicate::str::contains("bufferedRowWorkers 20 "))
        .stdout(predicate::str::contains("workers 10").not());
}

#[test]
fn pipeline_appends_numbers_to_its_output() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("numbers.txt");

    Command::cargo_bin("pipeline")
        .unwrap()
        .args(&["--cadence-ms", "5", "-d", "200", "-c", "2", "-o"])
        .arg(&file)
        .assert()
        .success();

    let text = fs::read_to_string(&file).unwrap();
    assert!(text.lines().count() > 0);
    assert!(text.lines().all(|line| line.starts_with("Number is now: ")));
}

#[test]
fn pipeline_defaults_come_from_the_library() {
    Command::cargo_bin("pipeline")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "[default: {}]",
            escapegrid::pipeline::DEFAULT_CAPACITY
        )))
        .stdout(predicate::str::contains(format!(
            "[default: {}]",
            escapegrid::pipeline::DEFAULT_CADENCE.as_millis()
        )));
}
