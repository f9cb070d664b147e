use std::fs;

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;

fn bin() -> Command {
    Command::cargo_bin("frame-overlay").expect("binary built")
}

#[test]
fn render_writes_container_sized_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("frame.png");
    RgbaImage::from_pixel(64, 36, Rgba([10, 20, 30, 255]))
        .save(&image)
        .expect("write frame");
    let dets = dir.path().join("dets.json");
    fs::write(
        &dets,
        r#"[{"class_label": "Guardrail", "confidence": 0.77, "box": {"x1": 4, "y1": 4, "x2": 40, "y2": 30}, "condition": "bent"}]"#,
    )
    .expect("write detections");
    let out = dir.path().join("overlay.png");

    bin()
        .args(["render", "--preset", "sidebar", "--width", "100", "--height", "100"])
        .arg("--image")
        .arg(&image)
        .arg("--detections")
        .arg(&dets)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("drawn 1"));

    let written = image::open(&out).expect("overlay png");
    assert_eq!((written.width(), written.height()), (100, 100));
}

#[test]
fn job_subcommand_resolves_paths_next_to_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    RgbaImage::from_pixel(32, 32, Rgba([0, 0, 0, 255]))
        .save(dir.path().join("frame.png"))
        .expect("write frame");
    fs::write(dir.path().join("dets.json"), "[]").expect("write detections");
    fs::write(
        dir.path().join("job.json"),
        r#"{"image_path": "frame.png", "detections_path": "dets.json", "output_path": "out.png"}"#,
    )
    .expect("write job");

    bin()
        .arg("job")
        .arg(dir.path().join("job.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("drawn 0"));
    assert!(dir.path().join("out.png").exists());
}

#[test]
fn missing_detections_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("frame.png");
    RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]))
        .save(&image)
        .expect("write frame");

    bin()
        .arg("render")
        .arg("--image")
        .arg(&image)
        .arg("--detections")
        .arg(dir.path().join("missing.json"))
        .arg("--out")
        .arg(dir.path().join("out.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
