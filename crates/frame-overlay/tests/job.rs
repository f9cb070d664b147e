use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;
use frame_overlay::io::{OverlayJob, OverlayReport};
use frame_overlay::raster::run_job;
use frame_overlay::{BoxForm, OverlayOptions};
use image::{Rgba, RgbaImage};

fn write_frame(dir: &Path, w: u32, h: u32) -> String {
    let path = dir.join("frame.png");
    RgbaImage::from_pixel(w, h, Rgba([40, 40, 40, 255]))
        .save(&path)
        .expect("write frame");
    path.to_string_lossy().into_owned()
}

fn write_detections(dir: &Path, json: &str) -> String {
    let path = dir.join("detections.json");
    fs::write(&path, json).expect("write detections");
    path.to_string_lossy().into_owned()
}

#[test]
fn job_letterboxes_frame_and_reports_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image_path = write_frame(dir.path(), 192, 108);
    let detections_path = write_detections(
        dir.path(),
        r#"[
            {"class_label": "Signage", "confidence": 0.9, "box": {"x": 10, "y": 10, "width": 20, "height": 20}},
            {"class_label": "Signage", "confidence": 0.9, "box": {"x": 10}},
            {"class_label": "Pothole", "confidence": 0.6, "box": {"x": 50, "y": 50, "width": 10, "height": 10}}
        ]"#,
    );

    let mut job = OverlayJob::new(image_path, detections_path);
    job.container = Some([80, 80]);
    job.output_path = Some(dir.path().join("out/overlay.png").to_string_lossy().into_owned());
    job.report_path = Some(dir.path().join("report.json").to_string_lossy().into_owned());
    job.options = OverlayOptions::comparison_popup().only(["Signage"]);

    let report = run_job(&job).expect("job runs");
    assert_eq!(report.summary.drawn, 1);
    assert_eq!(report.summary.filtered, 1);
    assert_eq!(report.skipped_records, 1);
    assert_abs_diff_eq!(report.render_rect.offset_y, 17.5, epsilon = 1e-9);

    let out = image::open(&report.output_path).expect("output image").to_rgba8();
    assert_eq!(out.dimensions(), (80, 80));
    // Top bar stays background black; the frame area is gray.
    assert_eq!(out.get_pixel(70, 2).0, [0, 0, 0, 255]);

    let saved = OverlayReport::load_json(job.report_path.as_deref().expect("report path"))
        .expect("report json");
    assert_eq!(saved, report);
}

#[test]
fn job_config_round_trips_through_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut job = OverlayJob::new("frame.jpg", "dets.json");
    job.container = Some([1280, 720]);
    job.options = OverlayOptions::detail_sidebar();
    let path = dir.path().join("job.json");
    job.write_json(&path).expect("write job");

    let back = OverlayJob::load_json(&path).expect("load job");
    assert_eq!(back, job);
    assert_eq!(back.options.box_form, BoxForm::Absolute);
}

#[test]
fn missing_image_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let detections_path = write_detections(dir.path(), "[]");
    let job = OverlayJob::new(
        dir.path().join("nope.png").to_string_lossy(),
        detections_path,
    );
    assert!(run_job(&job).is_err());
}
