//! JSON loading for detections, overlay jobs and reports.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{BoxForm, BoxSpec, Detection, FrameGeometry, RenderRect};
use crate::render::{CategoryPalette, OverlayOptions, RenderSummary};

#[derive(thiserror::Error, Debug)]
pub enum OverlayIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of detections or an object with a `detections` array")]
    NotAList,
}

/// Detections read from a file, plus how many records were unusable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedDetections {
    pub detections: Vec<Detection>,
    pub skipped: usize,
}

#[derive(Deserialize)]
struct DetectionRecord {
    #[serde(alias = "classLabel", alias = "label")]
    class_label: String,
    confidence: f64,
    #[serde(rename = "box", alias = "bbox")]
    bbox: Value,
    #[serde(default, alias = "categoryId")]
    category_id: Option<String>,
    #[serde(default)]
    condition: Option<String>,
}

fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key)?.as_f64()
}

/// Decode a box object in the form the caller expects.
///
/// An explicit `"form"` tag, when present, must agree with `form`.
fn decode_box(value: &Value, form: BoxForm) -> Option<BoxSpec> {
    let obj = value.as_object()?;
    if let Some(tag) = obj.get("form") {
        let tagged: BoxForm = serde_json::from_value(tag.clone()).ok()?;
        if tagged != form {
            return None;
        }
    }
    let bbox = match form {
        BoxForm::Percentage => BoxSpec::percentage(
            number(obj, "x")?,
            number(obj, "y")?,
            number(obj, "width")?,
            number(obj, "height")?,
        ),
        BoxForm::Absolute => BoxSpec::absolute(
            number(obj, "x1")?,
            number(obj, "y1")?,
            number(obj, "x2")?,
            number(obj, "y2")?,
        ),
    };
    bbox.validate().ok()?;
    Some(bbox)
}

fn decode_record(value: Value, form: BoxForm) -> Option<Detection> {
    let record: DetectionRecord = serde_json::from_value(value).ok()?;
    let bbox = decode_box(&record.bbox, form)?;
    Some(Detection {
        class_label: record.class_label,
        confidence: record.confidence,
        bbox,
        category_id: record.category_id,
        condition: record.condition,
    })
}

/// Parse detections from JSON text.
///
/// Accepts a bare array or an object with a `detections` array. Records that
/// cannot be decoded in `form` are skipped and counted; only a document that is
/// not JSON, or has no list of records, is an error.
pub fn parse_detections_json(raw: &str, form: BoxForm) -> Result<LoadedDetections, OverlayIoError> {
    let doc: Value = serde_json::from_str(raw)?;
    let records = match doc {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("detections") {
            Some(Value::Array(items)) => items,
            _ => return Err(OverlayIoError::NotAList),
        },
        _ => return Err(OverlayIoError::NotAList),
    };

    let mut loaded = LoadedDetections::default();
    for (idx, record) in records.into_iter().enumerate() {
        match decode_record(record, form) {
            Some(det) => loaded.detections.push(det),
            None => {
                warn!("skipping detection record {idx}: not a valid {form} detection");
                loaded.skipped += 1;
            }
        }
    }
    Ok(loaded)
}

/// Load detections from a JSON file. See [`parse_detections_json`].
pub fn load_detections_json(
    path: impl AsRef<Path>,
    form: BoxForm,
) -> Result<LoadedDetections, OverlayIoError> {
    let raw = fs::read_to_string(path)?;
    parse_detections_json(&raw, form)
}

/// Description of one overlay rendering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayJob {
    pub image_path: String,
    pub detections_path: String,
    /// Container size `[width, height]`; defaults to the image size.
    #[serde(default)]
    pub container: Option<[u32; 2]>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub report_path: Option<String>,
    #[serde(default)]
    pub options: OverlayOptions,
    #[serde(default)]
    pub palette: Option<CategoryPalette>,
}

impl OverlayJob {
    pub fn new(image_path: impl Into<String>, detections_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            detections_path: detections_path.into(),
            container: None,
            output_path: None,
            report_path: None,
            options: OverlayOptions::default(),
            palette: None,
        }
    }

    /// Load a JSON job from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, OverlayIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this job to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), OverlayIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output image path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("overlay.png"))
    }

    /// Resolve relative paths against `base`, typically the job file's directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &mut String| {
            if Path::new(p.as_str()).is_relative() {
                *p = base.join(p.as_str()).to_string_lossy().into_owned();
            }
        };
        join(&mut self.image_path);
        join(&mut self.detections_path);
        if let Some(out) = self.output_path.as_mut() {
            join(out);
        }
        if let Some(report) = self.report_path.as_mut() {
            join(report);
        }
    }

    pub fn palette(&self) -> CategoryPalette {
        self.palette
            .clone()
            .unwrap_or_else(CategoryPalette::road_assets)
    }
}

/// What a job produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayReport {
    pub image_path: String,
    pub output_path: String,
    pub geometry: FrameGeometry,
    pub render_rect: RenderRect,
    pub summary: RenderSummary,
    /// Records dropped while loading the detections file.
    pub skipped_records: usize,
}

impl OverlayReport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, OverlayIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), OverlayIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_bad_record_does_not_blank_the_list() {
        let raw = r#"[
            {"class_label": "Signage", "confidence": 0.9, "box": {"x": 1, "y": 2, "width": 3, "height": 4}},
            {"class_label": "Signage", "confidence": 0.9, "box": {"x": 1, "y": 2}},
            {"class_label": "Kerb", "confidence": 0.4, "box": {"x": 5, "y": 5, "width": 1, "height": 1}, "condition": "good"}
        ]"#;
        let loaded = parse_detections_json(raw, BoxForm::Percentage).expect("parse");
        assert_eq!(loaded.detections.len(), 2);
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.detections[1].condition.as_deref(), Some("good"));
    }

    #[test]
    fn form_is_chosen_by_caller_not_by_fields() {
        let raw = r#"{"detections": [
            {"classLabel": "Manhole", "confidence": 0.7, "bbox": {"x1": 10, "y1": 10, "x2": 20, "y2": 30}, "categoryId": "mh"}
        ]}"#;
        let pct = parse_detections_json(raw, BoxForm::Percentage).expect("parse");
        assert!(pct.detections.is_empty());
        assert_eq!(pct.skipped, 1);

        let abs = parse_detections_json(raw, BoxForm::Absolute).expect("parse");
        assert_eq!(abs.detections.len(), 1);
        assert_eq!(abs.detections[0].bbox, BoxSpec::absolute(10.0, 10.0, 20.0, 30.0));
        assert_eq!(abs.detections[0].category_key(), "mh");
    }

    #[test]
    fn tagged_boxes_must_match_requested_form() {
        let raw = r#"[{"class_label": "Crack", "confidence": 0.3,
            "box": {"form": "absolute", "x": 1, "y": 1, "width": 1, "height": 1}}]"#;
        let loaded = parse_detections_json(raw, BoxForm::Percentage).expect("parse");
        assert_eq!(loaded.skipped, 1);
    }

    #[test]
    fn inverted_corners_are_skipped() {
        let raw = r#"[{"class_label": "Crack", "confidence": 0.3, "box": {"x1": 9, "y1": 0, "x2": 1, "y2": 5}}]"#;
        let loaded = parse_detections_json(raw, BoxForm::Absolute).expect("parse");
        assert_eq!(loaded.skipped, 1);
    }

    #[test]
    fn non_list_documents_are_errors() {
        assert!(matches!(
            parse_detections_json(r#"{"items": []}"#, BoxForm::Percentage),
            Err(OverlayIoError::NotAList)
        ));
        assert!(matches!(
            parse_detections_json("not json", BoxForm::Percentage),
            Err(OverlayIoError::Json(_))
        ));
    }

    #[test]
    fn relative_job_paths_resolve_against_base() {
        let mut job = OverlayJob::new("frame.jpg", "/abs/dets.json");
        job.output_path = Some("out/overlay.png".into());
        job.resolve_paths(Path::new("/jobs/site-7"));
        assert_eq!(job.image_path, "/jobs/site-7/frame.jpg");
        assert_eq!(job.detections_path, "/abs/dets.json");
        assert_eq!(job.output_path(), PathBuf::from("/jobs/site-7/out/overlay.png"));
    }
}
