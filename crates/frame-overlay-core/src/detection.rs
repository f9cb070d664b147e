use serde::{Deserialize, Serialize};

use crate::{BoxForm, BoxSpec, DetectionError};

/// One flagged object within a single frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_label: String,
    /// Model confidence, nominally in `[0, 1]`. Finite values outside that
    /// range are kept as-is and show up verbatim in labels (`1.2` is `120%`).
    pub confidence: f64,
    #[serde(rename = "box")]
    pub bbox: BoxSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Free-text condition such as `"good"` or `"broken"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Detection {
    pub fn new(class_label: impl Into<String>, confidence: f64, bbox: BoxSpec) -> Self {
        Self {
            class_label: class_label.into(),
            confidence,
            bbox,
            category_id: None,
            condition: None,
        }
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Key used for category filtering and color lookup.
    ///
    /// This is `category_id` when set and non-empty, otherwise the class label.
    pub fn category_key(&self) -> &str {
        match self.category_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => &self.class_label,
        }
    }

    /// The condition text, if present and non-empty.
    pub fn condition_text(&self) -> Option<&str> {
        self.condition.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Check that this detection can be drawn when boxes are expected in
    /// `form`: the box must be well formed and the confidence finite.
    pub fn validate_as(&self, form: BoxForm) -> Result<(), DetectionError> {
        self.bbox.validate_as(form)?;
        if !self.confidence.is_finite() {
            return Err(DetectionError::NonFiniteConfidence(self.confidence));
        }
        Ok(())
    }
}
