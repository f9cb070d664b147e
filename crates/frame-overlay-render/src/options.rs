use std::collections::BTreeSet;

use frame_overlay_core::BoxForm;
use serde::{Deserialize, Serialize};

use crate::Color;

/// Outline styling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub line_width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { line_width: 2.0 }
    }
}

/// Translucent fill drawn inside each box. An opacity of `0` disables it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillStyle {
    pub opacity: f64,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self { opacity: 0.1 }
    }
}

/// Label typography and placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub font_px: f64,
    /// Space between the text and the edge of its background.
    pub padding: f64,
    /// Minimum clearance above a label before it is flipped below its box.
    pub margin: f64,
    pub text_color: Color,
    pub background_opacity: f64,
}

impl LabelStyle {
    /// Height of the label background.
    pub fn height(&self) -> f64 {
        self.font_px + 2.0 * self.padding
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_px: 12.0,
            padding: 3.0,
            margin: 2.0,
            text_color: Color::WHITE,
            background_opacity: 0.85,
        }
    }
}

/// Display options for one overlay instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    /// The only box form this overlay accepts; boxes of the other form are skipped.
    pub box_form: BoxForm,
    pub show_labels: bool,
    /// `None` shows every category.
    pub visible_categories: Option<BTreeSet<String>>,
    pub stroke: StrokeStyle,
    pub fill: FillStyle,
    pub label: LabelStyle,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self::comparison_popup()
    }
}

impl OverlayOptions {
    /// Side-by-side frame comparison: percentage boxes, light fill.
    pub fn comparison_popup() -> Self {
        Self {
            box_form: BoxForm::Percentage,
            show_labels: true,
            visible_categories: None,
            stroke: StrokeStyle::default(),
            fill: FillStyle::default(),
            label: LabelStyle::default(),
        }
    }

    /// Overlay on a playing video: heavier outline and fill so boxes read at speed.
    pub fn video_marker() -> Self {
        Self {
            stroke: StrokeStyle { line_width: 3.0 },
            fill: FillStyle { opacity: 0.2 },
            label: LabelStyle {
                font_px: 14.0,
                padding: 4.0,
                ..LabelStyle::default()
            },
            ..Self::comparison_popup()
        }
    }

    /// Asset detail sidebar: pixel boxes, outline only.
    pub fn detail_sidebar() -> Self {
        Self {
            box_form: BoxForm::Absolute,
            fill: FillStyle { opacity: 0.0 },
            label: LabelStyle {
                font_px: 11.0,
                ..LabelStyle::default()
            },
            ..Self::comparison_popup()
        }
    }

    /// Restrict drawing to the given categories.
    pub fn only<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visible_categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_visible(&self, category: &str) -> bool {
        self.visible_categories
            .as_ref()
            .is_none_or(|set| set.contains(category))
    }
}
