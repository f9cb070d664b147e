//! Drawing surfaces and the commands replayed onto them.
//!
//! Any immediate-mode 2D canvas can back an overlay: it needs to clear,
//! stroke and fill rectangles, and draw text whose width it can report.
//! Coordinates are container pixels and may fall outside the surface;
//! implementations clip silently.

use frame_overlay_core::ContainerRect;
use serde::{Deserialize, Serialize};

use crate::Color;

/// Reports the rendered width of a string.
pub trait TextMetrics {
    fn measure_text(&self, text: &str, font_px: f64) -> f64;
}

/// Minimal immediate-mode canvas.
pub trait DrawSurface: TextMetrics {
    /// Clear `[0, width] x [0, height]` to fully transparent.
    fn clear(&mut self, width: f64, height: f64);
    fn stroke_rect(&mut self, rect: &ContainerRect, color: Color, line_width: f64);
    /// Fill with `color` at opacity `alpha` in `[0, 1]`.
    fn fill_rect(&mut self, rect: &ContainerRect, color: Color, alpha: f64);
    /// Draw `text` with its top-left corner at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color, font_px: f64);
}

/// One recorded drawing operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
    },
    StrokeRect {
        rect: ContainerRect,
        color: Color,
        line_width: f64,
    },
    FillRect {
        rect: ContainerRect,
        color: Color,
        alpha: f64,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        color: Color,
        font_px: f64,
    },
}

impl DrawCommand {
    /// Replay this command onto `surface`.
    pub fn apply<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        match self {
            DrawCommand::Clear { width, height } => surface.clear(*width, *height),
            DrawCommand::StrokeRect {
                rect,
                color,
                line_width,
            } => surface.stroke_rect(rect, *color, *line_width),
            DrawCommand::FillRect { rect, color, alpha } => surface.fill_rect(rect, *color, *alpha),
            DrawCommand::Text {
                text,
                x,
                y,
                color,
                font_px,
            } => surface.fill_text(text, *x, *y, *color, *font_px),
        }
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, DrawCommand::Clear { .. })
    }
}

/// Width estimate for a monospace face: `chars * font_px * advance_ratio`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMetrics {
    pub advance_ratio: f64,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn measure_text(&self, text: &str, font_px: f64) -> f64 {
        text.chars().count() as f64 * font_px * self.advance_ratio
    }
}

/// Surface that records every call, for headless planning and tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    metrics: MonospaceMetrics,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: MonospaceMetrics) -> Self {
        Self {
            commands: Vec::new(),
            metrics,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Recorded commands other than clears.
    pub fn draw_calls(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| !c.is_clear())
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl TextMetrics for RecordingSurface {
    fn measure_text(&self, text: &str, font_px: f64) -> f64 {
        self.metrics.measure_text(text, font_px)
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn stroke_rect(&mut self, rect: &ContainerRect, color: Color, line_width: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            rect: *rect,
            color,
            line_width,
        });
    }

    fn fill_rect(&mut self, rect: &ContainerRect, color: Color, alpha: f64) {
        self.commands.push(DrawCommand::FillRect {
            rect: *rect,
            color,
            alpha,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color, font_px: f64) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            color,
            font_px,
        });
    }
}
