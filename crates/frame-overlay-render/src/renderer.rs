use frame_overlay_core::{
    compute_render_rect, map_box_to_container, ContainerRect, Detection, FrameGeometry,
    GeometryError, Point2, RenderRect,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::label::{format_label, place_label};
use crate::surface::{DrawCommand, DrawSurface, TextMetrics};
use crate::{CategoryPalette, ColorLookup, OverlayOptions};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Per-draw counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSummary {
    pub drawn: usize,
    /// Hidden by the category filter.
    pub filtered: usize,
    /// Dropped because the box or confidence was unusable.
    pub malformed: usize,
}

/// Draw commands for one frame, in execution order.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayPlan {
    pub render_rect: RenderRect,
    pub commands: Vec<DrawCommand>,
    pub summary: RenderSummary,
}

/// Draws detection boxes over a letterboxed frame.
///
/// The renderer holds only configuration. Every call recomputes placement
/// from the geometry it is given, so it can be called on every resize, seek or
/// animation frame.
#[derive(Clone, Debug)]
pub struct OverlayRenderer<C = CategoryPalette> {
    options: OverlayOptions,
    colors: C,
}

impl Default for OverlayRenderer<CategoryPalette> {
    fn default() -> Self {
        Self::new(OverlayOptions::default(), CategoryPalette::road_assets())
    }
}

impl<C: ColorLookup> OverlayRenderer<C> {
    pub fn new(options: OverlayOptions, colors: C) -> Self {
        Self { options, colors }
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OverlayOptions {
        &mut self.options
    }

    pub fn colors(&self) -> &C {
        &self.colors
    }

    /// Build the draw commands for `detections` without touching a surface.
    ///
    /// The plan always starts with a clear of the whole container. Detections
    /// keep their input order; for each one the outline comes first, then the
    /// fill, the label background and the label text.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, metrics, detections),
            fields(count = detections.len())
        )
    )]
    pub fn plan<M: TextMetrics + ?Sized>(
        &self,
        metrics: &M,
        geometry: &FrameGeometry,
        detections: &[Detection],
    ) -> Result<OverlayPlan, GeometryError> {
        let render_rect = compute_render_rect(geometry).inspect_err(|err| {
            if err.is_not_ready() {
                debug!("frame not ready, skipping overlay: {err}");
            }
        })?;

        let opts = &self.options;
        let mut commands = vec![DrawCommand::Clear {
            width: geometry.container_width,
            height: geometry.container_height,
        }];
        let mut summary = RenderSummary::default();

        for (idx, det) in detections.iter().enumerate() {
            let category = det.category_key();
            if !opts.is_visible(category) {
                summary.filtered += 1;
                continue;
            }
            if let Err(err) = det.validate_as(opts.box_form) {
                warn!("skipping detection {idx} ({}): {err}", det.class_label);
                summary.malformed += 1;
                continue;
            }

            let rect = map_box_to_container(&det.bbox, geometry, &render_rect);
            let color = self.colors.color_for(category);

            commands.push(DrawCommand::StrokeRect {
                rect,
                color,
                line_width: opts.stroke.line_width,
            });
            if opts.fill.opacity > 0.0 {
                commands.push(DrawCommand::FillRect {
                    rect,
                    color,
                    alpha: opts.fill.opacity,
                });
            }
            if opts.show_labels {
                let style = &opts.label;
                let text = format_label(det);
                let width = metrics.measure_text(&text, style.font_px);
                let placement = place_label(&rect, width, style);
                commands.push(DrawCommand::FillRect {
                    rect: placement.background,
                    color,
                    alpha: style.background_opacity,
                });
                commands.push(DrawCommand::Text {
                    text,
                    x: placement.text_origin.x,
                    y: placement.text_origin.y,
                    color: style.text_color,
                    font_px: style.font_px,
                });
            }
            summary.drawn += 1;
        }

        debug!(
            "planned overlay: drawn={} filtered={} malformed={}",
            summary.drawn, summary.filtered, summary.malformed
        );
        Ok(OverlayPlan {
            render_rect,
            commands,
            summary,
        })
    }

    /// Clear `surface` and draw `detections` on it.
    ///
    /// When the geometry is unusable (for instance the media has not loaded
    /// and reports `0x0`) nothing is drawn and the surface is left untouched.
    pub fn render<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        geometry: &FrameGeometry,
        detections: &[Detection],
    ) -> Result<RenderSummary, GeometryError> {
        let plan = self.plan(&*surface, geometry, detections)?;
        for cmd in &plan.commands {
            cmd.apply(surface);
        }
        Ok(plan.summary)
    }

    /// Index of the top-most drawn detection under a container-space point.
    ///
    /// Later detections are drawn over earlier ones, so the search runs from
    /// the end. Hidden and malformed detections never match.
    pub fn hit_test(
        &self,
        geometry: &FrameGeometry,
        detections: &[Detection],
        point: Point2<f64>,
    ) -> Result<Option<usize>, GeometryError> {
        let render_rect = compute_render_rect(geometry)?;
        Ok(detections
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, d)| self.options.is_visible(d.category_key()))
            .filter(|(_, d)| d.validate_as(self.options.box_form).is_ok())
            .find(|(_, d)| {
                map_box_to_container(&d.bbox, geometry, &render_rect).contains(point)
            })
            .map(|(idx, _)| idx))
    }

    /// Container-space rectangle of every drawable detection, by input index.
    pub fn boxes(
        &self,
        geometry: &FrameGeometry,
        detections: &[Detection],
    ) -> Result<Vec<(usize, ContainerRect)>, GeometryError> {
        let render_rect = compute_render_rect(geometry)?;
        Ok(detections
            .iter()
            .enumerate()
            .filter(|(_, d)| self.options.is_visible(d.category_key()))
            .filter(|(_, d)| d.validate_as(self.options.box_form).is_ok())
            .map(|(idx, d)| (idx, map_box_to_container(&d.bbox, geometry, &render_rect)))
            .collect())
    }
}
