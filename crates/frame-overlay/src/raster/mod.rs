//! Raster output: an RGBA drawing surface, letterboxed compositing and the
//! end-to-end job runner.

mod font;

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, Blend};
use imageproc::rect::Rect;
use log::info;

use crate::core::{compute_render_rect, ContainerRect, FrameGeometry, GeometryError, RenderRect};
use crate::io::{load_detections_json, OverlayIoError, OverlayJob, OverlayReport};
use crate::render::{Color, DrawSurface, OverlayRenderer, TextMetrics};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors from running an [`OverlayJob`].
#[derive(thiserror::Error, Debug)]
pub enum OverlayJobError {
    #[error(transparent)]
    Io(#[from] OverlayIoError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// [`DrawSurface`] backed by an RGBA buffer.
///
/// Pixels are covered when their centers fall inside a shape. Drawing goes
/// through `imageproc`; translucent fills are alpha-blended over what is
/// already there. Shapes partly or fully off the buffer are clipped, and
/// nothing panics on odd coordinates.
#[derive(Clone, Debug)]
pub struct ImageSurface {
    image: RgbaImage,
}

impl ImageSurface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Pixels whose centers fall inside `[x0, x1) x [y0, y1)`, clipped to
    /// the buffer. `None` when nothing is covered.
    fn covered(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Option<Rect> {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return None;
        }
        let (w, h) = self.image.dimensions();
        let clip = |v: f64, len: u32| pixel_edge(v).clamp(0, len as i64);
        let (left, right) = (clip(x0, w), clip(x1, w));
        let (top, bottom) = (clip(y0, h), clip(y1, h));
        (right > left && bottom > top).then(|| {
            Rect::at(left as i32, top as i32).of_size((right - left) as u32, (bottom - top) as u32)
        })
    }
}

/// Index of the first pixel whose center is at or past `v`.
fn pixel_edge(v: f64) -> i64 {
    (v - 0.5).ceil() as i64
}

fn paint(color: Color, alpha: f64) -> Rgba<u8> {
    let a = (alpha * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([color.r, color.g, color.b, a])
}

impl TextMetrics for ImageSurface {
    fn measure_text(&self, text: &str, font_px: f64) -> f64 {
        let unit = font::unit_px(font_px);
        (text.chars().count() as u32 * font::ADVANCE_UNITS * unit) as f64
    }
}

impl DrawSurface for ImageSurface {
    fn clear(&mut self, width: f64, height: f64) {
        if let Some(region) = self.covered(0.0, 0.0, width, height) {
            draw_filled_rect_mut(&mut self.image, region, Rgba([0, 0, 0, 0]));
        }
    }

    fn stroke_rect(&mut self, rect: &ContainerRect, color: Color, line_width: f64) {
        let lw = if line_width.is_finite() {
            line_width.max(1.0)
        } else {
            1.0
        };
        let half = lw / 2.0;
        let outer = [rect.x - half, rect.y - half, rect.right() + half, rect.bottom() + half];
        if !outer.iter().all(|v| v.is_finite()) {
            return;
        }

        let (w, h) = self.image.dimensions();
        let max_rings = w.max(h) as i64 + 1;
        let rings = (pixel_edge(rect.x + half) - pixel_edge(rect.x - half)).clamp(1, max_rings);
        // Edges past the buffer stay past it after clamping, so clipped
        // rings never show up along the border.
        let bound = |v: f64, len: u32| pixel_edge(v).clamp(-rings - 1, len as i64 + rings + 1);
        let (left, top) = (bound(outer[0], w), bound(outer[1], h));
        let (right, bottom) = (bound(outer[2], w), bound(outer[3], h));

        // Strokes are centered on the box edge: one-pixel rings stepping inward.
        for i in 0..rings {
            let (ring_w, ring_h) = (right - left - 2 * i, bottom - top - 2 * i);
            if ring_w <= 0 || ring_h <= 0 {
                break;
            }
            let ring = Rect::at((left + i) as i32, (top + i) as i32)
                .of_size(ring_w as u32, ring_h as u32);
            draw_hollow_rect_mut(&mut self.image, ring, paint(color, 1.0));
        }
    }

    fn fill_rect(&mut self, rect: &ContainerRect, color: Color, alpha: f64) {
        if !alpha.is_finite() || alpha <= 0.0 {
            return;
        }
        let Some(region) = self.covered(rect.x, rect.y, rect.right(), rect.bottom()) else {
            return;
        };
        let mut canvas = Blend(std::mem::take(&mut self.image));
        draw_filled_rect_mut(&mut canvas, region, paint(color, alpha.min(1.0)));
        self.image = canvas.0;
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color, font_px: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        let unit = font::unit_px(font_px) as f64;
        let advance = font::ADVANCE_UNITS as f64 * unit;
        let ink = paint(color, 1.0);
        for (i, c) in text.chars().enumerate() {
            let gx = x + i as f64 * advance;
            for (row, bits) in font::glyph(c).iter().enumerate() {
                for col in 0..3u32 {
                    if bits & (0b100u8 >> col) == 0 {
                        continue;
                    }
                    let px = gx + col as f64 * unit;
                    let py = y + row as f64 * unit;
                    if let Some(cell) = self.covered(px, py, px + unit, py + unit) {
                        draw_filled_rect_mut(&mut self.image, cell, ink);
                    }
                }
            }
        }
    }
}

/// Scale `frame` into a `width x height` canvas the way `object-fit: contain`
/// shows it, filling the letterbox bars with `background`.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(frame, background),
        fields(src_w = frame.width(), src_h = frame.height())
    )
)]
pub fn compose_letterboxed(
    frame: &RgbaImage,
    width: u32,
    height: u32,
    background: Color,
) -> Result<(RgbaImage, FrameGeometry, RenderRect), GeometryError> {
    let geometry = FrameGeometry::from_pixels(frame.dimensions(), (width, height));
    let rect = compute_render_rect(&geometry)?;

    let scaled_w = (rect.rendered_width.round() as u32).clamp(1, width);
    let scaled_h = (rect.rendered_height.round() as u32).clamp(1, height);
    let scaled = imageops::resize(frame, scaled_w, scaled_h, FilterType::Triangle);

    let mut canvas = RgbaImage::from_pixel(
        width,
        height,
        Rgba([background.r, background.g, background.b, 0xff]),
    );
    imageops::overlay(
        &mut canvas,
        &scaled,
        rect.offset_x.round() as i64,
        rect.offset_y.round() as i64,
    );
    Ok((canvas, geometry, rect))
}

/// Save as RGBA, or RGB for formats without an alpha channel.
fn save_output(canvas: RgbaImage, path: &Path) -> Result<(), image::ImageError> {
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    if is_jpeg {
        DynamicImage::ImageRgba8(canvas).to_rgb8().save(path)
    } else {
        canvas.save(path)
    }
}

/// Run a job end to end: load the frame and detections, letterbox the frame
/// into the container, draw the overlay on top and save the result.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(job), fields(image = %job.image_path))
)]
pub fn run_job(job: &OverlayJob) -> Result<OverlayReport, OverlayJobError> {
    let frame = image::open(&job.image_path)?.to_rgba8();
    let [width, height] = job.container.unwrap_or([frame.width(), frame.height()]);

    let loaded = load_detections_json(&job.detections_path, job.options.box_form)?;
    let (mut canvas, geometry, render_rect) =
        compose_letterboxed(&frame, width, height, Color::BLACK)?;

    let renderer = OverlayRenderer::new(job.options.clone(), job.palette());
    let mut layer = ImageSurface::new(width, height);
    let summary = renderer.render(&mut layer, &geometry, &loaded.detections)?;
    imageops::overlay(&mut canvas, layer.image(), 0, 0);

    let output_path = job.output_path();
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(OverlayIoError::from)?;
    }
    save_output(canvas, &output_path)?;
    info!(
        "wrote {} ({}x{}, drawn={}, filtered={}, skipped={})",
        output_path.display(),
        width,
        height,
        summary.drawn,
        summary.filtered,
        loaded.skipped + summary.malformed
    );

    let report = OverlayReport {
        image_path: job.image_path.clone(),
        output_path: output_path.to_string_lossy().into_owned(),
        geometry,
        render_rect,
        summary,
        skipped_records: loaded.skipped,
    };
    if let Some(report_path) = job.report_path.as_deref() {
        report.write_json(Path::new(report_path))?;
    }
    Ok(report)
}
