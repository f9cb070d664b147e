use nalgebra::{Matrix3, Point2};
use serde::{Deserialize, Serialize};

use crate::GeometryError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Intrinsic size of a frame and the size of the element it is displayed in.
///
/// Values are plain `f64` because they usually come straight from layout
/// measurement, which may be fractional. [`compute_render_rect`] rejects
/// anything non-positive or non-finite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub source_width: f64,
    pub source_height: f64,
    pub container_width: f64,
    pub container_height: f64,
}

impl FrameGeometry {
    pub fn new(
        source_width: f64,
        source_height: f64,
        container_width: f64,
        container_height: f64,
    ) -> Self {
        Self {
            source_width,
            source_height,
            container_width,
            container_height,
        }
    }

    /// Build a geometry from integer pixel sizes `(width, height)`.
    pub fn from_pixels(source: (u32, u32), container: (u32, u32)) -> Self {
        Self::new(
            source.0 as f64,
            source.1 as f64,
            container.0 as f64,
            container.1 as f64,
        )
    }

    /// Check that every dimension is finite and strictly positive.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let dims = [
            self.source_width,
            self.source_height,
            self.container_width,
            self.container_height,
        ];
        if dims.iter().all(|v| v.is_finite() && *v > 0.0) {
            Ok(())
        } else {
            Err(GeometryError::InvalidGeometry {
                source_width: self.source_width,
                source_height: self.source_height,
                container_width: self.container_width,
                container_height: self.container_height,
            })
        }
    }

    /// Shorthand for [`compute_render_rect`].
    pub fn render_rect(&self) -> Result<RenderRect, GeometryError> {
        compute_render_rect(self)
    }
}

/// The rectangle a frame actually occupies inside its container.
///
/// Everything outside `[offset_x, offset_x + rendered_width] x
/// [offset_y, offset_y + rendered_height]` is letterbox.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderRect {
    pub rendered_width: f64,
    pub rendered_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl RenderRect {
    /// Source-to-container scale factors `(sx, sy)`.
    ///
    /// Both are equal up to rounding since the fit preserves aspect ratio.
    pub fn scale(&self, geometry: &FrameGeometry) -> (f64, f64) {
        (
            self.rendered_width / geometry.source_width,
            self.rendered_height / geometry.source_height,
        )
    }

    /// Whether a container-space point lies on the frame (bars excluded).
    pub fn contains(&self, p: Point2<f64>) -> bool {
        p.x >= self.offset_x
            && p.y >= self.offset_y
            && p.x <= self.offset_x + self.rendered_width
            && p.y <= self.offset_y + self.rendered_height
    }

    /// Map a point from source pixels to container pixels.
    pub fn source_to_container(&self, geometry: &FrameGeometry, p: Point2<f64>) -> Point2<f64> {
        let (sx, sy) = self.scale(geometry);
        Point2::new(p.x * sx + self.offset_x, p.y * sy + self.offset_y)
    }

    /// Map a point from container pixels back to source pixels.
    ///
    /// Points inside the letterbox bars map outside `[0, source_width] x
    /// [0, source_height]`; use [`RenderRect::contains`] first when that
    /// matters.
    pub fn container_to_source(&self, geometry: &FrameGeometry, p: Point2<f64>) -> Point2<f64> {
        let (sx, sy) = self.scale(geometry);
        Point2::new((p.x - self.offset_x) / sx, (p.y - self.offset_y) / sy)
    }

    /// Homogeneous affine matrix taking source pixels to container pixels.
    pub fn to_matrix(&self, geometry: &FrameGeometry) -> Matrix3<f64> {
        let (sx, sy) = self.scale(geometry);
        Matrix3::new(
            sx, 0.0, self.offset_x, //
            0.0, sy, self.offset_y, //
            0.0, 0.0, 1.0,
        )
    }
}

/// Place a frame inside its container the way CSS `object-fit: contain` does.
///
/// A frame that is relatively wider than the container fills the container
/// width and is centered vertically; otherwise (including equal aspect ratios)
/// it fills the height and is centered horizontally. The aspect comparison is
/// done by cross-multiplication so that exactly equal ratios always take the
/// height-fill branch.
#[cfg_attr(feature = "tracing", instrument(level = "trace"))]
pub fn compute_render_rect(geometry: &FrameGeometry) -> Result<RenderRect, GeometryError> {
    geometry.validate()?;
    let FrameGeometry {
        source_width: sw,
        source_height: sh,
        container_width: cw,
        container_height: ch,
    } = *geometry;

    if sw * ch > cw * sh {
        let rendered_height = (cw * sh / sw).min(ch);
        Ok(RenderRect {
            rendered_width: cw,
            rendered_height,
            offset_x: 0.0,
            offset_y: (ch - rendered_height) / 2.0,
        })
    } else {
        let rendered_width = (ch * sw / sh).min(cw);
        Ok(RenderRect {
            rendered_width,
            rendered_height: ch,
            offset_x: (cw - rendered_width) / 2.0,
            offset_y: 0.0,
        })
    }
}
