use std::fmt;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{BoxError, FrameGeometry, RenderRect};

/// Which coordinate convention a call site supplies boxes in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxForm {
    /// `{x, y, width, height}` in percent of the source frame.
    #[default]
    Percentage,
    /// `{x1, y1, x2, y2}` corners in source pixels.
    Absolute,
}

impl fmt::Display for BoxForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxForm::Percentage => f.write_str("percentage"),
            BoxForm::Absolute => f.write_str("absolute"),
        }
    }
}

/// A detection box in source space.
///
/// Percentages are always relative to the source frame (scale factor 100),
/// never to the container.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum BoxSpec {
    Percentage {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Absolute {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
}

impl BoxSpec {
    pub fn percentage(x: f64, y: f64, width: f64, height: f64) -> Self {
        BoxSpec::Percentage {
            x,
            y,
            width,
            height,
        }
    }

    pub fn absolute(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        BoxSpec::Absolute { x1, y1, x2, y2 }
    }

    pub fn form(&self) -> BoxForm {
        match self {
            BoxSpec::Percentage { .. } => BoxForm::Percentage,
            BoxSpec::Absolute { .. } => BoxForm::Absolute,
        }
    }

    /// Reject non-finite components and negative extents.
    ///
    /// Zero-area boxes are accepted.
    pub fn validate(&self) -> Result<(), BoxError> {
        let (values, extents) = match *self {
            BoxSpec::Percentage {
                x,
                y,
                width,
                height,
            } => ([x, y, width, height], (width, height)),
            BoxSpec::Absolute { x1, y1, x2, y2 } => ([x1, y1, x2, y2], (x2 - x1, y2 - y1)),
        };
        if values.iter().any(|v| !v.is_finite()) {
            return Err(BoxError::NonFinite);
        }
        if extents.0 < 0.0 || extents.1 < 0.0 {
            return Err(BoxError::NegativeExtent);
        }
        Ok(())
    }

    /// [`BoxSpec::validate`] plus a check that the box uses `expected` form.
    pub fn validate_as(&self, expected: BoxForm) -> Result<(), BoxError> {
        let found = self.form();
        if found != expected {
            return Err(BoxError::FormMismatch { expected, found });
        }
        self.validate()
    }
}

/// Axis-aligned rectangle in container pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ContainerRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: Point2<f64>) -> bool {
        p.x >= self.x && p.y >= self.y && p.x <= self.right() && p.y <= self.bottom()
    }
}

impl From<RenderRect> for ContainerRect {
    fn from(r: RenderRect) -> Self {
        ContainerRect::new(r.offset_x, r.offset_y, r.rendered_width, r.rendered_height)
    }
}

/// Map a source-space box into container pixels.
///
/// The result is not clipped: boxes that extend past the source frame extend
/// past the render rect by the same proportion.
pub fn map_box_to_container(
    bbox: &BoxSpec,
    geometry: &FrameGeometry,
    render_rect: &RenderRect,
) -> ContainerRect {
    match *bbox {
        BoxSpec::Percentage {
            x,
            y,
            width,
            height,
        } => {
            let rw = render_rect.rendered_width;
            let rh = render_rect.rendered_height;
            ContainerRect {
                x: x * rw / 100.0 + render_rect.offset_x,
                y: y * rh / 100.0 + render_rect.offset_y,
                width: width * rw / 100.0,
                height: height * rh / 100.0,
            }
        }
        BoxSpec::Absolute { x1, y1, x2, y2 } => {
            let (sx, sy) = render_rect.scale(geometry);
            ContainerRect {
                x: x1 * sx + render_rect.offset_x,
                y: y1 * sy + render_rect.offset_y,
                width: (x2 - x1) * sx,
                height: (y2 - y1) * sy,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_render_rect;
    use approx::assert_abs_diff_eq;

    fn assert_rect_close(a: ContainerRect, b: ContainerRect) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-9);
        assert_abs_diff_eq!(a.width, b.width, epsilon = 1e-9);
        assert_abs_diff_eq!(a.height, b.height, epsilon = 1e-9);
    }

    fn hd_in_square() -> (FrameGeometry, RenderRect) {
        let g = FrameGeometry::new(1920.0, 1080.0, 800.0, 800.0);
        let r = compute_render_rect(&g).expect("valid geometry");
        (g, r)
    }

    #[test]
    fn percentage_box_scales_by_rendered_size() {
        let (g, r) = hd_in_square();
        let out = map_box_to_container(&BoxSpec::percentage(10.0, 10.0, 20.0, 20.0), &g, &r);
        assert_rect_close(out, ContainerRect::new(80.0, 220.0, 160.0, 90.0));
    }

    #[test]
    fn absolute_box_scales_by_source_ratio() {
        let (g, r) = hd_in_square();
        let out = map_box_to_container(&BoxSpec::absolute(192.0, 108.0, 576.0, 324.0), &g, &r);
        assert_rect_close(out, ContainerRect::new(80.0, 220.0, 160.0, 90.0));
    }

    #[test]
    fn full_frame_box_covers_render_rect() {
        let geometries = [
            FrameGeometry::new(1920.0, 1080.0, 800.0, 800.0),
            FrameGeometry::new(480.0, 640.0, 1280.0, 720.0),
            FrameGeometry::new(333.0, 333.0, 333.0, 333.0),
        ];
        for g in geometries {
            let r = compute_render_rect(&g).expect("valid geometry");
            let expected = ContainerRect::from(r);
            let pct = map_box_to_container(&BoxSpec::percentage(0.0, 0.0, 100.0, 100.0), &g, &r);
            let abs = map_box_to_container(
                &BoxSpec::absolute(0.0, 0.0, g.source_width, g.source_height),
                &g,
                &r,
            );
            assert_rect_close(pct, expected);
            assert_rect_close(abs, expected);
        }
    }

    #[test]
    fn mapping_is_pure() {
        let (g, r) = hd_in_square();
        let b = BoxSpec::absolute(10.5, 20.25, 300.0, 700.0);
        assert_eq!(
            map_box_to_container(&b, &g, &r),
            map_box_to_container(&b, &g, &r)
        );
    }

    #[test]
    fn in_frame_boxes_never_land_in_bars() {
        let g = FrameGeometry::new(1280.0, 720.0, 500.0, 900.0);
        let r = compute_render_rect(&g).expect("valid geometry");
        let frame = ContainerRect::from(r);
        for (x1, y1, x2, y2) in [
            (0.0, 0.0, 10.0, 10.0),
            (1270.0, 710.0, 1280.0, 720.0),
            (100.0, 0.0, 1280.0, 720.0),
            (640.0, 360.0, 640.0, 360.0),
        ] {
            let out = map_box_to_container(&BoxSpec::absolute(x1, y1, x2, y2), &g, &r);
            assert!(out.x >= frame.x - 1e-9 && out.y >= frame.y - 1e-9, "{out:?}");
            assert!(
                out.right() <= frame.right() + 1e-9 && out.bottom() <= frame.bottom() + 1e-9,
                "{out:?}"
            );
        }
    }

    #[test]
    fn zero_size_box_maps_to_zero_area() {
        let (g, r) = hd_in_square();
        let b = BoxSpec::absolute(0.0, 0.0, 0.0, 0.0);
        assert!(b.validate().is_ok());
        let out = map_box_to_container(&b, &g, &r);
        assert_eq!(out.width, 0.0);
        assert_eq!(out.height, 0.0);
        assert_abs_diff_eq!(out.y, 175.0, epsilon = 1e-9);
    }

    #[test]
    fn validation_rejects_malformed_boxes() {
        assert_eq!(
            BoxSpec::percentage(f64::NAN, 0.0, 1.0, 1.0).validate(),
            Err(BoxError::NonFinite)
        );
        assert_eq!(
            BoxSpec::absolute(50.0, 0.0, 10.0, 10.0).validate(),
            Err(BoxError::NegativeExtent)
        );
        assert_eq!(
            BoxSpec::percentage(0.0, 0.0, 10.0, 10.0).validate_as(BoxForm::Absolute),
            Err(BoxError::FormMismatch {
                expected: BoxForm::Absolute,
                found: BoxForm::Percentage
            })
        );
    }

    #[test]
    fn box_spec_serializes_with_explicit_form_tag() {
        let json = serde_json::to_value(BoxSpec::absolute(1.0, 2.0, 3.0, 4.0)).expect("serialize");
        assert_eq!(json["form"], "absolute");
        let back: BoxSpec = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.form(), BoxForm::Absolute);
    }
}
