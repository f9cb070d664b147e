//! Detection overlay rendering.
//!
//! [`OverlayRenderer`] turns a list of [`Detection`]s and a
//! [`FrameGeometry`] into [`DrawCommand`]s and replays them onto any
//! [`DrawSurface`]. Colors come from an injected [`ColorLookup`]; styling and
//! the category filter come from [`OverlayOptions`].
//!
//! ```
//! use frame_overlay_core::{BoxSpec, Detection, FrameGeometry};
//! use frame_overlay_render::{OverlayRenderer, RecordingSurface};
//!
//! let renderer = OverlayRenderer::default();
//! let geometry = FrameGeometry::new(1920.0, 1080.0, 800.0, 800.0);
//! let detections = [Detection::new("Signage", 0.93, BoxSpec::percentage(10.0, 10.0, 20.0, 20.0))];
//!
//! let mut surface = RecordingSurface::new();
//! let summary = renderer.render(&mut surface, &geometry, &detections).unwrap();
//! assert_eq!(summary.drawn, 1);
//! ```

mod color;
mod label;
mod options;
mod renderer;
mod surface;

pub use color::{CategoryPalette, Color, ColorLookup, ColorParseError};
pub use label::{format_label, place_label, LabelPlacement};
pub use options::{FillStyle, LabelStyle, OverlayOptions, StrokeStyle};
pub use renderer::{OverlayPlan, OverlayRenderer, RenderSummary};
pub use surface::{DrawCommand, DrawSurface, MonospaceMetrics, RecordingSurface, TextMetrics};

pub use frame_overlay_core::{
    BoxForm, BoxSpec, ContainerRect, Detection, FrameGeometry, GeometryError, RenderRect,
};
