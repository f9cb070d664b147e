//! High-level facade for the `frame-overlay-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry core and the overlay renderer,
//! - JSON loading for detection lists, overlay jobs and reports,
//! - (feature `image`) a raster [`raster::ImageSurface`], letterboxed
//!   compositing and an end-to-end job runner,
//! - (feature `cli`) the `frame-overlay` command-line tool.
//!
//! ## Quickstart
//!
//! ```
//! use frame_overlay::{BoxSpec, Detection, FrameGeometry, OverlayRenderer, RecordingSurface};
//!
//! // A 1920x1080 frame shown in an 800x800 element.
//! let geometry = FrameGeometry::new(1920.0, 1080.0, 800.0, 800.0);
//! let detections = [
//!     Detection::new("Signage", 0.93, BoxSpec::percentage(10.0, 10.0, 20.0, 20.0))
//!         .with_condition("faded"),
//! ];
//!
//! let renderer = OverlayRenderer::default();
//! let mut surface = RecordingSurface::new();
//! renderer.render(&mut surface, &geometry, &detections).unwrap();
//! ```
//!
//! ## API map
//! - `frame_overlay::core`: frame geometry, box forms, detections, logging.
//! - `frame_overlay::render`: colors, options, labels, draw commands, renderer.
//! - `frame_overlay::io`: JSON detections, jobs and reports.
//! - `frame_overlay::raster` (feature `image`): RGBA surface and job runner.

pub use frame_overlay_core as core;
pub use frame_overlay_render as render;

pub use frame_overlay_core::{
    compute_render_rect, map_box_to_container, BoxError, BoxForm, BoxSpec, ContainerRect,
    Detection, DetectionError, FrameGeometry, GeometryError, RenderRect,
};
pub use frame_overlay_render::{
    CategoryPalette, Color, ColorLookup, DrawCommand, DrawSurface, OverlayOptions,
    OverlayRenderer, RecordingSurface, RenderSummary,
};

pub mod io;

#[cfg(feature = "image")]
pub mod raster;
