//! Core types for drawing detection overlays on letterboxed frames.
//!
//! A frame (image or video) is shown inside a container with
//! `object-fit: contain` semantics, so it usually occupies only part of the
//! container. This crate computes that placement ([`compute_render_rect`]) and
//! maps detection boxes from source space into container pixels
//! ([`map_box_to_container`]).
//!
//! The crate is purely geometric. Drawing lives in `frame-overlay-render`.

mod boxes;
mod detection;
mod error;
mod geometry;
mod logger;

pub use boxes::{map_box_to_container, BoxForm, BoxSpec, ContainerRect};
pub use detection::Detection;
pub use error::{BoxError, DetectionError, GeometryError};
pub use geometry::{compute_render_rect, FrameGeometry, RenderRect};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

pub use nalgebra::Point2;
