use crate::boxes::BoxForm;

/// Errors produced while deriving the on-screen placement of a frame.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error(
        "invalid frame geometry (source={source_width}x{source_height}, \
         container={container_width}x{container_height})"
    )]
    InvalidGeometry {
        source_width: f64,
        source_height: f64,
        container_width: f64,
        container_height: f64,
    },
}

impl GeometryError {
    /// `true` when at least one dimension is exactly zero.
    ///
    /// Media elements report `0x0` until their metadata is decoded and a
    /// container measures `0x0` before layout, so callers treat this case as
    /// "try again on the next measurement" rather than as a failure.
    pub fn is_not_ready(&self) -> bool {
        match *self {
            GeometryError::InvalidGeometry {
                source_width,
                source_height,
                container_width,
                container_height,
            } => [source_width, source_height, container_width, container_height]
                .iter()
                .any(|v| *v == 0.0),
        }
    }
}

/// Errors describing a bounding box that cannot be mapped.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxError {
    #[error("box has a non-finite component")]
    NonFinite,
    #[error("box has a negative extent")]
    NegativeExtent,
    #[error("expected a {expected} box, found a {found} box")]
    FormMismatch { expected: BoxForm, found: BoxForm },
}

/// Errors describing a detection that cannot be drawn.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum DetectionError {
    #[error(transparent)]
    Box(#[from] BoxError),
    #[error("confidence {0} is not finite")]
    NonFiniteConfidence(f64),
}
