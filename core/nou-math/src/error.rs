//! Error types for curve construction

use thiserror::Error;

use crate::curve::CurveMode;

/// Errors raised when a [`CurvePath`](crate::CurvePath) is built from bad input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    /// Not enough waypoints for the requested mode
    #[error("{mode} path needs at least {required} points, got {actual}")]
    TooFewPoints {
        /// Sampling mode of the path
        mode: CurveMode,
        /// Minimum number of points the mode needs
        required: usize,
        /// Number of points supplied
        actual: usize,
    },

    /// Bezier paths are made of 3n+1 control points
    #[error("Bezier path needs 3n+1 control points, got {0}")]
    BezierPointCount(usize),

    /// Segment duration must be strictly positive and finite
    #[error("Segment duration must be positive and finite, got {0}")]
    InvalidSegmentDuration(f32),
}

/// Result type using [`CurveError`]
pub type Result<T> = std::result::Result<T, CurveError>;
