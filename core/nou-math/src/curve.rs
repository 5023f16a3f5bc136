//! Curve sampling for waypoint paths
//!
//! [`catmull_rom`] and [`cubic_bezier`] evaluate a single cubic segment.
//! [`CurvePath`] strings segments together and walks them over time, which
//! is how objects are moved along authored paths.

use std::fmt;

use glam::Vec3;

use crate::error::{CurveError, Result};
use crate::mix::Mix;

/// Evaluate a Catmull-Rom segment between `p1` and `p2`.
///
/// `p0` and `p3` are the neighbouring points that shape the tangents.
/// The curve passes through `p1` at `t = 0` and through `p2` at `t = 1`.
pub fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

/// Evaluate a cubic Bezier segment with control points `p0..p3`
pub fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    let uu = u * u;
    let tt = t * t;

    uu * u * p0 + 3.0 * uu * t * p1 + 3.0 * u * tt * p2 + tt * t * p3
}

/// How a [`CurvePath`] interpolates between its points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CurveMode {
    /// Straight lines between consecutive points
    Lerp,
    /// Catmull-Rom spline through every point
    CatmullRom,
    /// Cubic Bezier segments sharing end points (3n+1 control points)
    Bezier,
}

impl CurveMode {
    fn min_points(self) -> usize {
        match self {
            Self::Lerp | Self::CatmullRom => 2,
            Self::Bezier => 4,
        }
    }
}

impl fmt::Display for CurveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lerp => "lerp",
            Self::CatmullRom => "catmull-rom",
            Self::Bezier => "bezier",
        };
        f.write_str(name)
    }
}

/// A timed walk along a list of waypoints
///
/// Every segment takes `segment_duration` seconds. A looping path wraps back
/// to its first segment; a non-looping path stops on its last point.
#[derive(Debug, Clone)]
pub struct CurvePath {
    points: Vec<Vec3>,
    mode: CurveMode,
    segment_duration: f32,
    looping: bool,
    segment: usize,
    timer: f32,
}

impl CurvePath {
    /// Create a path over `points`
    ///
    /// # Arguments
    /// * `points` - Waypoints (or Bezier control points)
    /// * `mode` - Interpolation between waypoints
    /// * `segment_duration` - Seconds spent on each segment
    /// * `looping` - Whether to wrap back to the start
    pub fn new(
        points: Vec<Vec3>,
        mode: CurveMode,
        segment_duration: f32,
        looping: bool,
    ) -> Result<Self> {
        let required = mode.min_points();
        if points.len() < required {
            return Err(CurveError::TooFewPoints {
                mode,
                required,
                actual: points.len(),
            });
        }
        if mode == CurveMode::Bezier && (points.len() - 1) % 3 != 0 {
            return Err(CurveError::BezierPointCount(points.len()));
        }
        if !segment_duration.is_finite() || segment_duration <= 0.0 {
            return Err(CurveError::InvalidSegmentDuration(segment_duration));
        }

        Ok(Self {
            points,
            mode,
            segment_duration,
            looping,
            segment: 0,
            timer: 0.0,
        })
    }

    /// Number of segments walked per lap
    pub fn segment_count(&self) -> usize {
        let n = self.points.len();
        match self.mode {
            CurveMode::Lerp | CurveMode::CatmullRom if self.looping => n,
            CurveMode::Lerp | CurveMode::CatmullRom => n - 1,
            CurveMode::Bezier => (n - 1) / 3,
        }
    }

    /// Index of the segment currently being walked
    pub fn segment(&self) -> usize {
        self.segment
    }

    /// Whether a non-looping path has reached its last point
    pub fn is_finished(&self) -> bool {
        !self.looping
            && self.segment + 1 == self.segment_count()
            && self.timer >= self.segment_duration
    }

    /// Rewind to the first point
    pub fn reset(&mut self) {
        self.segment = 0;
        self.timer = 0.0;
    }

    /// Advance along the path by `dt` seconds and return the new position
    ///
    /// Negative or non-finite steps leave the path where it is.
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        if !dt.is_finite() || dt <= 0.0 {
            return self.position();
        }

        let count = self.segment_count();
        let lap = self.segment_duration * count as f32;
        let mut elapsed = self.segment as f32 * self.segment_duration + self.timer + dt;

        if elapsed >= lap {
            if self.looping {
                elapsed %= lap;
            } else {
                self.segment = count - 1;
                self.timer = self.segment_duration;
                return self.position();
            }
        }

        self.segment = ((elapsed / self.segment_duration) as usize).min(count - 1);
        self.timer = (elapsed - self.segment as f32 * self.segment_duration).max(0.0);
        self.position()
    }

    /// Position at the current time
    pub fn position(&self) -> Vec3 {
        let t = (self.timer / self.segment_duration).clamp(0.0, 1.0);
        self.sample(self.segment, t)
    }

    /// Sample segment `segment` at parameter `t` in `[0, 1]`
    pub fn sample(&self, segment: usize, t: f32) -> Vec3 {
        let n = self.points.len();
        match self.mode {
            CurveMode::Lerp => {
                let a = self.points[segment % n];
                let b = self.points[(segment + 1) % n];
                a.mix(&b, t)
            }
            CurveMode::CatmullRom => {
                let p1 = segment % n;
                let p2 = (segment + 1) % n;
                let (p0, p3) = if self.looping {
                    ((segment + n - 1) % n, (segment + 2) % n)
                } else {
                    (segment.saturating_sub(1), (segment + 2).min(n - 1))
                };
                catmull_rom(
                    self.points[p0],
                    self.points[p1],
                    self.points[p2],
                    self.points[p3],
                    t,
                )
            }
            CurveMode::Bezier => {
                let base = segment * 3;
                cubic_bezier(
                    self.points[base],
                    self.points[base + 1],
                    self.points[base + 2],
                    self.points[base + 3],
                    t,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_catmull_rom_passes_through_points() {
        let [p0, p1, p2, p3] = [
            Vec3::ZERO,
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(3.0, 2.0, 1.0),
            Vec3::new(4.0, 0.0, 0.0),
        ];
        assert!(catmull_rom(p0, p1, p2, p3, 0.0).abs_diff_eq(p1, 1e-6));
        assert!(catmull_rom(p0, p1, p2, p3, 1.0).abs_diff_eq(p2, 1e-6));
    }

    #[test]
    fn test_bezier_end_points() {
        let [p0, p1, p2, p3] = [
            Vec3::ZERO,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ];
        assert!(cubic_bezier(p0, p1, p2, p3, 0.0).abs_diff_eq(p0, 1e-6));
        assert!(cubic_bezier(p0, p1, p2, p3, 1.0).abs_diff_eq(p3, 1e-6));
        assert!(cubic_bezier(p0, p1, p2, p3, 0.5).abs_diff_eq(Vec3::new(0.5, 0.75, 0.0), 1e-6));
    }

    #[test]
    fn test_lerp_path_segments() {
        let mut path = CurvePath::new(square(), CurveMode::Lerp, 1.0, false).unwrap();
        assert_eq!(path.segment_count(), 3);

        let p = path.advance(0.5);
        assert!(p.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));

        let p = path.advance(1.0);
        assert_eq!(path.segment(), 1);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 0.5, 0.0), 1e-6));
    }

    #[test]
    fn test_non_looping_path_stops_at_end() {
        let mut path = CurvePath::new(square(), CurveMode::Lerp, 1.0, false).unwrap();
        let p = path.advance(10.0);
        assert!(path.is_finished());
        assert!(p.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn test_looping_path_wraps() {
        let mut path = CurvePath::new(square(), CurveMode::Lerp, 1.0, true).unwrap();
        assert_eq!(path.segment_count(), 4);

        // Last segment closes the loop back to the first point
        let p = path.advance(3.5);
        assert_eq!(path.segment(), 3);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6));

        path.advance(0.75);
        assert_eq!(path.segment(), 0);
        assert!(!path.is_finished());
    }

    #[test]
    fn test_catmull_rom_path_hits_waypoints() {
        let mut path = CurvePath::new(square(), CurveMode::CatmullRom, 1.0, true).unwrap();
        let p = path.advance(2.0);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_invalid_paths() {
        assert!(matches!(
            CurvePath::new(vec![Vec3::ZERO], CurveMode::Lerp, 1.0, false),
            Err(CurveError::TooFewPoints { required: 2, .. })
        ));
        let mut five = square();
        five.push(Vec3::Z);
        assert!(matches!(
            CurvePath::new(five, CurveMode::Bezier, 1.0, false),
            Err(CurveError::BezierPointCount(5))
        ));
        assert!(matches!(
            CurvePath::new(square(), CurveMode::Lerp, 0.0, false),
            Err(CurveError::InvalidSegmentDuration(_))
        ));
    }

    #[test]
    fn test_non_finite_step_is_ignored() {
        let mut path = CurvePath::new(square(), CurveMode::Lerp, 1.0, true).unwrap();
        path.advance(0.5);

        let p = path.advance(f32::INFINITY);
        assert!(p.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
        path.advance(f32::NAN);
        path.advance(-2.0);

        let p = path.advance(1.0);
        assert_eq!(path.segment(), 1);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 0.5, 0.0), 1e-6));
    }

    #[test]
    fn test_long_step_on_looping_path() {
        let mut path = CurvePath::new(square(), CurveMode::Lerp, 1.0, true).unwrap();
        let p = path.advance(1.0e6 + 1.5);
        assert_eq!(path.segment(), 1);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 0.5, 0.0), 1e-3));
    }
}
