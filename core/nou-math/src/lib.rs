//! Math helpers for the NOU scene framework.
//!
//! This crate is the thin convenience layer the transform and animation
//! crates lean on. All vector, quaternion and matrix types come from
//! [`glam`] and are re-exported here so downstream crates agree on a single
//! version.
//!
//! - [`Mix`]: interpolation with exact endpoints (`mix(a, b, 0) == a`,
//!   `mix(a, b, 1) == b`)
//! - [`euler`]: glm-compatible Euler-degree conversions
//! - [`Trs`]: translate/rotate/scale composition and decomposition
//! - [`curve`]: Catmull-Rom and Bezier sampling plus [`CurvePath`]
//!
//! # Examples
//!
//! ```
//! use nou_math::{Mix, Quat, Vec3};
//!
//! let a = Vec3::ZERO;
//! let b = Vec3::new(2.0, 0.0, 0.0);
//! assert_eq!(a.mix(&b, 0.5), Vec3::new(1.0, 0.0, 0.0));
//! assert_eq!(Quat::IDENTITY.mix(&Quat::from_rotation_y(1.0), 0.0), Quat::IDENTITY);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod curve;
pub mod error;
pub mod euler;
mod mix;
mod trs;

pub use curve::{CurveMode, CurvePath, catmull_rom, cubic_bezier};
pub use error::{CurveError, Result};
pub use euler::{euler_degrees_from_quat, quat_from_euler_degrees};
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec3, Vec4};
pub use mix::Mix;
pub use trs::{Trs, normal_matrix};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
