//! Core data structures and traits for posekit
//!
//! This crate provides the fundamental types for articulated motion sequences:
//! the owned [`PoseSequence`] container, axis-angle rotation helpers, up-axis
//! conversions and the shared error type.

pub mod error;
pub mod rotation;
pub mod sequence;
pub mod traits;
pub mod transform;

pub use error::*;
pub use rotation::*;
pub use sequence::*;
pub use traits::*;
pub use transform::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Isometry3, Matrix3, Rotation3, UnitQuaternion, Vector3};

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// A unit quaternion with double precision components
pub type Quatd = UnitQuaternion<f64>;
