//! Core traits for posekit

use nalgebra::Isometry3;

/// Trait for objects that can be moved rigidly in world space
pub trait Transformable {
    /// Apply a rigid transformation to the object
    fn transform(&mut self, transform: &Isometry3<f64>);
}
