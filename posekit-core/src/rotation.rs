//! Axis-angle rotation helpers
//!
//! Sequences store orientations as axis-angle 3-vectors (direction = axis,
//! magnitude = angle in radians). Interpolation happens on unit quaternions,
//! so these helpers convert at the boundary.

use nalgebra::{Quaternion, Rotation3, UnitQuaternion, Vector3};
use ndarray::{ArrayView1, ArrayViewMut1};

/// Below this `sin(half angle)` slerp is numerically ill-conditioned and
/// normalised linear interpolation is used instead.
const SLERP_EPSILON: f64 = 1e-9;

/// Convert an axis-angle vector to a unit quaternion
pub fn aa_to_quat(aa: &Vector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_scaled_axis(*aa)
}

/// Convert a unit quaternion to an axis-angle vector with angle in `[0, pi]`
pub fn quat_to_aa(q: &UnitQuaternion<f64>) -> Vector3<f64> {
    q.scaled_axis()
}

/// Convert an axis-angle vector to a rotation matrix
pub fn aa_to_matrix(aa: &Vector3<f64>) -> Rotation3<f64> {
    Rotation3::from_scaled_axis(*aa)
}

/// Convert a rotation matrix to an axis-angle vector
pub fn matrix_to_aa(rotation: &Rotation3<f64>) -> Vector3<f64> {
    rotation.scaled_axis()
}

/// Convert axis-angle to extrinsic XYZ Euler angles `(roll, pitch, yaw)`
pub fn aa_to_euler(aa: &Vector3<f64>) -> Vector3<f64> {
    let (roll, pitch, yaw) = aa_to_quat(aa).euler_angles();
    Vector3::new(roll, pitch, yaw)
}

/// Convert extrinsic XYZ Euler angles `(roll, pitch, yaw)` to axis-angle
pub fn euler_to_aa(euler: &Vector3<f64>) -> Vector3<f64> {
    quat_to_aa(&UnitQuaternion::from_euler_angles(euler.x, euler.y, euler.z))
}

/// Spherical linear interpolation along the shortest arc.
///
/// `t = 0` yields `a`, `t = 1` yields `b`. Falls back to [`nlerp`] when the
/// two orientations are too close for slerp to be well conditioned.
pub fn slerp(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    a.try_slerp(b, t, SLERP_EPSILON)
        .unwrap_or_else(|| nlerp(a, b, t))
}

/// Normalised linear interpolation along the shortest arc
pub fn nlerp(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    let qa: Quaternion<f64> = a.into_inner();
    let mut qb: Quaternion<f64> = b.into_inner();
    if qa.coords.dot(&qb.coords) < 0.0 {
        qb = -qb;
    }
    UnitQuaternion::new_normalize(qa * (1.0 - t) + qb * t)
}

/// Geodesic angle in radians between two axis-angle rotations
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    aa_to_quat(a).angle_to(&aa_to_quat(b))
}

/// Read a length-3 ndarray lane as a vector
pub fn vector_from_lane(lane: ArrayView1<'_, f64>) -> Vector3<f64> {
    Vector3::new(lane[0], lane[1], lane[2])
}

/// Write a vector into a length-3 ndarray lane
pub fn write_lane(mut lane: ArrayViewMut1<'_, f64>, v: &Vector3<f64>) {
    lane[0] = v.x;
    lane[1] = v.y;
    lane[2] = v.z;
}
