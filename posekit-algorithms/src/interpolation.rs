//! Interpolation of rotation and position samples over anchor frames
//!
//! Both kernels share the same bracketing policy: each query frame is placed
//! between the nearest known frame at or below it and the nearest known frame
//! at or above it. Queries outside the known span are clamped to the boundary
//! sample (constant extrapolation). A query that coincides with a known frame
//! returns that sample verbatim.

use itertools::Itertools;
use log::debug;
use ndarray::{Array, Array3, ArrayView, ArrayView3, Axis, RemoveAxis, Zip};
use posekit_core::{aa_to_quat, quat_to_aa, slerp, vector_from_lane, write_lane, Error, Result};

/// Position of a query frame relative to the known frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// Index into the known samples at or below the query
    pub lower: usize,
    /// Index into the known samples at or above the query
    pub upper: usize,
    /// Interpolation parameter in `[0, 1]`
    pub t: f64,
}

impl Bracket {
    fn at(index: usize) -> Self {
        Self {
            lower: index,
            upper: index,
            t: 0.0,
        }
    }

    /// The known sample to copy when no blending is needed
    pub fn exact_index(&self) -> Option<usize> {
        if self.t <= 0.0 {
            Some(self.lower)
        } else if self.t >= 1.0 {
            Some(self.upper)
        } else {
            None
        }
    }

    /// Whether the query fell outside the known span
    fn is_clamped(&self, query: f64, known_frame_ids: &[usize]) -> bool {
        self.lower == self.upper && query != known_frame_ids[self.lower] as f64
    }
}

/// Locate the known samples bracketing `query`.
///
/// `known_frame_ids` must be strictly increasing. Returns `None` when no
/// frame is known.
pub fn bracket(known_frame_ids: &[usize], query: f64) -> Option<Bracket> {
    let first = *known_frame_ids.first()?;
    let last = known_frame_ids.len() - 1;
    if query <= first as f64 {
        return Some(Bracket::at(0));
    }
    if query >= known_frame_ids[last] as f64 {
        return Some(Bracket::at(last));
    }

    // first known id >= query; lies in 1..=last because of the checks above
    let upper = known_frame_ids.partition_point(|&id| (id as f64) < query);
    let upper_id = known_frame_ids[upper] as f64;
    if upper_id == query {
        return Some(Bracket::at(upper));
    }

    let lower = upper - 1;
    let lower_id = known_frame_ids[lower] as f64;
    Some(Bracket {
        lower,
        upper,
        t: (query - lower_id) / (upper_id - lower_id),
    })
}

fn bracket_all(known_frame_ids: &[usize], query_frame_ids: &[f64]) -> Result<Vec<Bracket>> {
    query_frame_ids
        .iter()
        .map(|&q| bracket(known_frame_ids, q))
        .collect::<Option<Vec<_>>>()
        .ok_or(Error::InsufficientAnchors {
            found: known_frame_ids.len(),
        })
}

/// Rotation buffers are `(frames, joints, 3)`
pub(crate) fn check_rotation_shape(shape: &[usize]) -> Result<()> {
    match shape {
        [_, _, 3] => Ok(()),
        [_, _, width] => Err(Error::ShapeMismatch(format!(
            "rotations have {} components, expected 3",
            width
        ))),
        _ => Err(Error::ShapeMismatch(format!(
            "rotations have shape {:?}, expected (frames, joints, 3)",
            shape
        ))),
    }
}

/// Position buffers are `(frames, ..., 3)`
pub(crate) fn check_position_shape(shape: &[usize]) -> Result<()> {
    if shape.len() < 2 || shape[shape.len() - 1] != 3 {
        return Err(Error::ShapeMismatch(format!(
            "positions have shape {:?}, expected (frames, ..., 3)",
            shape
        )));
    }
    Ok(())
}

/// Check anchor metadata shared by both kernels
pub fn validate_anchors(n_samples: usize, known_frame_ids: &[usize]) -> Result<()> {
    if n_samples != known_frame_ids.len() {
        return Err(Error::ShapeMismatch(format!(
            "{} known samples but {} known frame ids",
            n_samples,
            known_frame_ids.len()
        )));
    }
    if known_frame_ids.len() < 2 {
        return Err(Error::InsufficientAnchors {
            found: known_frame_ids.len(),
        });
    }
    if !known_frame_ids.iter().tuple_windows().all(|(a, b)| a < b) {
        return Err(Error::InvalidData(
            "known frame ids must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

fn validate_queries(query_frame_ids: &[f64]) -> Result<()> {
    match query_frame_ids.iter().find(|q| !q.is_finite()) {
        Some(q) => Err(Error::InvalidData(format!("query frame {} is not finite", q))),
        None => Ok(()),
    }
}

fn log_clamped(kernel: &str, known_frame_ids: &[usize], query_frame_ids: &[f64], brackets: &[Bracket]) {
    let clamped = brackets
        .iter()
        .zip(query_frame_ids)
        .filter(|(b, q)| b.is_clamped(**q, known_frame_ids))
        .count();
    if clamped > 0 {
        debug!(
            "{}: {} of {} queries outside known span [{}, {}], holding boundary sample",
            kernel,
            clamped,
            query_frame_ids.len(),
            known_frame_ids[0],
            known_frame_ids[known_frame_ids.len() - 1]
        );
    }
}

/// Convert integer frame ids to query coordinates
pub fn frame_ids_as_queries(frame_ids: &[usize]) -> Vec<f64> {
    frame_ids.iter().map(|&id| id as f64).collect()
}

/// Interpolate axis-angle joint rotations at arbitrary query frames.
///
/// `known_rotations` is `(K, J, 3)` with one entry per `known_frame_ids`
/// element. The result is `(Q, J, 3)` for `Q = query_frame_ids.len()`.
/// Joints are interpolated independently with slerp along the shortest arc.
///
/// # Errors
/// * `ShapeMismatch` if the last axis is not 3 or `K` differs from the id count
/// * `InsufficientAnchors` if fewer than two frames are known
/// * `InvalidData` if the known ids are not strictly increasing or a query is not finite
///
/// # Example
/// ```rust
/// use ndarray::array;
/// use posekit_algorithms::interpolate_rotations;
///
/// let known = array![[[0.0, 0.0, 0.0]], [[0.0, 0.0, 1.0]]];
/// let out = interpolate_rotations(known.view(), &[0, 10], &[5.0]).unwrap();
/// assert!((out[[0, 0, 2]] - 0.5).abs() < 1e-9);
/// ```
pub fn interpolate_rotations(
    known_rotations: ArrayView3<'_, f64>,
    known_frame_ids: &[usize],
    query_frame_ids: &[f64],
) -> Result<Array3<f64>> {
    check_rotation_shape(known_rotations.shape())?;
    let (n_known, n_joints, _) = known_rotations.dim();
    validate_anchors(n_known, known_frame_ids)?;
    validate_queries(query_frame_ids)?;

    let brackets = bracket_all(known_frame_ids, query_frame_ids)?;
    log_clamped("interpolate_rotations", known_frame_ids, query_frame_ids, &brackets);

    let mut out = Array3::zeros((query_frame_ids.len(), n_joints, 3));
    for (mut target, b) in out.axis_iter_mut(Axis(0)).zip(&brackets) {
        if let Some(index) = b.exact_index() {
            target.assign(&known_rotations.index_axis(Axis(0), index));
            continue;
        }

        let lo = known_rotations.index_axis(Axis(0), b.lower);
        let hi = known_rotations.index_axis(Axis(0), b.upper);
        for joint in 0..n_joints {
            let qa = aa_to_quat(&vector_from_lane(lo.row(joint)));
            let qb = aa_to_quat(&vector_from_lane(hi.row(joint)));
            write_lane(target.row_mut(joint), &quat_to_aa(&slerp(&qa, &qb, b.t)));
        }
    }

    Ok(out)
}

/// Linearly interpolate positions at arbitrary query frames.
///
/// `known_positions` is `(K, ..., 3)`: plain translations are `(K, 3)`,
/// per-joint positions `(K, J, 3)`. The result keeps the trailing shape with
/// the first axis replaced by the query count.
pub fn interpolate_positions<D: RemoveAxis>(
    known_positions: ArrayView<'_, f64, D>,
    known_frame_ids: &[usize],
    query_frame_ids: &[f64],
) -> Result<Array<f64, D>> {
    let shape = known_positions.shape();
    check_position_shape(shape)?;
    validate_anchors(shape[0], known_frame_ids)?;
    validate_queries(query_frame_ids)?;

    let brackets = bracket_all(known_frame_ids, query_frame_ids)?;
    log_clamped("interpolate_positions", known_frame_ids, query_frame_ids, &brackets);

    let mut dim = known_positions.raw_dim();
    dim[0] = query_frame_ids.len();
    let mut out = Array::zeros(dim);

    for (mut target, b) in out.axis_iter_mut(Axis(0)).zip(&brackets) {
        match b.exact_index() {
            Some(index) => target.assign(&known_positions.index_axis(Axis(0), index)),
            None => {
                let t = b.t;
                Zip::from(&mut target)
                    .and(&known_positions.index_axis(Axis(0), b.lower))
                    .and(&known_positions.index_axis(Axis(0), b.upper))
                    .for_each(|o, &lo, &hi| *o = (1.0 - t) * lo + t * hi);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use ndarray::{array, Array2};
    use posekit_core::angle_between;

    fn z_rotations(angles: &[f64]) -> Array3<f64> {
        Array3::from_shape_fn((angles.len(), 1, 3), |(f, _, c)| if c == 2 { angles[f] } else { 0.0 })
    }

    #[test]
    fn test_bracket() {
        let known = [2, 5, 9];
        assert_eq!(bracket(&known, 0.0), Some(Bracket { lower: 0, upper: 0, t: 0.0 }));
        assert_eq!(bracket(&known, 12.0), Some(Bracket { lower: 2, upper: 2, t: 0.0 }));
        assert_eq!(bracket(&known, 5.0), Some(Bracket { lower: 1, upper: 1, t: 0.0 }));

        let b = bracket(&known, 6.0).unwrap();
        assert_eq!((b.lower, b.upper), (1, 2));
        assert_relative_eq!(b.t, 0.25);

        let b = bracket(&known, 3.5).unwrap();
        assert_eq!((b.lower, b.upper), (0, 1));
        assert_relative_eq!(b.t, 0.5);
    }

    #[test]
    fn test_bracket_without_known_frames() {
        assert_eq!(bracket(&[], 3.0), None);
        assert_eq!(bracket(&[4], 3.0), Some(Bracket { lower: 0, upper: 0, t: 0.0 }));
    }

    #[test]
    fn test_shape_checks() {
        assert!(check_rotation_shape(&[4, 2, 3]).is_ok());
        assert!(matches!(check_rotation_shape(&[4, 2, 4]), Err(Error::ShapeMismatch(_))));
        assert!(matches!(check_rotation_shape(&[4, 3]), Err(Error::ShapeMismatch(_))));
        assert!(check_position_shape(&[4, 3]).is_ok());
        assert!(check_position_shape(&[4, 5, 3]).is_ok());
        assert!(matches!(check_position_shape(&[3]), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_identity_at_anchors() {
        let known = array![
            [[0.1, 0.2, 0.3], [0.0, -0.4, 0.0]],
            [[0.5, 0.0, 0.1], [1.0, 0.0, 0.0]],
            [[0.0, 0.0, 2.0], [0.2, 0.2, 0.2]],
        ];
        let out = interpolate_rotations(known.view(), &[0, 5, 10], &[0.0, 5.0, 10.0]).unwrap();
        assert_relative_eq!(out, known, epsilon = 1e-6);
    }

    #[test]
    fn test_boundary_clamping() {
        let known = z_rotations(&[0.3, 1.1]);
        let out = interpolate_rotations(known.view(), &[2, 8], &[0.0, 10.0]).unwrap();
        assert_eq!(out.index_axis(Axis(0), 0), known.index_axis(Axis(0), 0));
        assert_eq!(out.index_axis(Axis(0), 1), known.index_axis(Axis(0), 1));

        let positions = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let out = interpolate_positions(positions.view(), &[2, 8], &[0.0, 10.0]).unwrap();
        assert_eq!(out, positions);
    }

    #[test]
    fn test_slerp_midpoint_about_one_axis() {
        let (theta1, theta2) = (0.4, 1.8);
        let known = z_rotations(&[theta1, theta2]);
        let out = interpolate_rotations(known.view(), &[0, 2], &[1.0]).unwrap();
        assert_relative_eq!(out[[0, 0, 0]], 0.0, epsilon = 1e-9);
        assert_relative_eq!(out[[0, 0, 1]], 0.0, epsilon = 1e-9);
        assert_relative_eq!(out[[0, 0, 2]], (theta1 + theta2) / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_constant_angular_velocity() {
        let known = array![[[0.0, 0.0, 0.0]], [[0.9, 0.0, 0.0]]];
        let queries: Vec<f64> = (0..=9).map(|i| i as f64).collect();
        let out = interpolate_rotations(known.view(), &[0, 9], &queries).unwrap();
        for i in 0..=9 {
            assert_relative_eq!(out[[i, 0, 0]], 0.1 * i as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_joints_are_independent() {
        let known = array![
            [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
            [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
        ];
        let out = interpolate_rotations(known.view(), &[0, 4], &[1.0, 3.0]).unwrap();
        assert_relative_eq!(out[[0, 0, 0]], 0.25, epsilon = 1e-9);
        assert_relative_eq!(out[[1, 0, 0]], 0.75, epsilon = 1e-9);
        assert!(out.slice(ndarray::s![.., 1, ..]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_interpolation_across_pi() {
        let a = Vector3::new(0.0, 0.0, 3.0);
        let b = Vector3::new(0.0, 0.0, -3.0);
        let known = z_rotations(&[a.z, b.z]);
        let out = interpolate_rotations(known.view(), &[0, 2], &[1.0]).unwrap();
        let mid = Vector3::new(out[[0, 0, 0]], out[[0, 0, 1]], out[[0, 0, 2]]);
        // halfway along the short arc through pi, not through zero
        let short_arc = 2.0 * std::f64::consts::PI - 6.0;
        assert_relative_eq!(angle_between(&mid, &a), short_arc / 2.0, epsilon = 1e-9);
        assert_relative_eq!(angle_between(&mid, &b), short_arc / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_insufficient_anchors() {
        let known = z_rotations(&[0.5]);
        let err = interpolate_rotations(known.view(), &[3], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::InsufficientAnchors { found: 1 }));

        let positions = Array2::<f64>::zeros((1, 3));
        let err = interpolate_positions(positions.view(), &[3], &[1.0]).unwrap_err();
        assert!(matches!(err, Error::InsufficientAnchors { found: 1 }));
    }

    #[test]
    fn test_shape_mismatch() {
        let known = z_rotations(&[0.1, 0.2, 0.3]);
        let err = interpolate_rotations(known.view(), &[0, 1], &[0.5]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));

        let bad = Array3::<f64>::zeros((2, 1, 4));
        let err = interpolate_rotations(bad.view(), &[0, 1], &[0.5]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));

        let flat = ndarray::Array1::<f64>::zeros(3);
        let err = interpolate_positions(flat.view(), &[0, 1], &[0.5]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn test_unsorted_anchors_and_bad_queries() {
        let known = z_rotations(&[0.1, 0.2]);
        let err = interpolate_rotations(known.view(), &[4, 1], &[2.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        let err = interpolate_rotations(known.view(), &[1, 1], &[2.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        let err = interpolate_rotations(known.view(), &[0, 4], &[f64::NAN]).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_positions_linear() {
        let positions = array![[0.0, 0.0, 0.0], [10.0, -10.0, 4.0]];
        let out = interpolate_positions(positions.view(), &[0, 10], &[2.5, 5.0]).unwrap();
        assert_eq!(out.dim(), (2, 3));
        assert_relative_eq!(out, array![[2.5, -2.5, 1.0], [5.0, -5.0, 2.0]], epsilon = 1e-12);
    }

    #[test]
    fn test_positions_keep_joint_axis() {
        let positions = Array3::from_shape_fn((3, 4, 3), |(f, j, c)| (f * 100 + j * 10 + c) as f64);
        let out = interpolate_positions(positions.view(), &[0, 2, 4], &[1.0, 3.0, 4.0]).unwrap();
        assert_eq!(out.dim(), (3, 4, 3));
        assert_relative_eq!(out[[0, 2, 1]], 71.0, epsilon = 1e-12);
        assert_relative_eq!(out[[1, 3, 2]], 182.0, epsilon = 1e-12);
        assert_eq!(out.index_axis(Axis(0), 2), positions.index_axis(Axis(0), 2));
    }

    #[test]
    fn test_empty_query() {
        let known = z_rotations(&[0.1, 0.2]);
        let out = interpolate_rotations(known.view(), &[0, 1], &[]).unwrap();
        assert_eq!(out.dim(), (0, 1, 3));
    }
}
