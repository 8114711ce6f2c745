//! World-space transformations of pose sequences

use crate::rotation::{aa_to_quat, quat_to_aa, vector_from_lane, write_lane};
use crate::sequence::PoseSequence;
use crate::traits::Transformable;
use nalgebra::{Isometry3, Matrix3, Rotation3, UnitQuaternion};
use ndarray::{s, Axis};
use serde::{Deserialize, Serialize};

/// Up-axis convention of recorded data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpAxis {
    #[default]
    Y,
    Z,
}

impl UpAxis {
    /// Rotation taking data in this convention to Y-up
    pub fn to_y_up(self) -> Rotation3<f64> {
        match self {
            UpAxis::Y => Rotation3::identity(),
            UpAxis::Z => Rotation3::from_matrix_unchecked(Matrix3::new(
                1.0, 0.0, 0.0,
                0.0, 0.0, 1.0,
                0.0, -1.0, 0.0,
            )),
        }
    }
}

impl Transformable for PoseSequence {
    /// Rotates every root orientation and maps every translation.
    /// Non-root joints are relative to their parent and stay untouched.
    fn transform(&mut self, transform: &Isometry3<f64>) {
        let rotation = transform.rotation;
        let n_frames = self.n_frames();

        let mut poses = self.poses_mut();
        let mut roots = poses.index_axis_mut(Axis(1), 0);
        for frame in 0..n_frames {
            let root = aa_to_quat(&vector_from_lane(roots.row(frame)));
            write_lane(roots.row_mut(frame), &quat_to_aa(&(rotation * root)));
        }

        let mut trans = self.trans_mut();
        for frame in 0..n_frames {
            let moved = transform * nalgebra::Point3::from(vector_from_lane(trans.row(frame)));
            write_lane(trans.slice_mut(s![frame, ..]), &moved.coords);
        }
    }
}

impl PoseSequence {
    /// Convert the sequence from the given up-axis convention to Y-up
    pub fn apply_up_axis(&mut self, up: UpAxis) {
        if up == UpAxis::Y {
            return;
        }
        let rotation = UnitQuaternion::from_rotation_matrix(&up.to_y_up());
        self.transform(&Isometry3::from_parts(nalgebra::Translation3::identity(), rotation));
    }
}
