//! Owned motion sequence container

use crate::error::{check_rate, Error, Result};
use crate::rotation::{aa_to_quat, quat_to_aa, vector_from_lane, write_lane};
use log::debug;
use nalgebra::Vector3;
use ndarray::{concatenate, s, Array2, Array3, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3, Axis};

/// A temporal sequence of articulated poses.
///
/// Frame `i` holds `J` axis-angle joint rotations (`poses[i]`, joint 0 is the
/// global root orientation) and one global translation (`trans[i]`). All
/// frames share the same joint count; frame indices are `0..n_frames()`.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSequence {
    poses: Array3<f64>,
    trans: Array2<f64>,
    betas: Vec<f64>,
    fps: f64,
}

impl PoseSequence {
    /// Create a sequence from `(N, J, 3)` rotations and `(N, 3)` translations
    pub fn new(poses: Array3<f64>, trans: Array2<f64>, fps: f64) -> Result<Self> {
        let sequence = Self {
            poses,
            trans,
            betas: Vec::new(),
            fps,
        };
        sequence.validate()?;
        Ok(sequence)
    }

    /// Create a sequence from flattened `(N, 3J)` poses
    pub fn from_flat(poses: Array2<f64>, trans: Array2<f64>, fps: f64) -> Result<Self> {
        let (n_frames, width) = poses.dim();
        if width == 0 || width % 3 != 0 {
            return Err(Error::shape(format!(
                "flat pose width {} is not a positive multiple of 3",
                width
            )));
        }
        let poses = poses
            .into_shape_with_order((n_frames, width / 3, 3))
            .map_err(|e| Error::shape(e.to_string()))?;
        Self::new(poses, trans, fps)
    }

    /// A sequence of `n_frames` rest poses at the origin
    pub fn zeros(n_frames: usize, n_joints: usize, fps: f64) -> Result<Self> {
        Self::new(
            Array3::zeros((n_frames, n_joints, 3)),
            Array2::zeros((n_frames, 3)),
            fps,
        )
    }

    /// Attach body shape coefficients
    pub fn with_betas(mut self, betas: Vec<f64>) -> Self {
        self.betas = betas;
        self
    }

    /// Check shape and rate invariants
    pub fn validate(&self) -> Result<()> {
        let (n_frames, n_joints, width) = self.poses.dim();
        if n_frames == 0 {
            return Err(Error::shape("sequence has no frames"));
        }
        if n_joints == 0 {
            return Err(Error::shape("sequence has no joints"));
        }
        if width != 3 {
            return Err(Error::shape(format!("rotations have {} components, expected 3", width)));
        }
        if self.trans.dim() != (n_frames, 3) {
            return Err(Error::shape(format!(
                "translations have shape {:?}, expected ({}, 3)",
                self.trans.dim(),
                n_frames
            )));
        }
        check_rate(self.fps)?;
        Ok(())
    }

    /// Number of frames
    pub fn n_frames(&self) -> usize {
        self.poses.len_of(Axis(0))
    }

    /// Number of joints per frame, including the root
    pub fn n_joints(&self) -> usize {
        self.poses.len_of(Axis(1))
    }

    /// Sampling rate in frames per second
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Duration in seconds between first and last frame
    pub fn duration(&self) -> f64 {
        (self.n_frames() - 1) as f64 / self.fps
    }

    pub fn betas(&self) -> &[f64] {
        &self.betas
    }

    /// All joint rotations, `(N, J, 3)`
    pub fn poses(&self) -> ArrayView3<'_, f64> {
        self.poses.view()
    }

    /// All translations, `(N, 3)`
    pub fn trans(&self) -> ArrayView2<'_, f64> {
        self.trans.view()
    }

    pub(crate) fn poses_mut(&mut self) -> ArrayViewMut3<'_, f64> {
        self.poses.view_mut()
    }

    pub(crate) fn trans_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.trans.view_mut()
    }

    /// Root orientations, `(N, 3)`
    pub fn root_orientations(&self) -> ArrayView2<'_, f64> {
        self.poses.index_axis(Axis(1), 0)
    }

    /// Flatten rotations to `(N, 3J)`
    pub fn to_flat(&self) -> Array2<f64> {
        let (n_frames, n_joints, _) = self.poses.dim();
        Array2::from_shape_fn((n_frames, n_joints * 3), |(f, k)| self.poses[[f, k / 3, k % 3]])
    }

    fn check_frame(&self, frame: usize) -> Result<()> {
        if frame < self.n_frames() {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                frame,
                len: self.n_frames(),
            })
        }
    }

    /// Joint rotations of a single frame, `(J, 3)`
    pub fn frame_pose(&self, frame: usize) -> Result<ArrayView2<'_, f64>> {
        self.check_frame(frame)?;
        Ok(self.poses.index_axis(Axis(0), frame))
    }

    /// Translation of a single frame
    pub fn frame_translation(&self, frame: usize) -> Result<Vector3<f64>> {
        self.check_frame(frame)?;
        Ok(vector_from_lane(self.trans.row(frame)))
    }

    /// Rotation of one joint in one frame
    pub fn joint_rotation(&self, frame: usize, joint: usize) -> Result<Vector3<f64>> {
        self.check_frame(frame)?;
        if joint >= self.n_joints() {
            return Err(Error::OutOfRange {
                frame: joint,
                len: self.n_joints(),
            });
        }
        Ok(vector_from_lane(self.poses.slice(s![frame, joint, ..])))
    }

    /// Overwrite all joint rotations of one frame with an edited pose
    pub fn set_frame_pose(&mut self, frame: usize, pose: ArrayView2<'_, f64>) -> Result<()> {
        self.check_frame(frame)?;
        if pose.dim() != (self.n_joints(), 3) {
            return Err(Error::shape(format!(
                "edited pose has shape {:?}, expected ({}, 3)",
                pose.dim(),
                self.n_joints()
            )));
        }
        self.poses.index_axis_mut(Axis(0), frame).assign(&pose);
        Ok(())
    }

    /// Overwrite a single joint rotation
    pub fn set_joint_rotation(&mut self, frame: usize, joint: usize, aa: &Vector3<f64>) -> Result<()> {
        self.joint_rotation(frame, joint)?;
        write_lane(self.poses.slice_mut(s![frame, joint, ..]), aa);
        Ok(())
    }

    /// Overwrite the translation of one frame
    pub fn set_frame_translation(&mut self, frame: usize, translation: &Vector3<f64>) -> Result<()> {
        self.check_frame(frame)?;
        write_lane(self.trans.row_mut(frame), translation);
        Ok(())
    }

    /// Join sequences end to end, shifting every translation by `offset`.
    ///
    /// All parts must share joint count and frame rate. Body shapes are
    /// merged with a per-coefficient median over the parts that carry one.
    pub fn concat(parts: &[PoseSequence], offset: &Vector3<f64>) -> Result<Self> {
        let first = parts
            .first()
            .ok_or_else(|| Error::InvalidData("no sequences to concatenate".to_string()))?;
        for part in &parts[1..] {
            if part.n_joints() != first.n_joints() {
                return Err(Error::shape(format!(
                    "cannot concatenate {} joints with {} joints",
                    part.n_joints(),
                    first.n_joints()
                )));
            }
            if part.fps != first.fps {
                return Err(Error::InvalidData(format!(
                    "cannot concatenate {} fps with {} fps",
                    part.fps, first.fps
                )));
            }
        }
        let betas = median_betas(parts)?;

        let poses: Vec<_> = parts.iter().map(|p| p.poses.view()).collect();
        let trans: Vec<_> = parts.iter().map(|p| p.trans.view()).collect();
        let poses = concatenate(Axis(0), &poses).map_err(|e| Error::shape(e.to_string()))?;
        let mut trans = concatenate(Axis(0), &trans).map_err(|e| Error::shape(e.to_string()))?;
        for mut row in trans.rows_mut() {
            let moved = vector_from_lane(row.view()) + offset;
            write_lane(row.view_mut(), &moved);
        }

        debug!("concatenated {} sequences into {} frames", parts.len(), poses.len_of(Axis(0)));
        Ok(Self::new(poses, trans, first.fps)?.with_betas(betas))
    }

    /// Append one frame after the last
    pub fn push_frame(&mut self, pose: ArrayView2<'_, f64>, translation: &Vector3<f64>) -> Result<()> {
        if pose.dim() != (self.n_joints(), 3) {
            return Err(Error::shape(format!(
                "appended pose has shape {:?}, expected ({}, 3)",
                pose.dim(),
                self.n_joints()
            )));
        }
        let trans = ndarray::arr1(&[translation.x, translation.y, translation.z]);
        self.poses
            .push(Axis(0), pose)
            .map_err(|e| Error::shape(e.to_string()))?;
        self.trans
            .push_row(trans.view())
            .map_err(|e| Error::shape(e.to_string()))?;
        Ok(())
    }

    /// Delete one frame; the last remaining frame cannot be removed
    pub fn remove_frame(&mut self, frame: usize) -> Result<()> {
        self.check_frame(frame)?;
        if self.n_frames() == 1 {
            return Err(Error::InvalidData(
                "cannot remove the only frame of a sequence".to_string(),
            ));
        }
        let keep: Vec<usize> = (0..self.n_frames()).filter(|&f| f != frame).collect();
        self.poses = self.poses.select(Axis(0), &keep);
        self.trans = self.trans.select(Axis(0), &keep);
        Ok(())
    }

    /// Frames `[start, end)` as a new sequence
    pub fn crop(&self, start: usize, end: usize) -> Result<Self> {
        let len = self.n_frames();
        if end > len {
            return Err(Error::OutOfRange { frame: end, len });
        }
        if start >= end {
            return Err(Error::OutOfRange { frame: start, len: end });
        }
        debug!("cropping sequence of {} frames to [{}, {})", len, start, end);
        Ok(Self {
            poses: self.poses.slice(s![start..end, .., ..]).to_owned(),
            trans: self.trans.slice(s![start..end, ..]).to_owned(),
            betas: self.betas.clone(),
            fps: self.fps,
        })
    }

    /// Zero the root orientation and translation of every frame
    pub fn clear_root(&mut self) {
        self.poses.index_axis_mut(Axis(1), 0).fill(0.0);
        self.trans.fill(0.0);
    }

    /// Re-express the sequence in the root frame of its first frame.
    ///
    /// Afterwards frame 0 has identity root orientation and zero translation.
    pub fn normalize_root(&mut self) {
        let first_inv = aa_to_quat(&vector_from_lane(self.poses.slice(s![0, 0, ..]))).inverse();
        let first_trans = first_inv * vector_from_lane(self.trans.row(0));

        for frame in 0..self.n_frames() {
            let root = aa_to_quat(&vector_from_lane(self.poses.slice(s![frame, 0, ..])));
            write_lane(
                self.poses.slice_mut(s![frame, 0, ..]),
                &quat_to_aa(&(first_inv * root)),
            );

            let trans = first_inv * vector_from_lane(self.trans.row(frame)) - first_trans;
            write_lane(self.trans.row_mut(frame), &trans);
        }
    }

    /// Replace rotations and translations at `frames` with precomputed rows.
    ///
    /// `poses` is `(frames.len(), J, 3)` and `trans` is `(frames.len(), 3)`.
    /// Everything is validated before the first write.
    pub fn write_frames(&mut self, frames: &[usize], poses: ArrayView3<'_, f64>, trans: ArrayView2<'_, f64>) -> Result<()> {
        for &frame in frames {
            self.check_frame(frame)?;
        }
        if poses.dim() != (frames.len(), self.n_joints(), 3) {
            return Err(Error::shape(format!(
                "replacement poses have shape {:?}, expected ({}, {}, 3)",
                poses.dim(),
                frames.len(),
                self.n_joints()
            )));
        }
        if trans.dim() != (frames.len(), 3) {
            return Err(Error::shape(format!(
                "replacement translations have shape {:?}, expected ({}, 3)",
                trans.dim(),
                frames.len()
            )));
        }

        for (row, &frame) in frames.iter().enumerate() {
            self.poses
                .index_axis_mut(Axis(0), frame)
                .assign(&poses.index_axis(Axis(0), row));
            self.trans.row_mut(frame).assign(&trans.row(row));
        }
        Ok(())
    }
}

fn median_betas(parts: &[PoseSequence]) -> Result<Vec<f64>> {
    let shaped: Vec<&[f64]> = parts
        .iter()
        .map(|p| p.betas.as_slice())
        .filter(|b| !b.is_empty())
        .collect();
    let Some(first) = shaped.first() else {
        return Ok(Vec::new());
    };
    if shaped.iter().any(|b| b.len() != first.len()) {
        return Err(Error::shape("sequences carry different numbers of betas"));
    }

    let betas = (0..first.len())
        .map(|i| {
            let mut values: Vec<f64> = shaped.iter().map(|b| b[i]).collect();
            values.sort_by(f64::total_cmp);
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                0.5 * (values[mid - 1] + values[mid])
            } else {
                values[mid]
            }
        })
        .collect();
    Ok(betas)
}
