//! # posekit algorithms
//!
//! Temporal kernels for articulated motion sequences.
//!
//! This crate provides spherical interpolation of joint rotations, linear
//! interpolation of positions, re-timing of dense sequences to a new frame
//! rate, and gap filling of individual frames in a [`PoseSequence`].
//!
//! All kernels are pure: they borrow anchor data and return new buffers.

pub mod interpolation;
pub mod resample;
pub mod patch;

// Re-export commonly used items
pub use interpolation::*;
pub use resample::*;
pub use patch::*;

use posekit_core::{PoseSequence, Result};

/// Extension trait adding the temporal kernels to [`PoseSequence`]
pub trait SequenceInterpolation {
    /// Replace the given frames by interpolating their neighbours in place
    fn patch_frames(&mut self, frame_ids: &[usize]) -> Result<()>;

    /// Return a copy re-timed to `fps_out`
    fn resampled(&self, fps_out: f64) -> Result<PoseSequence>;
}

impl SequenceInterpolation for PoseSequence {
    fn patch_frames(&mut self, frame_ids: &[usize]) -> Result<()> {
        patch::patch_frames(self, frame_ids)
    }

    fn resampled(&self, fps_out: f64) -> Result<PoseSequence> {
        resample::resample_sequence(self, fps_out)
    }
}
