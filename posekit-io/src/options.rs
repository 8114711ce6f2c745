//! Import pipeline configuration

use log::{info, warn};
use posekit_algorithms::SequenceInterpolation;
use posekit_core::{Error, PoseSequence, Result, UpAxis};
use serde::{Deserialize, Serialize};

/// Configuration for loading a sequence from disk
///
/// Steps run in a fixed order: crop, root removal, root normalisation,
/// up-axis conversion, resampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// First frame to keep
    pub start_frame: Option<usize>,
    /// One past the last frame to keep; clamped to the sequence length
    pub end_frame: Option<usize>,
    /// Target frame rate; `None` keeps the recorded rate
    pub fps_out: Option<f64>,
    /// When false, root orientation and translation are zeroed
    pub include_root: bool,
    /// Express the motion relative to the first frame's root
    pub normalize_root: bool,
    /// Up-axis convention of the recording
    pub up_axis: UpAxis,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            start_frame: None,
            end_frame: None,
            fps_out: None,
            include_root: true,
            normalize_root: false,
            up_axis: UpAxis::Y,
        }
    }
}

impl LoadOptions {
    /// Options for AMASS-style recordings: Z-up data
    pub fn amass() -> Self {
        Self {
            up_axis: UpAxis::Z,
            ..Self::default()
        }
    }

    /// Keep frames `[start, end)`
    pub fn with_frame_range(mut self, start: usize, end: usize) -> Self {
        self.start_frame = Some(start);
        self.end_frame = Some(end);
        self
    }

    /// Resample to `fps` after loading
    pub fn with_fps_out(mut self, fps: f64) -> Self {
        self.fps_out = Some(fps);
        self
    }

    pub fn with_normalized_root(mut self) -> Self {
        self.normalize_root = true;
        self
    }

    pub fn without_root(mut self) -> Self {
        self.include_root = false;
        self
    }

    pub fn with_up_axis(mut self, up_axis: UpAxis) -> Self {
        self.up_axis = up_axis;
        self
    }

    /// Run the pipeline on an already loaded sequence
    pub fn apply(&self, sequence: PoseSequence) -> Result<PoseSequence> {
        let mut sequence = self.crop(sequence)?;

        if !self.include_root {
            sequence.clear_root();
        }
        if self.normalize_root {
            sequence.normalize_root();
        }
        sequence.apply_up_axis(self.up_axis);

        match self.fps_out {
            Some(fps_out) if fps_out != sequence.fps() => sequence.resampled(fps_out),
            _ => Ok(sequence),
        }
    }

    fn crop(&self, sequence: PoseSequence) -> Result<PoseSequence> {
        if self.start_frame.is_none() && self.end_frame.is_none() {
            return Ok(sequence);
        }

        let len = sequence.n_frames();
        let start = self.start_frame.unwrap_or(0);
        let mut end = self.end_frame.unwrap_or(len);
        if end > len {
            warn!("end frame {} past sequence end, clamping to {}", end, len);
            end = len;
        }
        if start >= end {
            return Err(Error::OutOfRange { frame: start, len: end });
        }
        info!("keeping frames [{}, {}) of {}", start, end, len);
        sequence.crop(start, end)
    }
}
