//! Re-timing of densely sampled sequences to a new frame rate

use crate::interpolation::{check_position_shape, check_rotation_shape, interpolate_positions, interpolate_rotations};
use log::{debug, info};
use ndarray::{Array, Array3, ArrayView, ArrayView3, Axis, RemoveAxis};
use posekit_core::{check_rate, Error, PoseSequence, Result};

/// Absorbs representation error in `duration * fps_out` so that e.g.
/// 9 / 30 * 60 counts as 18 rather than 17.999...
const FRAME_COUNT_EPSILON: f64 = 1e-9;

/// Number of output frames when re-timing `n_frames` from `fps_in` to `fps_out`.
///
/// `floor((n_frames - 1) / fps_in * fps_out) + 1`, so the output never runs
/// past the last input sample. Fails with `InvalidRate` when the count does
/// not fit in `usize`.
pub fn resampled_frame_count(n_frames: usize, fps_in: f64, fps_out: f64) -> Result<usize> {
    check_rate(fps_in)?;
    check_rate(fps_out)?;
    if n_frames == 0 {
        return Ok(0);
    }
    if fps_in == fps_out {
        return Ok(n_frames);
    }
    let duration = (n_frames - 1) as f64 / fps_in;
    let steps = (duration * fps_out + FRAME_COUNT_EPSILON).floor();
    if steps >= usize::MAX as f64 {
        return Err(Error::InvalidRate { fps: fps_out });
    }
    (steps as usize)
        .checked_add(1)
        .ok_or(Error::InvalidRate { fps: fps_out })
}

/// Fractional input-frame coordinates of every output frame
pub fn resample_times(n_frames: usize, fps_in: f64, fps_out: f64) -> Result<Vec<f64>> {
    let n_out = resampled_frame_count(n_frames, fps_in, fps_out)?;
    // k * fps_in first keeps integer coordinates exact when the rates divide
    Ok((0..n_out)
        .map(|k| k as f64 * fps_in / fps_out)
        .collect())
}

/// Re-time `(N, J, 3)` axis-angle rotations from `fps_in` to `fps_out`
pub fn resample_rotations(rotations: ArrayView3<'_, f64>, fps_in: f64, fps_out: f64) -> Result<Array3<f64>> {
    check_rate(fps_in)?;
    check_rate(fps_out)?;
    check_rotation_shape(rotations.shape())?;
    if fps_in == fps_out {
        return Ok(rotations.to_owned());
    }

    let n_frames = rotations.len_of(Axis(0));
    let known: Vec<usize> = (0..n_frames).collect();
    let queries = resample_times(n_frames, fps_in, fps_out)?;
    debug!(
        "resampling {} rotation frames at {} fps to {} frames at {} fps",
        n_frames,
        fps_in,
        queries.len(),
        fps_out
    );
    interpolate_rotations(rotations, &known, &queries)
}

/// Re-time `(N, ..., 3)` positions from `fps_in` to `fps_out`
pub fn resample_positions<D: RemoveAxis>(
    positions: ArrayView<'_, f64, D>,
    fps_in: f64,
    fps_out: f64,
) -> Result<Array<f64, D>> {
    check_rate(fps_in)?;
    check_rate(fps_out)?;
    check_position_shape(positions.shape())?;
    if fps_in == fps_out {
        return Ok(positions.to_owned());
    }

    let n_frames = positions.len_of(Axis(0));
    let known: Vec<usize> = (0..n_frames).collect();
    let queries = resample_times(n_frames, fps_in, fps_out)?;
    debug!(
        "resampling {} position frames at {} fps to {} frames at {} fps",
        n_frames,
        fps_in,
        queries.len(),
        fps_out
    );
    interpolate_positions(positions, &known, &queries)
}

/// Re-time a whole sequence, keeping its body shape
pub fn resample_sequence(sequence: &PoseSequence, fps_out: f64) -> Result<PoseSequence> {
    let poses = resample_rotations(sequence.poses(), sequence.fps(), fps_out)?;
    let trans = resample_positions(sequence.trans(), sequence.fps(), fps_out)?;
    info!(
        "resampled sequence from {} frames at {} fps to {} frames at {} fps",
        sequence.n_frames(),
        sequence.fps(),
        poses.len_of(Axis(0)),
        fps_out
    );
    Ok(PoseSequence::new(poses, trans, fps_out)?.with_betas(sequence.betas().to_vec()))
}
