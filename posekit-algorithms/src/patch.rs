//! Gap filling of individual frames inside a sequence

use crate::interpolation::{frame_ids_as_queries, interpolate_positions, interpolate_rotations};
use itertools::Itertools;
use log::debug;
use ndarray::Axis;
use posekit_core::{Error, PoseSequence, Result};

/// Split `0..n_frames` into (sorted unique replaced ids, anchor ids).
///
/// Fails with `OutOfRange` if any id is not a valid frame.
pub fn split_anchors(n_frames: usize, frame_ids_to_replace: &[usize]) -> Result<(Vec<usize>, Vec<usize>)> {
    if let Some(&frame) = frame_ids_to_replace.iter().find(|&&id| id >= n_frames) {
        return Err(Error::OutOfRange { frame, len: n_frames });
    }

    let replaced: Vec<usize> = frame_ids_to_replace.iter().copied().sorted_unstable().dedup().collect();
    let mut is_replaced = vec![false; n_frames];
    for &id in &replaced {
        is_replaced[id] = true;
    }
    let anchors = (0..n_frames).filter(|&id| !is_replaced[id]).collect();
    Ok((replaced, anchors))
}

/// Replace the given frames by interpolating from all remaining frames.
///
/// Joint rotations (root included) are interpolated with slerp, translations
/// linearly. Replaced frames at either end of the sequence take the nearest
/// remaining frame. All results are computed before the sequence is touched,
/// so on error the sequence is unchanged. Repeated ids are ignored and an
/// empty id list is a no-op.
///
/// # Errors
/// * `OutOfRange` if an id is `>= sequence.n_frames()`
/// * `InsufficientAnchors` if fewer than two frames would remain as anchors
pub fn patch_frames(sequence: &mut PoseSequence, frame_ids_to_replace: &[usize]) -> Result<()> {
    if frame_ids_to_replace.is_empty() {
        return Ok(());
    }

    let (replaced, anchors) = split_anchors(sequence.n_frames(), frame_ids_to_replace)?;
    if anchors.len() < 2 {
        return Err(Error::InsufficientAnchors { found: anchors.len() });
    }
    debug!(
        "patching {} of {} frames from {} anchors",
        replaced.len(),
        sequence.n_frames(),
        anchors.len()
    );

    let queries = frame_ids_as_queries(&replaced);
    let known_poses = sequence.poses().select(Axis(0), &anchors);
    let known_trans = sequence.trans().select(Axis(0), &anchors);
    let poses = interpolate_rotations(known_poses.view(), &anchors, &queries)?;
    let trans = interpolate_positions(known_trans.view(), &anchors, &queries)?;

    sequence.write_frames(&replaced, poses.view(), trans.view())
}
