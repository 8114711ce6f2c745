use anyhow::{bail, Context, Result};
use posekit_core::Vector3;

/// Upper bound on the number of frames a list may name
pub const MAX_FRAMES: usize = 1 << 20;

/// Frame indices given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameList(pub Vec<usize>);

/// Parse a frame list such as `3,4,10-12`
///
/// Ranges are inclusive on both ends. Lists naming more than
/// [`MAX_FRAMES`] frames are rejected before any range is expanded.
pub fn parse_frame_list(input: &str) -> Result<FrameList> {
    let mut frames = Vec::new();

    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_index(start)?;
                let end = parse_index(end)?;
                if start > end {
                    bail!("frame range {}-{} is reversed", start, end);
                }
                if end - start >= MAX_FRAMES - frames.len() {
                    bail!("frame list names more than {} frames", MAX_FRAMES);
                }
                frames.extend(start..=end);
            }
            None => {
                if frames.len() == MAX_FRAMES {
                    bail!("frame list names more than {} frames", MAX_FRAMES);
                }
                frames.push(parse_index(part)?);
            }
        }
    }

    if frames.is_empty() {
        bail!("no frames given");
    }
    Ok(FrameList(frames))
}

/// Parse a translation written as `x,y,z`
pub fn parse_offset(input: &str) -> Result<Vector3<f64>> {
    let values = input
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid offset component '{}'", v.trim()))
        })
        .collect::<Result<Vec<_>>>()?;
    match values[..] {
        [x, y, z] => Ok(Vector3::new(x, y, z)),
        _ => bail!("offset needs 3 components, got {}", values.len()),
    }
}

fn parse_index(text: &str) -> Result<usize> {
    text.trim()
        .parse()
        .with_context(|| format!("invalid frame index '{}'", text.trim()))
}
