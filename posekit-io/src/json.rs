//! JSON motion sequence format

use crate::{SequenceReader, SequenceWriter};
use log::info;
use ndarray::{Array2, Array3, Axis};
use posekit_core::{Error, PoseSequence, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// On-disk layout: nested arrays indexed `[frame][joint][component]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceDocument {
    pub fps: f64,
    #[serde(default)]
    pub betas: Vec<f64>,
    pub poses: Vec<Vec<[f64; 3]>>,
    pub trans: Vec<[f64; 3]>,
}

impl From<&PoseSequence> for SequenceDocument {
    fn from(sequence: &PoseSequence) -> Self {
        let poses = sequence
            .poses()
            .axis_iter(Axis(0))
            .map(|frame| {
                frame
                    .rows()
                    .into_iter()
                    .map(|r| [r[0], r[1], r[2]])
                    .collect()
            })
            .collect();
        let trans = sequence
            .trans()
            .rows()
            .into_iter()
            .map(|r| [r[0], r[1], r[2]])
            .collect();
        Self {
            fps: sequence.fps(),
            betas: sequence.betas().to_vec(),
            poses,
            trans,
        }
    }
}

impl TryFrom<SequenceDocument> for PoseSequence {
    type Error = Error;

    fn try_from(document: SequenceDocument) -> Result<Self> {
        let n_frames = document.poses.len();
        let n_joints = document.poses.first().map_or(0, Vec::len);
        if let Some((frame, joints)) = document
            .poses
            .iter()
            .enumerate()
            .find(|(_, joints)| joints.len() != n_joints)
        {
            return Err(Error::ShapeMismatch(format!(
                "frame {} has {} joints, frame 0 has {}",
                frame,
                joints.len(),
                n_joints
            )));
        }

        let poses = Array3::from_shape_fn((n_frames, n_joints, 3), |(f, j, c)| document.poses[f][j][c]);
        let trans = Array2::from_shape_fn((document.trans.len(), 3), |(f, c)| document.trans[f][c]);
        Ok(PoseSequence::new(poses, trans, document.fps)?.with_betas(document.betas))
    }
}

/// JSON sequence reader
pub struct JsonReader;

/// JSON sequence writer
pub struct JsonWriter;

impl JsonReader {
    /// Parse a sequence from any reader
    pub fn read_from<R: Read>(reader: R) -> Result<PoseSequence> {
        let document: SequenceDocument =
            serde_json::from_reader(reader).map_err(|e| Error::Parse(e.to_string()))?;
        PoseSequence::try_from(document)
    }
}

impl JsonWriter {
    /// Write a sequence to any writer
    pub fn write_to<W: Write>(sequence: &PoseSequence, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, &SequenceDocument::from(sequence))
            .map_err(|e| Error::Parse(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }
}

impl SequenceReader for JsonReader {
    fn read_sequence<P: AsRef<Path>>(path: P) -> Result<PoseSequence> {
        let path = path.as_ref();
        let sequence = Self::read_from(BufReader::new(File::open(path)?))?;
        info!(
            "read {} frames x {} joints at {} fps from {}",
            sequence.n_frames(),
            sequence.n_joints(),
            sequence.fps(),
            path.display()
        );
        Ok(sequence)
    }
}

impl SequenceWriter for JsonWriter {
    fn write_sequence<P: AsRef<Path>>(sequence: &PoseSequence, path: P) -> Result<()> {
        let path = path.as_ref();
        Self::write_to(sequence, BufWriter::new(File::create(path)?))?;
        info!("wrote {} frames to {}", sequence.n_frames(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_document() {
        let input = r#"{
            "fps": 60.0,
            "poses": [[[0.0, 0.1, 0.0], [0.2, 0.0, 0.0]], [[0.0, 0.2, 0.0], [0.3, 0.0, 0.0]]],
            "trans": [[0.0, 0.9, 0.0], [0.1, 0.9, 0.0]]
        }"#;
        let sequence = JsonReader::read_from(Cursor::new(input)).unwrap();
        assert_eq!(sequence.n_frames(), 2);
        assert_eq!(sequence.n_joints(), 2);
        assert_eq!(sequence.fps(), 60.0);
        assert!(sequence.betas().is_empty());
        assert_eq!(sequence.poses()[[1, 1, 0]], 0.3);
    }

    #[test]
    fn test_write_then_read() {
        let sequence = PoseSequence::zeros(3, 2, 24.0).unwrap().with_betas(vec![0.25; 4]);
        let mut buffer = Vec::new();
        JsonWriter::write_to(&sequence, &mut buffer).unwrap();
        assert_eq!(JsonReader::read_from(Cursor::new(buffer)).unwrap(), sequence);
    }

    #[test]
    fn test_ragged_joints() {
        let input = r#"{"fps": 30, "poses": [[[0,0,0]], [[0,0,0],[0,0,0]]], "trans": [[0,0,0],[0,0,0]]}"#;
        assert!(matches!(JsonReader::read_from(Cursor::new(input)), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_translation_count_mismatch() {
        let input = r#"{"fps": 30, "poses": [[[0,0,0]], [[0,0,0]]], "trans": [[0,0,0]]}"#;
        assert!(matches!(JsonReader::read_from(Cursor::new(input)), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(JsonReader::read_from(Cursor::new("{\"fps\": ")), Err(Error::Parse(_))));
    }
}
