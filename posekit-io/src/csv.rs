//! CSV motion sequence format
//!
//! One row per frame, translation first, then the axis-angle rotation of every
//! joint:
//!
//! ```text
//! # fps=30
//! # betas=0.12;-0.4;0.9
//! frame,tx,ty,tz,j0_x,j0_y,j0_z,j1_x,j1_y,j1_z
//! 0,0.0,0.9,0.0,0.0,0.0,0.0,0.1,0.0,0.0
//! 1,0.01,0.9,0.0,0.0,0.02,0.0,0.12,0.0,0.0
//! ```
//!
//! Metadata lines start with `#`. The `fps` entry is required; `betas` is
//! optional. The frame column must count up from 0 without gaps.

use crate::{SequenceReader, SequenceWriter};
use log::info;
use ndarray::{Array2, Array3};
use posekit_core::{Error, PoseSequence, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Number of leading non-rotation columns: frame, tx, ty, tz
const PREFIX_COLUMNS: usize = 4;

/// CSV sequence reader
pub struct CsvReader;

/// CSV sequence writer
pub struct CsvWriter;

/// Header line for a sequence with `n_joints` joints
pub fn header_line(n_joints: usize) -> String {
    let mut columns = vec!["frame".to_string(), "tx".to_string(), "ty".to_string(), "tz".to_string()];
    for joint in 0..n_joints {
        for axis in ["x", "y", "z"] {
            columns.push(format!("j{}_{}", joint, axis));
        }
    }
    columns.join(",")
}

#[derive(Debug, Default)]
struct Metadata {
    fps: Option<f64>,
    betas: Vec<f64>,
}

impl Metadata {
    fn parse_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        let Some((key, value)) = line.split_once('=') else {
            // free-form comment
            return Ok(());
        };
        match key.trim() {
            "fps" => self.fps = Some(parse_value(value, line_no)?),
            "betas" => {
                self.betas = value
                    .split(';')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| parse_value(v, line_no))
                    .collect::<Result<Vec<_>>>()?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn parse_value(field: &str, line_no: usize) -> Result<f64> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::Parse(format!("line {}: invalid number '{}': {}", line_no, field.trim(), e)))
}

impl CsvReader {
    /// Parse a sequence from any buffered reader
    pub fn read_from<R: BufRead>(reader: R) -> Result<PoseSequence> {
        let mut metadata = Metadata::default();
        let mut n_columns: Option<usize> = None;
        let mut values: Vec<f64> = Vec::new();
        let mut n_frames = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix('#') {
                metadata.parse_line(comment, line_no)?;
                continue;
            }

            let Some(width) = n_columns else {
                n_columns = Some(parse_header(trimmed, line_no)?);
                continue;
            };

            let fields: Vec<&str> = trimmed.split(',').collect();
            if fields.len() != width {
                return Err(Error::Parse(format!(
                    "line {}: expected {} columns, found {}",
                    line_no,
                    width,
                    fields.len()
                )));
            }

            let frame: usize = fields[0].trim().parse().map_err(|_| {
                Error::Parse(format!("line {}: invalid frame index '{}'", line_no, fields[0].trim()))
            })?;
            if frame != n_frames {
                return Err(Error::InvalidData(format!(
                    "line {}: expected frame {}, found {}",
                    line_no, n_frames, frame
                )));
            }

            for field in &fields[1..] {
                values.push(parse_value(field, line_no)?);
            }
            n_frames += 1;
        }

        let width = n_columns.ok_or_else(|| Error::Parse("missing header line".to_string()))?;
        let fps = metadata
            .fps
            .ok_or_else(|| Error::InvalidData("missing '# fps=' metadata line".to_string()))?;
        let n_joints = (width - PREFIX_COLUMNS) / 3;
        let row_len = width - 1;

        let trans = Array2::from_shape_fn((n_frames, 3), |(f, c)| values[f * row_len + c]);
        let poses = Array3::from_shape_fn((n_frames, n_joints, 3), |(f, j, c)| {
            values[f * row_len + 3 + j * 3 + c]
        });

        Ok(PoseSequence::new(poses, trans, fps)?.with_betas(metadata.betas))
    }
}

fn parse_header(line: &str, line_no: usize) -> Result<usize> {
    let columns: Vec<&str> = line.split(',').map(str::trim).collect();
    if columns.len() < PREFIX_COLUMNS + 3 || (columns.len() - PREFIX_COLUMNS) % 3 != 0 {
        return Err(Error::Parse(format!(
            "line {}: header has {} columns, expected frame,tx,ty,tz followed by 3 per joint",
            line_no,
            columns.len()
        )));
    }
    if !columns[0].eq_ignore_ascii_case("frame") {
        return Err(Error::Parse(format!(
            "line {}: header must start with 'frame', found '{}'",
            line_no, columns[0]
        )));
    }
    Ok(columns.len())
}

impl CsvWriter {
    /// Write a sequence to any writer
    pub fn write_to<W: Write>(sequence: &PoseSequence, mut writer: W) -> Result<()> {
        writeln!(writer, "# fps={}", sequence.fps())?;
        if !sequence.betas().is_empty() {
            let betas: Vec<String> = sequence.betas().iter().map(|b| b.to_string()).collect();
            writeln!(writer, "# betas={}", betas.join(";"))?;
        }
        writeln!(writer, "{}", header_line(sequence.n_joints()))?;

        let poses = sequence.poses();
        let trans = sequence.trans();
        for frame in 0..sequence.n_frames() {
            write!(writer, "{}", frame)?;
            for value in trans.row(frame).iter().chain(poses.index_axis(ndarray::Axis(0), frame).iter()) {
                write!(writer, ",{}", value)?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl SequenceReader for CsvReader {
    fn read_sequence<P: AsRef<Path>>(path: P) -> Result<PoseSequence> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let sequence = Self::read_from(BufReader::new(file))?;
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

impl SequenceWriter for CsvWriter {
    fn write_sequence<P: AsRef<Path>>(sequence: &PoseSequence, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        CsvWriter::write_to(sequence, BufWriter::new(file))?;
        info!("wrote {} frames to {}", sequence.n_frames(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "# fps=30
# recorded with a test rig
# betas=0.5;-0.25
frame,tx,ty,tz,j0_x,j0_y,j0_z,j1_x,j1_y,j1_z
0,0.0,0.9,0.0,0.0,0.0,0.0,0.1,0.0,0.0
1,0.01,0.9,0.02,0.0,0.02,0.0,0.12,0.0,0.0
";

    #[test]
    fn test_header_line() {
        assert_eq!(header_line(1), "frame,tx,ty,tz,j0_x,j0_y,j0_z");
    }

    #[test]
    fn test_read_sample() {
        let sequence = CsvReader::read_from(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(sequence.n_frames(), 2);
        assert_eq!(sequence.n_joints(), 2);
        assert_eq!(sequence.fps(), 30.0);
        assert_eq!(sequence.betas(), &[0.5, -0.25]);
        assert_eq!(sequence.trans()[[1, 2]], 0.02);
        assert_eq!(sequence.poses()[[1, 0, 1]], 0.02);
        assert_eq!(sequence.poses()[[1, 1, 0]], 0.12);
    }

    #[test]
    fn test_write_then_read() {
        let sequence = CsvReader::read_from(Cursor::new(SAMPLE)).unwrap();
        let mut buffer = Vec::new();
        CsvWriter::write_to(&sequence, &mut buffer).unwrap();
        let reread = CsvReader::read_from(Cursor::new(buffer)).unwrap();
        assert_eq!(reread, sequence);
    }

    #[test]
    fn test_missing_fps() {
        let input = "frame,tx,ty,tz,j0_x,j0_y,j0_z\n0,0,0,0,0,0,0\n";
        assert!(matches!(CsvReader::read_from(Cursor::new(input)), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_frame_gap() {
        let input = "# fps=30\nframe,tx,ty,tz,j0_x,j0_y,j0_z\n0,0,0,0,0,0,0\n2,0,0,0,0,0,0\n";
        assert!(matches!(CsvReader::read_from(Cursor::new(input)), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_bad_rows() {
        let short = "# fps=30\nframe,tx,ty,tz,j0_x,j0_y,j0_z\n0,0,0,0,0,0\n";
        assert!(matches!(CsvReader::read_from(Cursor::new(short)), Err(Error::Parse(_))));

        let garbage = "# fps=30\nframe,tx,ty,tz,j0_x,j0_y,j0_z\n0,0,0,abc,0,0,0\n";
        assert!(matches!(CsvReader::read_from(Cursor::new(garbage)), Err(Error::Parse(_))));

        let header = "# fps=30\nframe,tx,ty,tz,j0_x,j0_y\n";
        assert!(matches!(CsvReader::read_from(Cursor::new(header)), Err(Error::Parse(_))));
    }

    #[test]
    fn test_no_frames() {
        let input = "# fps=30\nframe,tx,ty,tz,j0_x,j0_y,j0_z\n";
        assert!(matches!(CsvReader::read_from(Cursor::new(input)), Err(Error::ShapeMismatch(_))));
    }
}
