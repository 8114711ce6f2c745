use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use posekit_algorithms::SequenceInterpolation;
use posekit_core::{PoseSequence, Vector3};
use posekit_io::{load_sequence, read_sequence, write_sequence, LoadOptions};
use std::path::{Path, PathBuf};

mod config;
mod frames;

use config::CliConfig;
use frames::{parse_frame_list, parse_offset, FrameList};

#[derive(Parser, Debug)]
#[command(version, about = "Resample, patch and convert articulated motion sequences")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a sequence file
    Info { input: PathBuf },

    /// Resample a sequence to a new frame rate
    Resample {
        input: PathBuf,
        output: PathBuf,
        /// Target frame rate
        #[arg(long)]
        fps: f64,
    },

    /// Replace frames by interpolating from the remaining ones
    Patch {
        input: PathBuf,
        output: PathBuf,
        /// Frames to replace, e.g. `3,4,10-12`
        #[arg(long, value_parser = parse_frame_list)]
        frames: FrameList,
    },

    /// Join sequences end to end
    Concat {
        output: PathBuf,
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,
        /// Translation added to every frame, e.g. `0,0,1.5`
        #[arg(long, value_parser = parse_offset, allow_hyphen_values = true)]
        offset: Option<Vector3<f64>>,
    },

    /// Load a sequence through the import pipeline and write it out
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// TOML file with a `[load]` table
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Overrides `load.fps_out`
        #[arg(long)]
        fps: Option<f64>,
        /// Overrides `load.start_frame`
        #[arg(long)]
        start: Option<usize>,
        /// Overrides `load.end_frame`
        #[arg(long)]
        end: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Info { input } => {
            let sequence = read(&input)?;
            print_summary(&input, &sequence);
        }
        Command::Resample { input, output, fps } => {
            let sequence = read(&input)?;
            let resampled = sequence
                .resampled(fps)
                .with_context(|| format!("resampling {} to {} fps", input.display(), fps))?;
            write(&resampled, &output)?;
        }
        Command::Patch { input, output, frames: FrameList(frames) } => {
            let mut sequence = read(&input)?;
            sequence
                .patch_frames(&frames)
                .with_context(|| format!("patching {} frames of {}", frames.len(), input.display()))?;
            write(&sequence, &output)?;
        }
        Command::Concat { output, inputs, offset } => {
            let parts = inputs.iter().map(|path| read(path)).collect::<Result<Vec<_>>>()?;
            let joined = PoseSequence::concat(&parts, &offset.unwrap_or_else(|| Vector3::zeros()))
                .with_context(|| format!("concatenating {} sequences", parts.len()))?;
            write(&joined, &output)?;
        }
        Command::Convert { input, output, config, fps, start, end } => {
            let mut options = match config {
                Some(path) => CliConfig::load(path)?.load,
                None => LoadOptions::default(),
            };
            if fps.is_some() {
                options.fps_out = fps;
            }
            if start.is_some() {
                options.start_frame = start;
            }
            if end.is_some() {
                options.end_frame = end;
            }
            info!("load options: {:?}", options);

            let sequence = load_sequence(&input, &options)
                .with_context(|| format!("loading {}", input.display()))?;
            write(&sequence, &output)?;
        }
    }

    Ok(())
}

fn read(path: &Path) -> Result<PoseSequence> {
    read_sequence(path).with_context(|| format!("reading {}", path.display()))
}

fn write(sequence: &PoseSequence, path: &Path) -> Result<()> {
    write_sequence(sequence, path).with_context(|| format!("writing {}", path.display()))
}

fn print_summary(path: &Path, sequence: &PoseSequence) {
    println!("{}", path.display());
    println!("  frames:   {}", sequence.n_frames());
    println!("  joints:   {}", sequence.n_joints());
    println!("  fps:      {}", sequence.fps());
    println!("  duration: {:.3} s", sequence.duration());
    println!("  betas:    {}", sequence.betas().len());
}
