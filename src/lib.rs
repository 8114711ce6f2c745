//! # posekit
//!
//! Interpolation and resampling of articulated motion sequences for Rust.
//!
//! This is the umbrella crate that provides convenient access to all posekit functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Pose sequences, axis-angle rotation helpers, up-axis conversion
//! - **Algorithms**: Rotation/position interpolation, resampling, frame patching
//! - **I/O**: CSV and JSON sequence files plus the configurable load pipeline
//!
//! ## Quick Start
//!
//! ```rust
//! use posekit::prelude::*;
//!
//! let mut sequence = PoseSequence::zeros(10, 24, 30.0).unwrap();
//! sequence.set_joint_rotation(9, 1, &Vector3::new(0.0, 0.0, 1.0)).unwrap();
//!
//! // Rebuild a damaged frame from its neighbours
//! sequence.patch_frames(&[4]).unwrap();
//!
//! // Resample to 60 fps
//! let resampled = sequence.resampled(60.0).unwrap();
//! assert_eq!(resampled.n_frames(), 19);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables core, algorithms and io
//! - `algorithms`: Interpolation, resampling and patching
//! - `io`: File format support and load options
//! - `all`: Enables all features

// Re-export core functionality
pub use posekit_core::*;

// Re-export sub-crates
#[cfg(feature = "algorithms")]
pub use posekit_algorithms as algorithms;

#[cfg(feature = "io")]
pub use posekit_io as io;

/// Convenient imports for common use cases
pub mod prelude {
    pub use posekit_core::*;

    #[cfg(feature = "algorithms")]
    pub use posekit_algorithms::*;

    #[cfg(feature = "io")]
    pub use posekit_io::*;
}
