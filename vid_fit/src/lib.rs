//! vid-fit - Target-Size Video Compression
//!
//! Computes the bitrate pair that steers ffmpeg toward a requested
//! output size, then corrects it from the measured result:
//! - probe duration and audio bitrate once
//! - split the total budget between audio and video
//! - encode (two passes), measure, correct, encode again if needed
//!
//! ```rust,ignore
//! use vid_fit::allocation::{allocate, total_bitrate_kbps};
//!
//! let total = total_bitrate_kbps(25.0, 120.0);
//! let budget = allocate(total, Some(192))?;
//! ```

pub mod allocation;
pub mod convergence;
pub mod encoder;

pub use allocation::{allocate, total_bitrate_kbps, BitrateBudget};
pub use convergence::{
    converge_on_size, AttemptResult, ConvergenceReport, ConvergenceState, EncodeBackend,
    MAX_ATTEMPTS, SIZE_TOLERANCE,
};
pub use encoder::TwoPassEncoder;

pub use shared_utils::errors::{Result, VidFitError};
