//! Shared utilities for the vid-fit tool
//!
//! This crate provides the plumbing around the external prober/encoder:
//! - FFprobe wrapper (duration + audio bitrate extraction)
//! - Deadlock-free child process management
//! - External tool resolution
//! - Path validation and output naming
//! - Unified error taxonomy
//! - Logging setup

pub mod errors;
pub mod ffmpeg_process;
pub mod ffprobe;
pub mod logging;
pub mod path_validator;
pub mod tools;
pub mod types;

pub use errors::{Result, VidFitError};
pub use ffmpeg_process::{format_ffmpeg_error, ToolProcess};
pub use ffprobe::{parse_probe_output, probe_media, MediaMetadata, AUDIO_PROBE_FLOOR_KBPS};
pub use path_validator::{
    check_input_output_conflict, default_output_path, force_output_extension,
    validate_input_file, OUTPUT_EXTENSION,
};
pub use tools::resolve_tool;
pub use types::FileSize;
