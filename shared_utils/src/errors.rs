use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidFitError {
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Invalid target size: {0}")]
    InvalidTargetSize(String),

    #[error("Target size too small: video bitrate would be {video_kbps} kbps (minimum 100)")]
    InfeasibleTarget { video_kbps: i64 },

    #[error("Could not determine duration of {0}")]
    DurationUnavailable(PathBuf),

    #[error("FFprobe failed: {0}")]
    FFprobeError(String),

    #[error("FFmpeg failed: {0}")]
    FFmpegError(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid path: {0}")]
    PathError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("General error: {0}")]
    GeneralError(String),
}

pub type Result<T> = std::result::Result<T, VidFitError>;
