//! Two-pass ffmpeg encode invoker
//!
//! One attempt = two sequential ffmpeg runs: an analysis pass that
//! discards its output, then the final pass that reuses the analysis
//! data. The passes share a per-run log basename in the system temp
//! dir; every sibling artifact of that basename is removed after the
//! attempt on all exit paths (cleanup failures are swallowed).

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use shared_utils::errors::{Result, VidFitError};
use shared_utils::ffmpeg_process::{format_ffmpeg_error, ToolProcess};
use shared_utils::types::FileSize;

use crate::convergence::EncodeBackend;

/// Discard sink for the analysis pass.
fn null_sink() -> &'static str {
    if cfg!(windows) {
        "NUL"
    } else {
        "/dev/null"
    }
}

/// Drives ffmpeg for one input/output pair.
pub struct TwoPassEncoder {
    ffmpeg: PathBuf,
    input: PathBuf,
    output: PathBuf,
    passlog_base: PathBuf,
}

impl TwoPassEncoder {
    pub fn new(ffmpeg: &Path, input: &Path, output: &Path) -> Self {
        // Unique per run; both passes of an attempt share it.
        let passlog_base =
            std::env::temp_dir().join(format!("vid_fit_2pass_{}", std::process::id()));
        Self {
            ffmpeg: ffmpeg.to_path_buf(),
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            passlog_base,
        }
    }

    fn run_pass(&self, args: &[String], pass_label: &str) -> Result<()> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(args);

        let process = ToolProcess::spawn(&mut cmd)
            .map_err(|e| VidFitError::FFmpegError(format!("{} failed to start: {}", pass_label, e)))?;
        let (status, stderr) = process
            .wait_with_output()
            .map_err(|e| VidFitError::FFmpegError(format!("{}: {}", pass_label, e)))?;

        if !status.success() {
            return Err(VidFitError::FFmpegError(format!(
                "{} exited with {:?}: {}",
                pass_label,
                status.code(),
                format_ffmpeg_error(&stderr)
            )));
        }
        Ok(())
    }
}

impl EncodeBackend for TwoPassEncoder {
    fn encode(&mut self, video_kbps: u32, audio_kbps: u32, attempt: u32) -> Result<FileSize> {
        let _cleanup = PassLogGuard::new(self.passlog_base.clone());

        info!("   Pass 1/2: bitrate analysis...");
        let args = analysis_pass_args(&self.input, video_kbps, &self.passlog_base);
        self.run_pass(&args, "analysis pass")?;

        info!("   Pass 2/2: final encode...");
        let args = encode_pass_args(
            &self.input,
            &self.output,
            video_kbps,
            audio_kbps,
            &self.passlog_base,
        );
        self.run_pass(&args, "encode pass")?;

        let size = std::fs::metadata(&self.output)
            .map_err(|e| {
                VidFitError::FFmpegError(format!(
                    "Failed to read output {}: {}",
                    self.output.display(),
                    e
                ))
            })?
            .len();

        if size == 0 {
            let _ = std::fs::remove_file(&self.output);
            return Err(VidFitError::FFmpegError(
                "Output file is empty (encoding may have failed)".to_string(),
            ));
        }

        debug!(attempt, video_kbps, audio_kbps, size, "Attempt complete");
        Ok(FileSize::new(size))
    }
}

/// Pass 1: video-only analysis, output discarded.
pub fn analysis_pass_args(input: &Path, video_kbps: u32, passlog_base: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-b:v".to_string(),
        format!("{}k", video_kbps),
        "-pass".to_string(),
        "1".to_string(),
        "-passlogfile".to_string(),
        passlog_base.display().to_string(),
        "-an".to_string(),
        "-f".to_string(),
        "mp4".to_string(),
        null_sink().to_string(),
    ]
}

/// Pass 2: final encode with audio and progressive-download layout.
pub fn encode_pass_args(
    input: &Path,
    output: &Path,
    video_kbps: u32,
    audio_kbps: u32,
    passlog_base: &Path,
) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-b:v".to_string(),
        format!("{}k", video_kbps),
        "-pass".to_string(),
        "2".to_string(),
        "-passlogfile".to_string(),
        passlog_base.display().to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        format!("{}k", audio_kbps),
        "-movflags".to_string(),
        "+faststart".to_string(),
        output.display().to_string(),
    ]
}

/// Removes every analysis artifact sharing the passlog basename when
/// dropped, whatever path the attempt exited through.
struct PassLogGuard {
    base: PathBuf,
}

impl PassLogGuard {
    fn new(base: PathBuf) -> Self {
        Self { base }
    }
}

impl Drop for PassLogGuard {
    fn drop(&mut self) {
        remove_passlog_artifacts(&self.base);
    }
}

/// Best-effort removal of `{base}*` (e.g. `-0.log`, `-0.log.mbtree`).
fn remove_passlog_artifacts(base: &Path) {
    let (Some(dir), Some(prefix)) = (base.parent(), base.file_name().and_then(|n| n.to_str()))
    else {
        return;
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(prefix) {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_pass_args() {
        let args = analysis_pass_args(Path::new("in.avi"), 1562, Path::new("/tmp/plog"));
        assert!(args.contains(&"-an".to_string()));
        assert!(args.contains(&"1562k".to_string()));
        let pass_idx = args.iter().position(|a| a == "-pass").unwrap();
        assert_eq!(args[pass_idx + 1], "1");
        // Discarded output, no audio args
        assert_eq!(args.last().unwrap(), null_sink());
        assert!(!args.contains(&"-c:a".to_string()));
        assert!(!args.contains(&"+faststart".to_string()));
    }

    #[test]
    fn test_encode_pass_args() {
        let args = encode_pass_args(
            Path::new("in.avi"),
            Path::new("out.mp4"),
            1446,
            128,
            Path::new("/tmp/plog"),
        );
        let pass_idx = args.iter().position(|a| a == "-pass").unwrap();
        assert_eq!(args[pass_idx + 1], "2");
        assert!(args.contains(&"1446k".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(args.contains(&"128k".to_string()));
        assert!(args.contains(&"+faststart".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
        assert!(!args.contains(&"-an".to_string()));
    }

    #[test]
    fn test_passes_share_passlog_base() {
        let base = Path::new("/tmp/plog_run");
        let p1 = analysis_pass_args(Path::new("a.mp4"), 500, base);
        let p2 = encode_pass_args(Path::new("a.mp4"), Path::new("b.mp4"), 500, 96, base);
        let log_of = |args: &[String]| {
            let idx = args.iter().position(|a| a == "-passlogfile").unwrap();
            args[idx + 1].clone()
        };
        assert_eq!(log_of(&p1), log_of(&p2));
    }

    #[test]
    fn test_passlog_guard_removes_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("vid_fit_2pass_123");
        std::fs::write(dir.path().join("vid_fit_2pass_123-0.log"), b"x").unwrap();
        std::fs::write(dir.path().join("vid_fit_2pass_123-0.log.mbtree"), b"x").unwrap();
        std::fs::write(dir.path().join("unrelated.log"), b"x").unwrap();

        drop(PassLogGuard::new(base));

        assert!(!dir.path().join("vid_fit_2pass_123-0.log").exists());
        assert!(!dir.path().join("vid_fit_2pass_123-0.log.mbtree").exists());
        assert!(dir.path().join("unrelated.log").exists());
    }

    #[test]
    fn test_passlog_cleanup_missing_dir_is_silent() {
        remove_passlog_artifacts(Path::new("/no/such/dir/plog"));
    }
}
