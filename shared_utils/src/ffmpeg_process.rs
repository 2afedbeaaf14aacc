//! FFmpeg process management
//!
//! Pipe buffers are ~64KB; a child that fills stderr while the parent
//! only waits on exit deadlocks. Both output streams are therefore
//! drained on dedicated threads, and `wait_with_output` joins the
//! drains as well as the exit wait before returning.

use anyhow::{Context, Result};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Wrapper around a spawned encoder/prober process.
pub struct ToolProcess {
    child: Child,
    stdout_thread: Option<JoinHandle<String>>,
    stderr_thread: Option<JoinHandle<String>>,
}

impl ToolProcess {
    /// Spawn `cmd` with both output streams piped and draining.
    pub fn spawn(cmd: &mut Command) -> Result<Self> {
        info!(command = ?cmd, "Executing external tool");

        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = cmd.spawn().context("Failed to spawn process")?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture stderr"))?;

        let stdout_thread = thread::spawn(move || drain(stdout));
        let stderr_thread = thread::spawn(move || drain(stderr));

        Ok(Self {
            child,
            stdout_thread: Some(stdout_thread),
            stderr_thread: Some(stderr_thread),
        })
    }

    /// Wait for exit and for both drains to finish.
    ///
    /// Returns the exit status and the full stderr content.
    pub fn wait_with_output(mut self) -> Result<(ExitStatus, String)> {
        let status = self.child.wait().context("Failed to wait for process")?;

        let stdout = self
            .stdout_thread
            .take()
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();
        let stderr = self
            .stderr_thread
            .take()
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();

        if status.success() {
            info!(exit_code = status.code(), "Process completed");
            debug!(stdout_len = stdout.len(), stderr_len = stderr.len(), "Streams drained");
        } else {
            error!(
                exit_code = status.code(),
                stderr = %stderr,
                "Process failed"
            );
        }

        Ok((status, stderr))
    }
}

fn drain(mut stream: impl Read) -> String {
    let mut buf = String::new();
    let _ = stream.read_to_string(&mut buf);
    buf
}

/// Extract the most meaningful line from ffmpeg stderr.
///
/// Prefers lines containing "Error"/"error"; otherwise the last line
/// that is not progress noise.
pub fn format_ffmpeg_error(stderr: &str) -> String {
    if let Some(error_line) = stderr
        .lines()
        .rev()
        .find(|line| line.contains("Error") || line.contains("error"))
    {
        return error_line.trim().to_string();
    }

    stderr
        .lines()
        .rev()
        .find(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty()
                && !trimmed.starts_with("frame=")
                && !trimmed.starts_with("fps=")
                && !trimmed.starts_with("size=")
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "Unknown FFmpeg error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_prefers_error_line() {
        let stderr = "frame=  100 fps=25.0 size=    1024kB\n[libx264 @ 0x7f] Error: rate control failed\n";
        let error = format_ffmpeg_error(stderr);
        assert!(error.contains("rate control failed"));
    }

    #[test]
    fn test_format_error_skips_progress_noise() {
        let stderr = "frame=  100 fps=25.0 size=    1024kB\nConversion failed!\n";
        assert_eq!(format_ffmpeg_error(stderr), "Conversion failed!");
    }

    #[test]
    fn test_format_error_empty() {
        assert_eq!(format_ffmpeg_error(""), "Unknown FFmpeg error");
    }

    #[test]
    fn test_spawn_drains_and_waits() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err >&2; exit 0"]);
        let process = ToolProcess::spawn(&mut cmd).unwrap();
        let (status, stderr) = process.wait_with_output().unwrap();
        assert!(status.success());
        assert_eq!(stderr.trim(), "err");
    }

    #[test]
    fn test_nonzero_exit_reported() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo boom >&2; exit 3"]);
        let process = ToolProcess::spawn(&mut cmd).unwrap();
        let (status, stderr) = process.wait_with_output().unwrap();
        assert!(!status.success());
        assert_eq!(status.code(), Some(3));
        assert_eq!(stderr.trim(), "boom");
    }
}
