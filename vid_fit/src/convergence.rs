//! Size convergence loop
//!
//! Drives up to [`MAX_ATTEMPTS`] encode attempts, re-deriving the video
//! bitrate from the ratio between target and measured size. Output size
//! scales near-linearly with requested bitrate for a fixed duration, so
//! a single linear correction replaces a search; two attempts bound the
//! cost of the expensive two-pass encodes.
//!
//! Terminal states: converged (within tolerance), exhausted (attempts
//! spent, last result accepted as-is), failed (encode error, propagated
//! immediately — a process failure is not a size miss and is never
//! retried).

use shared_utils::errors::{Result, VidFitError};
use shared_utils::types::FileSize;
use tracing::info;

use crate::allocation::{BitrateBudget, MIN_VIDEO_KBPS};

/// Hard cap on encode attempts; each one is two full encoder passes.
pub const MAX_ATTEMPTS: u32 = 2;

/// Accepted relative deviation between measured and target size.
pub const SIZE_TOLERANCE: f64 = 0.03;

/// One complete encode attempt at a fixed bitrate pair.
///
/// Implementations report the resulting output size in bytes; any
/// process-level failure is an error that aborts the whole run.
pub trait EncodeBackend {
    fn encode(&mut self, video_kbps: u32, audio_kbps: u32, attempt: u32) -> Result<FileSize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceState {
    /// Final size within tolerance.
    Converged,
    /// Attempts spent; last result accepted even though outside tolerance.
    Exhausted,
}

#[derive(Debug, Clone, Copy)]
pub struct AttemptResult {
    pub attempt: u32,
    pub requested_video_kbps: u32,
    pub actual_size: FileSize,
    pub deviation: f64,
}

#[derive(Debug, Clone)]
pub struct ConvergenceReport {
    pub state: ConvergenceState,
    pub attempts: Vec<AttemptResult>,
}

impl ConvergenceReport {
    pub fn final_attempt(&self) -> &AttemptResult {
        self.attempts
            .last()
            .expect("convergence report always holds at least one attempt")
    }
}

/// Run the convergence loop against `backend`.
///
/// Attempts are strictly sequential: attempt n+1 only starts once
/// attempt n has been measured. The only state carried forward is the
/// evolving video bitrate; the audio bitrate is fixed by the budget.
pub fn converge_on_size(
    backend: &mut dyn EncodeBackend,
    budget: &BitrateBudget,
    target: FileSize,
) -> Result<ConvergenceReport> {
    let mut video_kbps = budget.video_kbps;
    let mut attempts = Vec::with_capacity(MAX_ATTEMPTS as usize);

    for attempt in 1..=MAX_ATTEMPTS {
        info!(
            "🎯 Attempt {}/{}: video {} kbps, audio {} kbps",
            attempt, MAX_ATTEMPTS, video_kbps, budget.audio_kbps
        );

        let actual_size = backend.encode(video_kbps, budget.audio_kbps, attempt)?;

        let deviation = actual_size.deviation_from(target).ok_or_else(|| {
            VidFitError::InvalidTargetSize("target size is zero bytes".to_string())
        })?;

        attempts.push(AttemptResult {
            attempt,
            requested_video_kbps: video_kbps,
            actual_size,
            deviation,
        });

        info!(
            "📏 Measured {} against target {} ({:+.1}%)",
            actual_size.display(),
            target.display(),
            deviation * 100.0
        );

        if deviation.abs() <= SIZE_TOLERANCE {
            info!("   ✅ Within {:.0}% tolerance", SIZE_TOLERANCE * 100.0);
            return Ok(ConvergenceReport {
                state: ConvergenceState::Converged,
                attempts,
            });
        }

        if attempt == MAX_ATTEMPTS {
            info!("   ⚠️ Attempts exhausted, accepting last result");
            return Ok(ConvergenceReport {
                state: ConvergenceState::Exhausted,
                attempts,
            });
        }

        let correction = actual_size.correction_toward(target).ok_or_else(|| {
            VidFitError::FFmpegError("encoder produced an empty output file".to_string())
        })?;
        let next = ((video_kbps as f64 * correction).floor() as u32).max(MIN_VIDEO_KBPS);
        info!("🔁 Correcting video bitrate {} → {} kbps", video_kbps, next);
        video_kbps = next;
    }

    unreachable!("loop returns from its final attempt")
}
